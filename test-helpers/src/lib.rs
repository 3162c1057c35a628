//! Common helper functions for tests and benchmarks.
use input_linux_sys::{input_event, timeval, EV_KEY, EV_REL, EV_SYN, REL_X, SYN_REPORT};
use input_probe::config::Config;
use input_probe::engine::channel::ChannelId;
use input_probe::engine::Thresholds;
use input_probe::labels::Locale;
use input_probe::InputEvent;
use std::sync::Arc;
use std::time::Duration;

// --- Constants ---
pub const KEY_A: u16 = 30;
pub const KEY_B: u16 = 48;
pub const KEY_LEFTSHIFT: u16 = 42;
pub const BTN_LEFT: u16 = 0x110;
pub const MS: u64 = 1_000;

// --- Host Event Helpers ---

pub fn key(code: &str) -> ChannelId {
    ChannelId::key(code)
}

pub fn down(channel: &ChannelId, ts_us: u64) -> InputEvent {
    InputEvent::down(channel.clone(), ts_us)
}

pub fn up(channel: &ChannelId, ts_us: u64) -> InputEvent {
    InputEvent::up(channel.clone(), ts_us)
}

pub fn repeat(channel: &ChannelId, ts_us: u64) -> InputEvent {
    InputEvent::Down {
        channel: channel.clone(),
        ts_us,
        repeat: true,
        label: None,
    }
}

/// Down at `down_us`, up at `up_us`.
pub fn tap(channel: &ChannelId, down_us: u64, up_us: u64) -> [InputEvent; 2] {
    [down(channel, down_us), up(channel, up_us)]
}

/// Serializes events as newline-delimited JSON, the binary's default input.
pub fn to_jsonl(events: &[InputEvent]) -> String {
    events
        .iter()
        .map(|e| serde_json::to_string(e).expect("event serializes"))
        .collect::<Vec<_>>()
        .join("\n")
}

// --- Raw evdev Helpers ---

fn raw(ts_us: u64, type_: i32, code: u16, value: i32) -> input_event {
    input_event {
        time: timeval {
            tv_sec: (ts_us / 1_000_000) as _,
            tv_usec: (ts_us % 1_000_000) as _,
        },
        type_: type_ as u16,
        code,
        value,
    }
}

/// Creates an EV_KEY input_event with a specific microsecond timestamp.
pub fn key_ev(ts_us: u64, code: u16, value: i32) -> input_event {
    raw(ts_us, EV_KEY, code, value)
}

/// Creates a REL_X motion event.
pub fn rel_x_ev(ts_us: u64, value: i32) -> input_event {
    raw(ts_us, EV_REL, REL_X as u16, value)
}

/// Creates a SYN_REPORT frame terminator.
pub fn syn_ev(ts_us: u64) -> input_event {
    raw(ts_us, EV_SYN, SYN_REPORT as u16, 0)
}

/// Raw bytes of a sequence of events, as Interception Tools would write them.
pub fn events_to_bytes(events: &[input_event]) -> Vec<u8> {
    let size = std::mem::size_of::<input_event>();
    let mut bytes = Vec::with_capacity(events.len() * size);
    for ev in events {
        // SAFETY: input_event is a plain C struct; viewing it as bytes is sound.
        let slice = unsafe { std::slice::from_raw_parts(ev as *const _ as *const u8, size) };
        bytes.extend_from_slice(slice);
    }
    bytes
}

// --- Config Creation Helper ---

/// Helper to create a dummy Config Arc for tests/benches.
pub fn dummy_config(chatter: Duration, log_all: bool, stats_json: bool) -> Arc<Config> {
    Arc::new(Config::new(
        Thresholds {
            chatter,
            ..Thresholds::default()
        },
        Duration::ZERO,
        log_all,
        false,
        stats_json,
        Locale::En,
        false,
        1024,
    ))
}
