// fuzz/fuzz_targets/fuzz_engine.rs
#![no_main]

use arbitrary::Arbitrary;
use input_probe::engine::channel::ChannelId;
use input_probe::{Engine, InputEvent, Thresholds};
use libfuzzer_sys::fuzz_target;
use std::time::Duration;

const MAX_OPS_PER_FUZZ_CASE: usize = 2000;

#[derive(Arbitrary, Debug)]
enum Op {
    Down { channel: u8, delta_us: u16, repeat: bool },
    Up { channel: u8, delta_us: u16 },
    Move { delta_us: u16, buttons: Option<u8> },
    Scroll { delta_us: u16, dx: i8, dy: i8 },
    FocusLost,
    Reset,
}

#[derive(Arbitrary, Debug)]
struct Case {
    chatter_ms: u8,
    log_capacity: u8,
    ops: Vec<Op>,
}

fn channel(n: u8) -> ChannelId {
    match n % 8 {
        0..=4 => ChannelId::Button(n % 5),
        5 => ChannelId::key("KeyA"),
        6 => ChannelId::key("KeyB"),
        _ => ChannelId::key(format!("Evdev{n}")),
    }
}

fuzz_target!(|case: Case| {
    let mut engine = Engine::new(Thresholds {
        chatter: Duration::from_millis(u64::from(case.chatter_ms.max(1))),
        log_capacity: usize::from(case.log_capacity.max(1)),
        ..Thresholds::default()
    });
    let mut ts_us = 0u64;
    let mut max_concurrent = 0;

    for op in case.ops.into_iter().take(MAX_OPS_PER_FUZZ_CASE) {
        let ev = match op {
            Op::Down { channel: c, delta_us, repeat } => {
                ts_us += u64::from(delta_us);
                InputEvent::Down { channel: channel(c), ts_us, repeat, label: None }
            }
            Op::Up { channel: c, delta_us } => {
                ts_us += u64::from(delta_us);
                InputEvent::Up { channel: channel(c), ts_us }
            }
            Op::Move { delta_us, buttons } => {
                ts_us += u64::from(delta_us);
                InputEvent::Move { ts_us, buttons }
            }
            Op::Scroll { delta_us, dx, dy } => {
                ts_us += u64::from(delta_us);
                InputEvent::Scroll { ts_us, delta_x: f64::from(dx), delta_y: f64::from(dy) }
            }
            Op::FocusLost => InputEvent::FocusLost,
            Op::Reset => InputEvent::Reset,
        };
        let is_reset = matches!(ev, InputEvent::Reset);
        engine.process(&ev);

        if is_reset {
            assert_eq!(engine.max_concurrent(), 0);
        } else {
            assert!(engine.max_concurrent() >= max_concurrent);
        }
        max_concurrent = engine.max_concurrent();
        assert!(engine.active().len() <= max_concurrent);
        assert!(engine.log().len() <= engine.log().capacity());
        for id in engine.active() {
            assert!(engine.channel(id).is_some_and(|s| s.pressed));
        }
        if matches!(ev, InputEvent::FocusLost) {
            assert!(engine.active().is_empty());
        }
    }

    let _ = engine.snapshot();
});
