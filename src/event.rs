// Host-facing input events and the two stdin encodings the binary accepts:
// newline-delimited JSON, and raw Linux `input_event` structs.

use input_linux_sys::{
    input_event, BTN_EXTRA, BTN_LEFT, BTN_MIDDLE, BTN_MISC, BTN_RIGHT, BTN_SIDE, EV_KEY, EV_REL,
    EV_SYN, REL_HWHEEL, REL_WHEEL, REL_X, REL_Y, SYN_REPORT,
};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Read};
use std::mem::size_of;
use tracing::{trace, warn};

use crate::engine::channel::ChannelId;
use crate::keynames::{get_event_type_name, web_code};

/// One raw event delivered by the host environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Down {
        channel: ChannelId,
        ts_us: u64,
        /// Hardware auto-repeat while held.
        #[serde(default)]
        repeat: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Up {
        channel: ChannelId,
        ts_us: u64,
    },
    /// Pointer motion. `buttons` is the held-buttons mask when the host has one.
    Move {
        ts_us: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        buttons: Option<u8>,
    },
    Scroll {
        ts_us: u64,
        #[serde(default)]
        delta_x: f64,
        #[serde(default)]
        delta_y: f64,
    },
    FocusLost,
    Reset,
}

impl InputEvent {
    pub fn down(channel: ChannelId, ts_us: u64) -> Self {
        InputEvent::Down {
            channel,
            ts_us,
            repeat: false,
            label: None,
        }
    }

    pub fn up(channel: ChannelId, ts_us: u64) -> Self {
        InputEvent::Up { channel, ts_us }
    }
}

/// Reads `InputEvent`s from newline-delimited JSON.
///
/// Blank lines are skipped. Malformed lines are reported and skipped, since the
/// host feeding us is not trusted to be well-behaved.
pub struct JsonEventReader<R> {
    reader: R,
    line: String,
    line_no: u64,
    skipped: u64,
}

impl<R: BufRead> JsonEventReader<R> {
    pub fn new(reader: R) -> Self {
        JsonEventReader {
            reader,
            line: String::with_capacity(128),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Returns the next well-formed event, or `Ok(None)` on EOF.
    pub fn next_event(&mut self) -> io::Result<Option<InputEvent>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<InputEvent>(trimmed) {
                Ok(ev) => return Ok(Some(ev)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_no, error = %e, "Skipping malformed input line");
                }
            }
        }
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// Reads a single `input_event` from the reader. Returns Ok(None) on EOF.
pub fn read_event(reader: &mut impl Read) -> io::Result<Option<input_event>> {
    let mut buf = [0u8; size_of::<input_event>()];
    match reader.read_exact(&mut buf) {
        Ok(()) => {
            // SAFETY: input_event is plain old data; any bit pattern is a valid value.
            let event: input_event = unsafe { std::ptr::read_unaligned(buf.as_ptr() as *const _) };
            Ok(Some(event))
        }
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// Calculates the event timestamp in microseconds from its timeval.
#[inline]
pub fn event_microseconds(event: &input_event) -> u64 {
    (event.time.tv_sec.max(0) as u64)
        .saturating_mul(1_000_000)
        .saturating_add(event.time.tv_usec.max(0) as u64)
}

/// Mouse button index (DOM numbering) for an evdev button code.
#[inline]
fn button_index(code: u16) -> Option<u8> {
    match i32::from(code) {
        BTN_LEFT => Some(0),
        BTN_MIDDLE => Some(1),
        BTN_RIGHT => Some(2),
        BTN_SIDE => Some(3),
        BTN_EXTRA => Some(4),
        _ => None,
    }
}

/// Translates raw evdev events into host events.
///
/// Relative motion is coalesced per `SYN_REPORT` frame so that one hardware
/// report yields one pointer sample, whatever axes it touched.
#[derive(Debug, Default)]
pub struct EvdevTranslator {
    pending_motion: bool,
}

impl EvdevTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &input_event, out: &mut Vec<InputEvent>) {
        let ts_us = event_microseconds(event);
        match i32::from(event.type_) {
            EV_KEY => {
                let channel = match button_index(event.code) {
                    Some(idx) => ChannelId::Button(idx),
                    None if i32::from(event.code) < BTN_MISC => ChannelId::Key(web_code(event.code)),
                    // Touchpad tool/touch codes and gamepad buttons.
                    None => return,
                };
                match event.value {
                    0 => out.push(InputEvent::Up { channel, ts_us }),
                    1 => out.push(InputEvent::down(channel, ts_us)),
                    2 => out.push(InputEvent::Down {
                        channel,
                        ts_us,
                        repeat: true,
                        label: None,
                    }),
                    _ => {}
                }
            }
            EV_REL => match i32::from(event.code) {
                REL_X | REL_Y => self.pending_motion = true,
                REL_WHEEL => out.push(InputEvent::Scroll {
                    ts_us,
                    delta_x: 0.0,
                    // Positive REL_WHEEL is away from the user; the host
                    // convention is negative delta_y for "up".
                    delta_y: -f64::from(event.value),
                }),
                REL_HWHEEL => out.push(InputEvent::Scroll {
                    ts_us,
                    delta_x: f64::from(event.value),
                    delta_y: 0.0,
                }),
                _ => {}
            },
            EV_SYN if i32::from(event.code) == SYN_REPORT => {
                if std::mem::take(&mut self.pending_motion) {
                    out.push(InputEvent::Move {
                        ts_us,
                        buttons: None,
                    });
                }
            }
            _ => {
                trace!(
                    type_ = get_event_type_name(event.type_),
                    code = event.code,
                    value = event.value,
                    "Ignoring evdev event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input_linux_sys::timeval;

    fn raw(ts_us: u64, type_: i32, code: i32, value: i32) -> input_event {
        input_event {
            time: timeval {
                tv_sec: (ts_us / 1_000_000) as _,
                tv_usec: (ts_us % 1_000_000) as _,
            },
            type_: type_ as u16,
            code: code as u16,
            value,
        }
    }

    #[test]
    fn json_lines_skip_blank_and_malformed() {
        let input = b"\n{\"type\":\"down\",\"channel\":\"KeyA\",\"ts_us\":5}\nnot json\n{\"type\":\"focus_lost\"}\n";
        let mut reader = JsonEventReader::new(&input[..]);
        assert_eq!(
            reader.next_event().unwrap(),
            Some(InputEvent::down(ChannelId::key("KeyA"), 5))
        );
        assert_eq!(reader.next_event().unwrap(), Some(InputEvent::FocusLost));
        assert_eq!(reader.next_event().unwrap(), None);
        assert_eq!(reader.skipped(), 1);
    }

    #[test]
    fn json_channel_names_map_to_buttons() {
        let ev: InputEvent =
            serde_json::from_str(r#"{"type":"up","channel":"Mouse2","ts_us":1}"#).unwrap();
        assert_eq!(ev, InputEvent::up(ChannelId::Button(2), 1));
        assert!(serde_json::from_str::<InputEvent>(r#"{"type":"bogus"}"#).is_err());
    }

    #[test]
    fn raw_event_round_trips_through_reader() {
        let ev = raw(1_500_000, EV_KEY, 30, 1);
        // SAFETY: viewing a POD struct as bytes.
        let bytes = unsafe {
            std::slice::from_raw_parts(&ev as *const _ as *const u8, size_of::<input_event>())
        };
        let mut cursor = bytes;
        let read = read_event(&mut cursor).unwrap().unwrap();
        assert_eq!(event_microseconds(&read), 1_500_000);
        assert_eq!(i32::from(read.type_), EV_KEY);
        assert!(read_event(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn translates_keys_buttons_and_repeats() {
        let mut t = EvdevTranslator::new();
        let mut out = Vec::new();
        t.translate(&raw(10, EV_KEY, 30, 1), &mut out);
        t.translate(&raw(20, EV_KEY, 30, 2), &mut out);
        t.translate(&raw(30, EV_KEY, BTN_RIGHT, 0), &mut out);
        t.translate(&raw(40, EV_KEY, 0x14a, 1), &mut out); // BTN_TOUCH
        assert_eq!(
            out,
            vec![
                InputEvent::down(ChannelId::key("KeyA"), 10),
                InputEvent::Down {
                    channel: ChannelId::key("KeyA"),
                    ts_us: 20,
                    repeat: true,
                    label: None
                },
                InputEvent::up(ChannelId::Button(2), 30),
            ]
        );
    }

    #[test]
    fn motion_is_coalesced_per_frame() {
        let mut t = EvdevTranslator::new();
        let mut out = Vec::new();
        t.translate(&raw(1_000, EV_REL, REL_X, 3), &mut out);
        t.translate(&raw(1_000, EV_REL, REL_Y, -1), &mut out);
        t.translate(&raw(1_000, EV_SYN, SYN_REPORT, 0), &mut out);
        // A frame with no motion produces nothing.
        t.translate(&raw(2_000, EV_SYN, SYN_REPORT, 0), &mut out);
        assert_eq!(
            out,
            vec![InputEvent::Move {
                ts_us: 1_000,
                buttons: None
            }]
        );
    }

    #[test]
    fn wheel_up_has_negative_delta() {
        let mut t = EvdevTranslator::new();
        let mut out = Vec::new();
        t.translate(&raw(5, EV_REL, REL_WHEEL, 1), &mut out);
        assert_eq!(
            out,
            vec![InputEvent::Scroll {
                ts_us: 5,
                delta_x: 0.0,
                delta_y: -1.0
            }]
        );
    }
}
