//! Channel identity and the per-channel press/release record.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Number of mouse buttons the tracker distinguishes (DOM `MouseEvent.button` 0..=4).
pub const MOUSE_BUTTONS: u8 = 5;

/// A single distinguishable input source.
///
/// The string form (`Display`/`FromStr`) is stable and doubles as the serde
/// representation so channels can key JSON objects:
/// `Key("KeyA")` <-> `"KeyA"`, `Button(0)` <-> `"Mouse0"`, `Wheel` <-> `"Wheel"`,
/// `Pointer` <-> `"Pointer"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelId {
    /// A keyboard key, identified by its platform key-code string.
    Key(String),
    /// A mouse button: 0 left, 1 middle, 2 right, 3 back, 4 forward.
    Button(u8),
    /// The scroll wheel.
    Wheel,
    /// The pointer-move sample stream.
    Pointer,
}

impl ChannelId {
    pub fn key(code: impl Into<String>) -> Self {
        ChannelId::Key(code.into())
    }

    /// Bit this button occupies in a DOM `MouseEvent.buttons` mask.
    ///
    /// Note the mask order differs from the button index order: right is bit 1
    /// and middle is bit 2.
    pub fn held_mask_bit(&self) -> Option<u8> {
        match self {
            ChannelId::Button(0) => Some(0b0_0001),
            ChannelId::Button(1) => Some(0b0_0100),
            ChannelId::Button(2) => Some(0b0_0010),
            ChannelId::Button(3) => Some(0b0_1000),
            ChannelId::Button(4) => Some(0b1_0000),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Key(code) => f.write_str(code),
            ChannelId::Button(idx) => write!(f, "Mouse{idx}"),
            ChannelId::Wheel => f.write_str("Wheel"),
            ChannelId::Pointer => f.write_str("Pointer"),
        }
    }
}

impl FromStr for ChannelId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Wheel" => ChannelId::Wheel,
            "Pointer" => ChannelId::Pointer,
            _ => match s.strip_prefix("Mouse").and_then(|n| n.parse::<u8>().ok()) {
                Some(idx) if idx < MOUSE_BUTTONS => ChannelId::Button(idx),
                _ => ChannelId::Key(s.to_string()),
            },
        })
    }
}

impl Serialize for ChannelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChannelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // FromStr is infallible; every string names some channel.
        Ok(s.parse().unwrap_or(ChannelId::Key(s)))
    }
}

/// Mutable record for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// True between an accepted down and its matching up.
    pub pressed: bool,
    pub down_count: u64,
    pub up_count: u64,
    /// Hardware auto-repeat events seen while held. Display information only.
    pub repeat_count: u64,
    pub chatter_count: u64,
    /// Timestamp of the most recent *initial* down (repeats excluded).
    pub last_down_us: Option<u64>,
    /// Raw label delivered with the latest down or repeat.
    pub last_label: Option<String>,
    pub last_held_us: Option<u64>,
    pub min_held_us: Option<u64>,
    pub max_held_us: Option<u64>,
}

impl ChannelState {
    /// Folds a completed hold into the last/min/max hold statistics.
    pub(crate) fn record_hold(&mut self, held_us: u64) {
        self.last_held_us = Some(held_us);
        self.min_held_us = Some(self.min_held_us.map_or(held_us, |m| m.min(held_us)));
        self.max_held_us = Some(self.max_held_us.map_or(held_us, |m| m.max(held_us)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_round_trips_for_every_variant() {
        for id in [
            ChannelId::key("KeyA"),
            ChannelId::Button(0),
            ChannelId::Button(4),
            ChannelId::Wheel,
            ChannelId::Pointer,
        ] {
            let parsed: ChannelId = id.to_string().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn out_of_range_mouse_name_is_a_key() {
        assert_eq!("Mouse7".parse::<ChannelId>().unwrap(), ChannelId::key("Mouse7"));
    }

    #[test]
    fn held_mask_uses_dom_bit_order() {
        assert_eq!(ChannelId::Button(1).held_mask_bit(), Some(4));
        assert_eq!(ChannelId::Button(2).held_mask_bit(), Some(2));
        assert_eq!(ChannelId::key("KeyA").held_mask_bit(), None);
    }

    #[test]
    fn hold_stats_track_extremes() {
        let mut state = ChannelState::default();
        state.record_hold(120);
        state.record_hold(40);
        state.record_hold(300);
        assert_eq!(state.last_held_us, Some(300));
        assert_eq!(state.min_held_us, Some(40));
        assert_eq!(state.max_held_us, Some(300));
    }
}
