//! Display-ready, immutable projections of engine state.

use std::collections::BTreeMap;

use serde::Serialize;

use super::channel::{ChannelId, ChannelState};

/// Counters for one channel as shown to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelCounts {
    pub pressed: bool,
    pub down: u64,
    pub up: u64,
    pub repeat: u64,
    pub chatter: u64,
    pub last_held_us: Option<u64>,
    pub min_held_us: Option<u64>,
    pub max_held_us: Option<u64>,
}

impl From<&ChannelState> for ChannelCounts {
    fn from(s: &ChannelState) -> Self {
        ChannelCounts {
            pressed: s.pressed,
            down: s.down_count,
            up: s.up_count,
            repeat: s.repeat_count,
            chatter: s.chatter_count,
            last_held_us: s.last_held_us,
            min_held_us: s.min_held_us,
            max_held_us: s.max_held_us,
        }
    }
}

/// Wheel tick totals per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WheelCounts {
    pub up: u64,
    pub down: u64,
    pub left: u64,
    pub right: u64,
    pub bounces: u64,
}

/// The latest down or repeat, for "last key" style display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastInput {
    pub channel: ChannelId,
    pub label: Option<String>,
    pub repeat: bool,
    pub timestamp_us: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub active_count: usize,
    pub active: Vec<ChannelId>,
    /// Distinct channels with at least one accepted down since the last reset.
    pub tested_key_count: usize,
    /// Accepted downs, accepted ups and wheel ticks.
    pub total_event_count: u64,
    pub per_channel: BTreeMap<ChannelId, ChannelCounts>,
    pub max_concurrent: usize,
    pub avg_hz: f64,
    pub max_hz: f64,
    pub jitter_ms: f64,
    pub sample_count: u64,
    pub discarded_samples: u64,
    pub chatter_count: u64,
    pub double_click_count: u64,
    pub faulty_double_click_count: u64,
    pub wheel: WheelCounts,
    pub last_input: Option<LastInput>,
    pub runtime_us: Option<u64>,
}

impl Snapshot {
    /// Down count for a channel, 0 if it was never seen.
    pub fn down_count(&self, channel: &ChannelId) -> u64 {
        self.per_channel.get(channel).map_or(0, |c| c.down)
    }

    pub fn up_count(&self, channel: &ChannelId) -> u64 {
        self.per_channel.get(channel).map_or(0, |c| c.up)
    }
}
