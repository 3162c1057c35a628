// Press/release tracking: the per-channel released/pressed state machine, the
// active set, and the two forced-release recovery paths.

use tracing::debug;

use super::channel::ChannelId;
use super::detector::{classify_chatter, ChatterVerdict, ClickPair};
use super::log::{Classification, LogKind, ReleaseCause};
use super::snapshot::LastInput;
use super::Engine;

/// What `on_down` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownOutcome {
    /// Hardware auto-repeat; only display information was updated.
    Repeat,
    /// The channel was already pressed; stray duplicate down.
    Ignored,
    /// Counted as a new press.
    Accepted {
        chatter: ChatterVerdict,
        pair: Option<ClickPair>,
    },
}

impl Engine {
    /// Handles a down event.
    ///
    /// Repeats never touch counters, the active set or the detectors. A down on
    /// a channel that is already pressed is ignored.
    pub fn on_down(
        &mut self,
        channel: ChannelId,
        ts_us: u64,
        is_repeat: bool,
        raw_label: Option<&str>,
    ) -> DownOutcome {
        self.note_time(ts_us);

        if is_repeat {
            // A repeat on a channel never pressed creates no record.
            if let Some(state) = self.channels.get_mut(&channel) {
                state.repeat_count += 1;
                if raw_label.is_some() {
                    state.last_label = raw_label.map(str::to_string);
                }
            }
            self.last_input = Some(LastInput {
                channel,
                label: raw_label.map(str::to_string),
                repeat: true,
                timestamp_us: ts_us,
            });
            return DownOutcome::Repeat;
        }

        let state = self.channels.entry(channel.clone()).or_default();
        if raw_label.is_some() {
            state.last_label = raw_label.map(str::to_string);
        }
        if state.pressed {
            return DownOutcome::Ignored;
        }

        state.pressed = true;
        state.down_count += 1;

        let chatter = classify_chatter(state.last_down_us, ts_us, self.thresholds.chatter);
        if chatter.is_chatter() {
            state.chatter_count += 1;
            self.chatter_count += 1;
        }
        state.last_down_us = Some(ts_us);

        self.total_events += 1;
        self.active.insert(channel.clone());
        self.max_concurrent = self.max_concurrent.max(self.active.len());

        self.log.append(
            ts_us,
            LogKind::Down {
                channel: channel.clone(),
                since_last_us: chatter.delta_us(),
                chatter: chatter.is_chatter(),
                backwards: chatter == ChatterVerdict::Backwards,
            },
            if chatter.is_chatter() {
                Classification::Warning
            } else {
                Classification::Normal
            },
        );

        let pair = match channel {
            ChannelId::Button(button) => self.clicks.on_click(
                button,
                ts_us,
                self.thresholds.double_click_window,
                self.thresholds.faulty_double_click,
            ),
            _ => None,
        };
        if let Some(pair) = pair {
            self.record_click_pair(&channel, ts_us, pair);
        }

        self.last_input = Some(LastInput {
            channel,
            label: raw_label.map(str::to_string),
            repeat: false,
            timestamp_us: ts_us,
        });

        DownOutcome::Accepted { chatter, pair }
    }

    /// Handles an up event. Returns `false` (and changes nothing) if the
    /// channel is not pressed.
    pub fn on_up(&mut self, channel: &ChannelId, ts_us: u64) -> bool {
        self.note_time(ts_us);
        self.release(channel, ts_us, None)
    }

    /// Releases every pressed mouse button whose bit is clear in `held_mask`
    /// (DOM `MouseEvent.buttons` layout). Returns how many were released.
    pub fn on_move_correction(&mut self, held_mask: u8, ts_us: u64) -> usize {
        self.note_time(ts_us);
        let orphaned: Vec<ChannelId> = self
            .active
            .iter()
            .filter(|id| matches!(id.held_mask_bit(), Some(bit) if held_mask & bit == 0))
            .cloned()
            .collect();

        for id in &orphaned {
            debug!(channel = %id, held_mask, "Releasing button missing from held mask");
            self.release(id, ts_us, Some(ReleaseCause::MoveCorrection));
        }
        orphaned.len()
    }

    /// Force-releases every pressed channel. Returns how many were released.
    pub fn on_focus_lost(&mut self) -> usize {
        let ts_us = self.last_event_us.unwrap_or(0);
        let held: Vec<ChannelId> = self.active.iter().cloned().collect();
        if !held.is_empty() {
            debug!(count = held.len(), "Focus lost, releasing held channels");
        }
        for id in &held {
            self.release(id, ts_us, Some(ReleaseCause::FocusLost));
        }
        held.len()
    }

    fn release(&mut self, channel: &ChannelId, ts_us: u64, forced: Option<ReleaseCause>) -> bool {
        let Some(state) = self.channels.get_mut(channel) else {
            return false;
        };
        if !state.pressed {
            return false;
        }

        state.pressed = false;
        state.up_count += 1;
        let held_us = state.last_down_us.and_then(|down| ts_us.checked_sub(down));
        if let Some(held) = held_us {
            state.record_hold(held);
        }

        self.active.remove(channel);
        self.total_events += 1;
        self.log.append(
            ts_us,
            LogKind::Up {
                channel: channel.clone(),
                held_us,
                forced,
            },
            Classification::Normal,
        );
        true
    }
}
