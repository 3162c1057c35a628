// This module defines the classifier engine: one explicitly owned instance per
// input context, holding every piece of mutable state (channel records, the
// active set, detectors, the polling meter and the log).
//
// All operations run to completion on the caller's thread and never block.

pub mod channel;
pub mod detector;
pub mod log;
pub mod snapshot;
pub mod timing;
mod tracker;


use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tracing::debug;

use crate::event::InputEvent;
use channel::{ChannelId, ChannelState};
use detector::{ClickPair, DoubleClickDetector, WheelDetector, WheelDirection, WheelVerdict};
use log::{Classification, EventLog, LogKind};
use snapshot::{ChannelCounts, LastInput, Snapshot, WheelCounts};
use timing::{PollingMeter, SampleOutcome};

pub use tracker::DownOutcome;

pub const DEFAULT_CHATTER: Duration = Duration::from_millis(80);
pub const DEFAULT_FAULTY_DOUBLE_CLICK: Duration = Duration::from_millis(80);
pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);
pub const DEFAULT_WHEEL_BOUNCE: Duration = Duration::from_millis(50);
pub const DEFAULT_MAX_HZ: f64 = 10_000.0;
pub const DEFAULT_TIMING_WINDOW: usize = 200;
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Classification thresholds and buffer sizes for one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Two initial downs on one channel closer than this are chatter.
    pub chatter: Duration,
    /// Maximum gap between the two downs of a double click.
    pub double_click_window: Duration,
    /// A double click faster than this is a hardware fault.
    pub faulty_double_click: Duration,
    /// Wheel direction reversals faster than this are encoder bounce.
    pub wheel_bounce: Duration,
    /// Pointer samples above this rate are discarded as timer artifacts.
    pub max_hz: f64,
    pub timing_window: usize,
    pub log_capacity: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            chatter: DEFAULT_CHATTER,
            double_click_window: DEFAULT_DOUBLE_CLICK_WINDOW,
            faulty_double_click: DEFAULT_FAULTY_DOUBLE_CLICK,
            wheel_bounce: DEFAULT_WHEEL_BOUNCE,
            max_hz: DEFAULT_MAX_HZ,
            timing_window: DEFAULT_TIMING_WINDOW,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Input event classifier and statistics engine.
#[derive(Debug, Clone)]
pub struct Engine {
    thresholds: Thresholds,
    channels: HashMap<ChannelId, ChannelState>,
    active: BTreeSet<ChannelId>,
    max_concurrent: usize,
    clicks: DoubleClickDetector,
    wheel_detector: WheelDetector,
    wheel: WheelCounts,
    polling: PollingMeter,
    log: EventLog,
    total_events: u64,
    chatter_count: u64,
    double_click_count: u64,
    faulty_double_click_count: u64,
    last_input: Option<LastInput>,
    // Session bounds, used for runtime and as "now" for payload-less signals.
    first_event_us: Option<u64>,
    last_event_us: Option<u64>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Thresholds::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        let polling = PollingMeter::new(thresholds.timing_window, thresholds.max_hz);
        let log = EventLog::with_capacity(thresholds.log_capacity);
        Engine {
            thresholds,
            channels: HashMap::new(),
            active: BTreeSet::new(),
            max_concurrent: 0,
            clicks: DoubleClickDetector::new(),
            wheel_detector: WheelDetector::default(),
            wheel: WheelCounts::default(),
            polling,
            log,
            total_events: 0,
            chatter_count: 0,
            double_click_count: 0,
            faulty_double_click_count: 0,
            last_input: None,
            first_event_us: None,
            last_event_us: None,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Dispatches one host event.
    ///
    /// A `Move` carrying a held-buttons mask first corrects orphaned presses,
    /// then feeds the polling meter.
    pub fn process(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Down {
                channel,
                ts_us,
                repeat,
                label,
            } => {
                self.on_down(channel.clone(), *ts_us, *repeat, label.as_deref());
            }
            InputEvent::Up { channel, ts_us } => {
                self.on_up(channel, *ts_us);
            }
            InputEvent::Move { ts_us, buttons } => {
                if let Some(mask) = buttons {
                    self.on_move_correction(*mask, *ts_us);
                }
                self.on_pointer_sample(*ts_us);
            }
            InputEvent::Scroll {
                ts_us,
                delta_x,
                delta_y,
            } => {
                self.on_scroll(*ts_us, *delta_x, *delta_y);
            }
            InputEvent::FocusLost => {
                self.on_focus_lost();
            }
            InputEvent::Reset => self.reset(),
        }
    }

    /// Feeds one pointer-move sample to the polling meter.
    pub fn on_pointer_sample(&mut self, ts_us: u64) -> SampleOutcome {
        self.note_time(ts_us);
        let outcome = self.polling.sample(ts_us);
        match outcome {
            SampleOutcome::Start => {
                self.log
                    .append(ts_us, LogKind::PollingStarted, Classification::Normal);
            }
            SampleOutcome::Outlier { hz } => {
                debug!(ts_us, hz, "Discarded pointer sample above rate ceiling");
            }
            SampleOutcome::Accepted { .. } | SampleOutcome::NonPositive => {}
        }
        outcome
    }

    /// Counts wheel ticks and checks vertical ticks for encoder bounce.
    /// Returns the number of ticks recorded (0, 1 or 2).
    pub fn on_scroll(&mut self, ts_us: u64, delta_x: f64, delta_y: f64) -> usize {
        self.note_time(ts_us);
        let mut ticks = 0;

        if delta_y != 0.0 {
            let direction = if delta_y < 0.0 {
                WheelDirection::Up
            } else {
                WheelDirection::Down
            };
            match direction {
                WheelDirection::Up => self.wheel.up += 1,
                WheelDirection::Down => self.wheel.down += 1,
            }
            let verdict =
                self.wheel_detector
                    .on_tick(direction, ts_us, self.thresholds.wheel_bounce);
            let (since_last_us, bounce) = match verdict {
                WheelVerdict::Start => (None, false),
                WheelVerdict::Normal { delta_us } => (Some(delta_us), false),
                WheelVerdict::Bounce { delta_us } => (Some(delta_us), true),
            };
            if bounce {
                self.wheel.bounces += 1;
            }
            let state = self.channels.entry(ChannelId::Wheel).or_default();
            state.down_count += 1;
            state.last_down_us = Some(ts_us);

            self.log.append(
                ts_us,
                LogKind::Scroll {
                    direction,
                    since_last_us,
                    bounce,
                },
                if bounce {
                    Classification::Warning
                } else {
                    Classification::Normal
                },
            );
            ticks += 1;
        }

        if delta_x != 0.0 {
            if delta_x < 0.0 {
                self.wheel.left += 1;
            } else {
                self.wheel.right += 1;
            }
            ticks += 1;
        }

        self.total_events += ticks as u64;
        ticks
    }

    /// Clears every counter, the active set, detectors, the timing window,
    /// the session bounds and the log, leaving a single reset marker stamped
    /// with the last event time. Held channels become released, so their
    /// eventual real "up" is a no-op.
    pub fn reset(&mut self) {
        let ts_us = self.last_event_us.unwrap_or(0);
        debug!(held = self.active.len(), "Resetting engine state");

        self.channels.clear();
        self.active.clear();
        self.max_concurrent = 0;
        self.clicks.clear();
        self.wheel_detector.clear();
        self.wheel = WheelCounts::default();
        self.polling.clear();
        self.total_events = 0;
        self.chatter_count = 0;
        self.double_click_count = 0;
        self.faulty_double_click_count = 0;
        self.last_input = None;
        self.first_event_us = None;
        self.last_event_us = None;

        self.log.clear();
        self.log.append(ts_us, LogKind::Reset, Classification::Normal);
    }

    /// Side-effect-free projection of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let per_channel = self
            .channels
            .iter()
            .filter(|(id, _)| **id != ChannelId::Pointer)
            .map(|(id, state)| (id.clone(), ChannelCounts::from(state)))
            .collect();
        // Wheel ticks bump the wheel's down count but are not presses.
        let tested_key_count = self
            .channels
            .iter()
            .filter(|(id, s)| **id != ChannelId::Wheel && s.down_count > 0)
            .count();

        Snapshot {
            active_count: self.active.len(),
            active: self.active.iter().cloned().collect(),
            tested_key_count,
            total_event_count: self.total_events,
            per_channel,
            max_concurrent: self.max_concurrent,
            avg_hz: self.polling.avg_hz(),
            max_hz: self.polling.max_hz(),
            jitter_ms: self.polling.jitter_ms(),
            sample_count: self.polling.accepted(),
            discarded_samples: self.polling.discarded(),
            chatter_count: self.chatter_count,
            double_click_count: self.double_click_count,
            faulty_double_click_count: self.faulty_double_click_count,
            wheel: self.wheel,
            last_input: self.last_input.clone(),
            runtime_us: self.runtime_us(),
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn channel(&self, id: &ChannelId) -> Option<&ChannelState> {
        self.channels.get(id)
    }

    pub fn is_pressed(&self, id: &ChannelId) -> bool {
        self.active.contains(id)
    }

    pub fn active(&self) -> &BTreeSet<ChannelId> {
        &self.active
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn max_hz(&self) -> f64 {
        self.polling.max_hz()
    }

    /// First and latest event timestamps since the last reset.
    pub fn session_bounds(&self) -> Option<(u64, u64)> {
        Some((self.first_event_us?, self.last_event_us?))
    }

    /// Time between the first and the latest event since the last reset.
    pub fn runtime_us(&self) -> Option<u64> {
        self.session_bounds()
            .map(|(first, last)| last.saturating_sub(first))
    }

    fn note_time(&mut self, ts_us: u64) {
        if self.first_event_us.is_none() {
            self.first_event_us = Some(ts_us);
        }
        self.last_event_us = Some(self.last_event_us.map_or(ts_us, |last| last.max(ts_us)));
    }

    fn record_click_pair(&mut self, channel: &ChannelId, ts_us: u64, pair: ClickPair) {
        match pair {
            ClickPair::DoubleClick { interval_us } => {
                self.double_click_count += 1;
                self.log.append(
                    ts_us,
                    LogKind::DoubleClick {
                        channel: channel.clone(),
                        interval_us,
                    },
                    Classification::Normal,
                );
            }
            ClickPair::Faulty { interval_us } => {
                self.faulty_double_click_count += 1;
                self.log.append(
                    ts_us,
                    LogKind::FaultyDoubleClick {
                        channel: channel.clone(),
                        interval_us,
                    },
                    Classification::Fault,
                );
            }
        }
    }
}
