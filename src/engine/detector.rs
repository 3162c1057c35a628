//! Timing-based anomaly classification for initial downs and wheel ticks.
//!
//! The detectors here are pure state machines over microsecond timestamps; the
//! engine decides what to log from the verdicts they return.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

/// Outcome of the chatter check for one initial down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatterVerdict {
    /// First down ever seen on this channel; no timing available.
    Start,
    /// Normal actuation, `delta_us` after the previous initial down.
    Normal { delta_us: u64 },
    /// Re-triggered faster than the chatter threshold.
    Chatter { delta_us: u64 },
    /// The timestamp is earlier than the previous down. Never classified.
    Backwards,
}

impl ChatterVerdict {
    pub fn is_chatter(self) -> bool {
        matches!(self, ChatterVerdict::Chatter { .. })
    }

    /// Time since the previous initial down, when there is a meaningful one.
    pub fn delta_us(self) -> Option<u64> {
        match self {
            ChatterVerdict::Normal { delta_us } | ChatterVerdict::Chatter { delta_us } => {
                Some(delta_us)
            }
            ChatterVerdict::Start | ChatterVerdict::Backwards => None,
        }
    }
}

/// Classifies a down against the previous initial down on the same channel.
///
/// Chatter is strictly below the threshold: a delta equal to `threshold` is normal.
#[inline]
pub fn classify_chatter(last_down_us: Option<u64>, now_us: u64, threshold: Duration) -> ChatterVerdict {
    let Some(last) = last_down_us else {
        return ChatterVerdict::Start;
    };
    match now_us.checked_sub(last) {
        Some(delta_us) if Duration::from_micros(delta_us) < threshold => {
            ChatterVerdict::Chatter { delta_us }
        }
        Some(delta_us) => ChatterVerdict::Normal { delta_us },
        None => ChatterVerdict::Backwards,
    }
}

/// Verdict of the double-click detector when a pair completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickPair {
    /// Two downs inside the double-click window.
    DoubleClick { interval_us: u64 },
    /// Two downs closer than any intentional double click; a single click
    /// that registered twice.
    Faulty { interval_us: u64 },
}

#[derive(Debug, Clone, Copy, Default)]
struct ClickRun {
    last_click_us: Option<u64>,
    run_length: u8,
}

/// Per-button double-click detector.
///
/// A run of downs inside the window is evaluated when it reaches two, after
/// which the run restarts from zero, so a third rapid click begins a fresh pair.
#[derive(Debug, Clone, Default)]
pub struct DoubleClickDetector {
    runs: HashMap<u8, ClickRun>,
}

impl DoubleClickDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_click(
        &mut self,
        button: u8,
        now_us: u64,
        window: Duration,
        faulty: Duration,
    ) -> Option<ClickPair> {
        let run = self.runs.entry(button).or_default();

        let within_window = run
            .last_click_us
            .and_then(|last| now_us.checked_sub(last))
            .map(|delta| (delta, Duration::from_micros(delta) <= window));

        let mut verdict = None;
        match within_window {
            Some((interval_us, true)) => {
                run.run_length = run.run_length.saturating_add(1);
                if run.run_length == 2 {
                    let interval = Duration::from_micros(interval_us);
                    verdict = if interval < faulty {
                        Some(ClickPair::Faulty { interval_us })
                    } else {
                        Some(ClickPair::DoubleClick { interval_us })
                    };
                    run.run_length = 0;
                }
            }
            _ => run.run_length = 1,
        }

        run.last_click_us = Some(now_us);
        verdict
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }
}

/// Direction of a vertical wheel tick. Horizontal ticks are only counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDirection {
    Up,
    Down,
}

/// Outcome of one vertical wheel tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelVerdict {
    Start,
    Normal { delta_us: u64 },
    /// Direction flipped faster than the bounce threshold (encoder fault signal).
    Bounce { delta_us: u64 },
}

/// Detects wheel encoder bounce: a vertical tick reversing the previous
/// vertical direction within the bounce threshold.
#[derive(Debug, Clone, Default)]
pub struct WheelDetector {
    last: Option<(WheelDirection, u64)>,
}

impl WheelDetector {
    /// Feeds one vertical tick. Horizontal ticks are not tracked here.
    pub fn on_tick(&mut self, direction: WheelDirection, now_us: u64, bounce: Duration) -> WheelVerdict {
        let verdict = match self.last {
            None => WheelVerdict::Start,
            Some((prev_dir, prev_us)) => match now_us.checked_sub(prev_us) {
                Some(delta_us) if prev_dir != direction && Duration::from_micros(delta_us) < bounce => {
                    WheelVerdict::Bounce { delta_us }
                }
                Some(delta_us) => WheelVerdict::Normal { delta_us },
                None => WheelVerdict::Start,
            },
        };
        self.last = Some((direction, now_us));
        verdict
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
