//! Rolling polling-rate statistics for the pointer sample stream.

use std::collections::VecDeque;

/// Bounded window of the most recent accepted intervals.
///
/// Keeps the raw intervals (for jitter) and the instantaneous rate derived from
/// each one (for the average), evicting the oldest pair on overflow.
#[derive(Debug, Clone)]
pub struct TimingWindow {
    intervals_us: VecDeque<u64>,
    hz: VecDeque<f64>,
    capacity: usize,
}

impl TimingWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TimingWindow {
            intervals_us: VecDeque::with_capacity(capacity),
            hz: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, interval_us: u64, hz: f64) {
        if self.intervals_us.len() == self.capacity {
            self.intervals_us.pop_front();
            self.hz.pop_front();
        }
        self.intervals_us.push_back(interval_us);
        self.hz.push_back(hz);
    }

    pub fn len(&self) -> usize {
        self.intervals_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals_us.is_empty()
    }

    /// Mean of the instantaneous rates in the window, 0 when empty.
    pub fn avg_hz(&self) -> f64 {
        if self.hz.is_empty() {
            return 0.0;
        }
        self.hz.iter().sum::<f64>() / self.hz.len() as f64
    }

    pub fn mean_interval_us(&self) -> f64 {
        if self.intervals_us.is_empty() {
            return 0.0;
        }
        self.intervals_us.iter().sum::<u64>() as f64 / self.intervals_us.len() as f64
    }

    /// RMS deviation of the raw intervals from their mean, in milliseconds.
    pub fn jitter_ms(&self) -> f64 {
        if self.intervals_us.is_empty() {
            return 0.0;
        }
        let mean = self.mean_interval_us();
        let var = self
            .intervals_us
            .iter()
            .map(|&i| {
                let d = i as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / self.intervals_us.len() as f64;
        var.sqrt() / 1000.0
    }

    pub fn clear(&mut self) {
        self.intervals_us.clear();
        self.hz.clear();
    }
}

/// What a single pointer sample did to the meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// First sample of the session; only the timestamp is recorded.
    Start,
    /// Accepted into the window at this instantaneous rate.
    Accepted { hz: f64 },
    /// Same or earlier timestamp than the previous sample.
    NonPositive,
    /// Rate above the sanity ceiling; a timer artifact rather than a real sample.
    Outlier { hz: f64 },
}

/// Polling-rate meter: instantaneous rate, rolling average, jitter and peak.
#[derive(Debug, Clone)]
pub struct PollingMeter {
    last_sample_us: Option<u64>,
    window: TimingWindow,
    max_hz: f64,
    ceiling_hz: f64,
    accepted: u64,
    discarded: u64,
}

impl PollingMeter {
    pub fn new(window: usize, ceiling_hz: f64) -> Self {
        PollingMeter {
            last_sample_us: None,
            window: TimingWindow::with_capacity(window),
            max_hz: 0.0,
            ceiling_hz,
            accepted: 0,
            discarded: 0,
        }
    }

    pub fn sample(&mut self, now_us: u64) -> SampleOutcome {
        let Some(last) = self.last_sample_us else {
            self.last_sample_us = Some(now_us);
            return SampleOutcome::Start;
        };

        let interval_us = match now_us.checked_sub(last) {
            Some(i) if i > 0 => i,
            // Coalesced or reordered sample: keep the later of the two timestamps.
            _ => {
                self.last_sample_us = Some(last.max(now_us));
                return SampleOutcome::NonPositive;
            }
        };
        self.last_sample_us = Some(now_us);

        let hz = 1_000_000.0 / interval_us as f64;
        if hz > self.ceiling_hz {
            self.discarded += 1;
            return SampleOutcome::Outlier { hz };
        }

        self.window.push(interval_us, hz);
        self.accepted += 1;
        if hz > self.max_hz {
            self.max_hz = hz;
        }
        SampleOutcome::Accepted { hz }
    }

    pub fn avg_hz(&self) -> f64 {
        self.window.avg_hz()
    }

    pub fn jitter_ms(&self) -> f64 {
        self.window.jitter_ms()
    }

    pub fn max_hz(&self) -> f64 {
        self.max_hz
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn window(&self) -> &TimingWindow {
        &self.window
    }

    pub fn clear(&mut self) {
        self.last_sample_us = None;
        self.window.clear();
        self.max_hz = 0.0;
        self.accepted = 0;
        self.discarded = 0;
    }
}
