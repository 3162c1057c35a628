use std::time::Duration;

use crate::cli::{Args, InputFormat};
use crate::engine::Thresholds;
use crate::labels::Locale;

/// Largest timing window and log capacity accepted from the command line.
pub const MAX_TIMING_WINDOW: usize = 4096;
pub const MAX_LOG_CAPACITY: usize = 10_000;

/// Runtime configuration derived from [`Args`].
#[derive(Clone, Debug)]
pub struct Config {
    pub format: InputFormat,
    pub thresholds: Thresholds,
    pub log_interval: Duration,
    pub log_all_events: bool,
    pub log_anomalies: bool,
    pub stats_json: bool,
    pub locale: Locale,
    pub verbose: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub log_channel_capacity: usize,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        thresholds: Thresholds,
        log_interval: Duration,
        log_all_events: bool,
        log_anomalies: bool,
        stats_json: bool,
        locale: Locale,
        verbose: bool,
        log_channel_capacity: usize,
    ) -> Self {
        let default_filter = if verbose {
            "input_probe=debug"
        } else {
            "input_probe=info"
        };
        Self {
            format: InputFormat::default(),
            thresholds,
            log_interval,
            log_all_events,
            // --log-anomalies is ignored when everything is printed anyway.
            log_anomalies: log_anomalies && !log_all_events,
            stats_json,
            locale,
            verbose,
            log_filter: std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
            log_channel_capacity,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds.clone()
    }

    /// Periodic dumps are disabled by a zero interval.
    pub fn log_interval(&self) -> Option<Duration> {
        (!self.log_interval.is_zero()).then_some(self.log_interval)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        let t = &self.thresholds;
        if t.chatter.is_zero() {
            return Err("--chatter must be greater than zero".into());
        }
        if t.double_click_window.is_zero() {
            return Err("--double-click-window must be greater than zero".into());
        }
        if t.faulty_double_click > t.double_click_window {
            return Err(format!(
                "--faulty-double-click ({}) must not exceed --double-click-window ({})",
                crate::util::format_duration(t.faulty_double_click),
                crate::util::format_duration(t.double_click_window),
            ));
        }
        if !(t.max_hz.is_finite() && t.max_hz > 0.0) {
            return Err(format!("--max-hz must be a positive number, got {}", t.max_hz));
        }
        if !(1..=MAX_TIMING_WINDOW).contains(&t.timing_window) {
            return Err(format!("--timing-window must be within 1..={MAX_TIMING_WINDOW}"));
        }
        if !(1..=MAX_LOG_CAPACITY).contains(&t.log_capacity) {
            return Err(format!("--log-capacity must be within 1..={MAX_LOG_CAPACITY}"));
        }
        if self.log_channel_capacity == 0 {
            return Err("--log-channel-capacity must be greater than zero".into());
        }
        Ok(())
    }
}

impl From<&Args> for Config {
    fn from(a: &Args) -> Self {
        let thresholds = Thresholds {
            chatter: a.chatter,
            double_click_window: a.double_click_window,
            faulty_double_click: a.faulty_double_click,
            wheel_bounce: a.wheel_bounce,
            max_hz: a.max_hz,
            timing_window: a.timing_window,
            log_capacity: a.log_capacity,
        };
        let mut cfg = Config::new(
            thresholds,
            a.log_interval,
            a.log_all_events,
            a.log_anomalies,
            a.stats_json,
            a.locale,
            a.verbose,
            a.log_channel_capacity,
        );
        cfg.format = a.format;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Config {
        let args = Args::try_parse_from(std::iter::once("input-probe").chain(args.iter().copied()))
            .unwrap();
        Config::from(&args)
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let cfg = parse(&[]);
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert_eq!(cfg.log_interval(), None);
        assert!(!cfg.log_all_events && !cfg.log_anomalies);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn durations_parse_with_units() {
        let cfg = parse(&["--chatter", "30ms", "--log-interval", "15s", "--format", "evdev"]);
        assert_eq!(cfg.thresholds.chatter, Duration::from_millis(30));
        assert_eq!(cfg.log_interval(), Some(Duration::from_secs(15)));
        assert_eq!(cfg.format, InputFormat::Evdev);
    }

    #[test]
    fn log_all_overrides_anomalies_only() {
        let cfg = parse(&["--log-all-events", "--log-anomalies"]);
        assert!(cfg.log_all_events);
        assert!(!cfg.log_anomalies);
    }

    #[test]
    fn rejects_unusable_settings() {
        assert!(parse(&["--chatter", "0ms"]).validate().is_err());
        assert!(parse(&["--timing-window", "0"]).validate().is_err());
        assert!(parse(&["--log-capacity", "20000"]).validate().is_err());
        assert!(parse(&["--faulty-double-click", "1s"]).validate().is_err());
        assert!(parse(&["--max-hz", "0"]).validate().is_err());
    }
}
