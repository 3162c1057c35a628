use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::labels::Locale;

/// Encoding of the events read from stdin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// One JSON event object per line.
    #[default]
    Jsonl,
    /// Raw Linux `input_event` structs, as produced by Interception Tools.
    Evdev,
}

/// Keyboard and mouse tester: classifies raw input into counts, concurrency,
/// polling-rate statistics and chatter/double-click anomalies.
///
/// Reads events from stdin, streams the classified log to stdout, and prints
/// a final snapshot on EOF or on SIGINT/SIGTERM/SIGQUIT.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input encoding on stdin.
    #[arg(long, value_enum, default_value_t = InputFormat::Jsonl)]
    pub format: InputFormat,

    /// Two presses of one key or button closer than this are chatter.
    #[arg(long, default_value = "80ms", value_parser = humantime::parse_duration)]
    pub chatter: Duration,

    /// Maximum gap between the two clicks of a double click.
    #[arg(long, default_value = "500ms", value_parser = humantime::parse_duration)]
    pub double_click_window: Duration,

    /// A double click faster than this is reported as a switch fault.
    #[arg(long, default_value = "80ms", value_parser = humantime::parse_duration)]
    pub faulty_double_click: Duration,

    /// Wheel direction reversals faster than this are reported as encoder bounce.
    #[arg(long, default_value = "50ms", value_parser = humantime::parse_duration)]
    pub wheel_bounce: Duration,

    /// Pointer samples implying a rate above this (Hz) are discarded.
    #[arg(long, default_value_t = 10_000.0)]
    pub max_hz: f64,

    /// Number of recent pointer intervals used for average Hz and jitter.
    #[arg(long, default_value_t = 200, value_name = "N")]
    pub timing_window: usize,

    /// Number of entries retained in the in-memory log.
    #[arg(long, default_value_t = 100, value_name = "N")]
    pub log_capacity: usize,

    /// Print every log entry to stdout.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub log_all_events: bool,

    /// Print only warning and fault entries to stdout. Ignored with --log-all-events.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub log_anomalies: bool,

    /// Dump interval tallies to stderr this often (e.g. "30s"). 0 disables.
    #[arg(long, default_value = "0s", value_parser = humantime::parse_duration)]
    pub log_interval: Duration,

    /// Emit the log feed and the final snapshot as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub stats_json: bool,

    /// Language of human-readable output.
    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub locale: Locale,

    /// Enable debug diagnostics on stderr.
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Capacity of the queue between the reader and the logger thread.
    #[arg(long, default_value_t = 1024, value_name = "N")]
    pub log_channel_capacity: usize,
}

/// Parses command line arguments using clap.
pub fn parse_args() -> Args {
    Args::parse()
}
