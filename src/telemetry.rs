//! Tracing initialization logic.

use crate::{config::Config, util};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber: an fmt layer on stderr, JSON-formatted
/// when `--stats-json` is set, filtered by `RUST_LOG` or the verbosity flag.
pub fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid RUST_LOG '{}': {e}", cfg.log_filter);
        EnvFilter::new("input_probe=info")
    });

    let registry = tracing_subscriber::registry().with(filter);
    if cfg.stats_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(cfg.verbose)
                    .with_level(true),
            )
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        build_ts = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        "input-probe starting"
    );

    let t = &cfg.thresholds;
    info!(format = ?cfg.format,
        chatter = %util::format_duration(t.chatter),
        double_click_window = %util::format_duration(t.double_click_window),
        faulty_double_click = %util::format_duration(t.faulty_double_click),
        wheel_bounce = %util::format_duration(t.wheel_bounce),
        max_hz = t.max_hz,
        timing_window = t.timing_window,
        log_capacity = t.log_capacity,
        log_interval = %util::format_duration(cfg.log_interval),
        log_all = cfg.log_all_events,
        log_anomalies = cfg.log_anomalies,
        stats_json = cfg.stats_json,
        locale = ?cfg.locale,
        log_filter = %cfg.log_filter,
        "Configuration loaded");
}
