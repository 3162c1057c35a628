// This module defines the Logger thread, which prints the classified log feed
// and keeps cumulative/interval tallies of the entries it receives from the
// main processing thread.

use chrono::Local;
use colored::*;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::engine::log::{Classification, LogEntry};
use crate::labels::{classification_label, render_entry};
use crate::util::format_us;

/// Represents a message sent from the main thread to the logger thread.
#[derive(Debug)]
pub enum LogMessage {
    /// A newly appended engine log entry.
    Entry(LogEntry),
}

/// Count of log entries by classification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogTally {
    pub normal: u64,
    pub warning: u64,
    pub fault: u64,
}

impl LogTally {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Normal => self.normal += 1,
            Classification::Warning => self.warning += 1,
            Classification::Fault => self.fault += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.normal + self.warning + self.fault
    }

    pub fn anomalies(&self) -> u64 {
        self.warning + self.fault
    }
}

/// Manages the state and execution loop for the logger thread.
pub struct Logger<W: Write> {
    receiver: Receiver<LogMessage>,
    // Shared flag to signal logger thread termination.
    logger_running: Arc<AtomicBool>,
    cfg: Arc<Config>,
    writer: W,

    // `cumulative` holds totals for the entire run, `interval` since the last dump.
    cumulative: LogTally,
    interval: LogTally,

    last_dump_time: Instant,
    // Timestamp of the first entry seen by this thread. Used for relative timestamps.
    first_entry_us: Option<u64>,
    write_failed: bool,
}

impl<W: Write> Logger<W> {
    pub fn new(
        receiver: Receiver<LogMessage>,
        logger_running: Arc<AtomicBool>,
        cfg: Arc<Config>,
        writer: W,
    ) -> Self {
        Logger {
            receiver,
            logger_running,
            cfg,
            writer,
            cumulative: LogTally::default(),
            interval: LogTally::default(),
            last_dump_time: Instant::now(),
            first_entry_us: None,
            write_failed: false,
        }
    }

    /// Runs until the running flag is cleared or every sender is dropped,
    /// draining whatever is still queued. Returns the cumulative tally.
    pub fn run(&mut self) -> LogTally {
        let check_interval = Duration::from_millis(100);

        loop {
            if !self.logger_running.load(Ordering::SeqCst) {
                debug!("Logger received shutdown signal, draining channel");
                self.drain();
                break;
            }

            if let Some(interval) = self.cfg.log_interval() {
                if self.last_dump_time.elapsed() >= interval {
                    self.dump_interval_tally();
                    self.last_dump_time = Instant::now();
                }
            }

            match self.receiver.recv_timeout(check_interval) {
                Ok(msg) => self.process_message(msg),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Logger channel disconnected, draining");
                    self.drain();
                    break;
                }
            }
        }

        let _ = self.writer.flush();
        self.cumulative
    }

    fn drain(&mut self) {
        while let Ok(msg) = self.receiver.try_recv() {
            self.process_message(msg);
        }
    }

    fn process_message(&mut self, msg: LogMessage) {
        match msg {
            LogMessage::Entry(entry) => {
                trace!(seq = entry.seq, "Logger processing entry");
                self.cumulative.record(entry.classification);
                self.interval.record(entry.classification);
                self.first_entry_us.get_or_insert(entry.timestamp_us);

                let show = self.cfg.log_all_events
                    || (self.cfg.log_anomalies && entry.classification != Classification::Normal);
                if show {
                    if let Err(e) = self.write_entry(&entry) {
                        if !self.write_failed {
                            warn!(error = %e, "Failed to write log entry");
                            self.write_failed = true;
                        }
                    }
                }
            }
        }
    }

    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()> {
        if self.cfg.stats_json {
            serde_json::to_writer(&mut self.writer, entry)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            return writeln!(self.writer);
        }

        let locale = self.cfg.locale;
        let label = classification_label(entry.classification, locale);
        let status = match entry.classification {
            Classification::Normal => format!("[{label}]").on_green().black().bold(),
            Classification::Warning => format!("[{label}]").on_yellow().black().bold(),
            Classification::Fault => format!("[{label}]").on_red().white().bold(),
        };
        let relative_us = entry
            .timestamp_us
            .checked_sub(self.first_entry_us.unwrap_or(entry.timestamp_us))
            .unwrap_or(0);
        writeln!(
            self.writer,
            "{} {} {}",
            status,
            format_relative_us(relative_us).bright_yellow(),
            render_entry(entry, locale)
        )
    }

    /// Prints the interval tally to stderr and starts a new interval.
    fn dump_interval_tally(&mut self) {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        if self.cfg.stats_json {
            #[derive(Serialize)]
            struct IntervalDump<'a> {
                wallclock: &'a str,
                interval: LogTally,
                cumulative: LogTally,
            }
            let dump = IntervalDump {
                wallclock: &now,
                interval: self.interval,
                cumulative: self.cumulative,
            };
            let mut err = io::stderr().lock();
            let _ = serde_json::to_writer(&mut err, &dump);
            let _ = writeln!(err);
        } else {
            eprintln!(
                "\n{} {} {}",
                "--- Interval Tally (Wallclock:".magenta().bold(),
                now.bright_yellow(),
                ") ---".magenta().bold()
            );
            eprintln!(
                "Entries: {}  Normal: {}  Warning: {}  Fault: {}  (cumulative anomalies: {})",
                self.interval.total(),
                self.interval.normal,
                self.interval.warning.to_string().bright_yellow(),
                self.interval.fault.to_string().bright_red(),
                self.cumulative.anomalies()
            );
        }
        self.interval = LogTally::default();
    }
}

/// Helper to format relative timestamps consistently for logging.
fn format_relative_us(relative_us: u64) -> String {
    format!("{:<10}", format!("+{}", format_us(relative_us)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::channel::ChannelId;
    use crate::engine::log::{EventLog, LogKind};
    use crate::engine::Thresholds;
    use crate::labels::Locale;
    use crossbeam_channel::bounded;

    fn config(log_all: bool, anomalies: bool, json: bool) -> Arc<Config> {
        Arc::new(Config::new(
            Thresholds::default(),
            Duration::ZERO,
            log_all,
            anomalies,
            json,
            Locale::En,
            false,
            16,
        ))
    }

    fn entries() -> Vec<LogEntry> {
        let mut log = EventLog::with_capacity(8);
        let a = ChannelId::key("KeyA");
        log.append(
            0,
            LogKind::Down { channel: a.clone(), since_last_us: None, chatter: false, backwards: false },
            Classification::Normal,
        );
        log.append(
            30_000,
            LogKind::Down { channel: a, since_last_us: Some(30_000), chatter: true, backwards: false },
            Classification::Warning,
        );
        log.since(0).cloned().collect()
    }

    fn run_logger(cfg: Arc<Config>) -> (LogTally, String) {
        colored::control::set_override(false);
        let (tx, rx) = bounded(16);
        for e in entries() {
            tx.send(LogMessage::Entry(e)).unwrap();
        }
        drop(tx);
        let mut out = Vec::new();
        let tally = Logger::new(rx, Arc::new(AtomicBool::new(true)), cfg, &mut out).run();
        (tally, String::from_utf8(out).unwrap())
    }

    #[test]
    fn tallies_every_entry_even_when_silent() {
        let (tally, out) = run_logger(config(false, false, false));
        assert_eq!(tally, LogTally { normal: 1, warning: 1, fault: 0 });
        assert!(out.is_empty());
    }

    #[test]
    fn anomalies_only_prints_warnings() {
        let (_, out) = run_logger(config(false, true, false));
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("[WARN]"));
        assert!(out.contains("A down (+30.0 ms) chatter"));
    }

    #[test]
    fn json_feed_is_one_object_per_line() {
        let (_, out) = run_logger(config(true, false, true));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(v["kind"], "down");
        assert_eq!(v["classification"], "warning");
        assert_eq!(v["channel"], "KeyA");
    }
}
