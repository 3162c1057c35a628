// Main application entry point.
// Orchestrates command-line parsing, thread setup, the main event loop,
// signal handling, and final snapshot reporting.

use crossbeam_channel::{bounded, Sender, TrySendError};
use signal_hook::consts::signal::*;
use signal_hook::iterator::Signals;
use std::io;
use std::process::exit;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::thread;
use tracing::{debug, error, info, warn};

use input_probe::cli::{self, InputFormat};
use input_probe::config::Config;
use input_probe::event::{read_event, EvdevTranslator, InputEvent, JsonEventReader};
use input_probe::logger::{LogMessage, Logger};
use input_probe::{report, telemetry, Session};

/// Holds state specific to the main processing thread, primarily for managing
/// communication with the logger thread and handling log drop warnings.
struct MainState {
    log_sender: Sender<LogMessage>,
    // Next log sequence number not yet forwarded, per engine (keyboard, mouse).
    next_seq: [u64; 2],
    currently_dropping: bool,
    dropped: u64,
}

impl MainState {
    /// Forwards every entry appended since the last call, from both engines.
    fn forward_new_entries(&mut self, session: &Session) {
        for (next_seq, (category, engine)) in self.next_seq.iter_mut().zip(session.engines()) {
            let log = engine.log();
            for entry in log.since(*next_seq) {
                match self.log_sender.try_send(LogMessage::Entry(entry.clone())) {
                    Ok(()) => {
                        if self.currently_dropping {
                            info!(dropped = self.dropped, "Logger caught up, resuming log feed");
                            self.currently_dropping = false;
                        }
                    }
                    Err(TrySendError::Full(_)) => {
                        if !self.currently_dropping {
                            warn!(?category, "Logger channel full, dropping log entries");
                            self.currently_dropping = true;
                        }
                        self.dropped += 1;
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!("Logger channel disconnected");
                    }
                }
            }
            *next_seq = log.next_seq();
        }
    }
}

fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| {
        error!("Session mutex was poisoned, continuing with inner state");
        poisoned.into_inner()
    })
}

fn print_final_snapshot(session: &Session, cfg: &Config) {
    let stdout = io::stdout().lock();
    let result = if cfg.stats_json {
        report::print_session_json(session, stdout)
    } else {
        report::print_session_human(session, cfg.locale, stdout)
    };
    if let Err(e) = result {
        error!(error = %e, "Failed to print snapshot");
    }
}

fn main() -> io::Result<()> {
    let args = cli::parse_args();
    let cfg = Arc::new(Config::from(&args));

    telemetry::init_tracing(&cfg);
    if let Err(msg) = cfg.validate() {
        error!("Invalid configuration: {msg}");
        exit(2);
    }

    // Keyboard and mouse each get their own engine and active set.
    let session = Arc::new(Mutex::new(Session::new(cfg.thresholds())));
    let final_stats_printed = Arc::new(AtomicBool::new(false));

    // --- Logger thread ---
    let (log_sender, log_receiver) = bounded::<LogMessage>(cfg.log_channel_capacity);
    let logger_running = Arc::new(AtomicBool::new(true));
    let logger_handle = {
        let running = Arc::clone(&logger_running);
        let cfg = Arc::clone(&cfg);
        thread::Builder::new()
            .name("logger".into())
            .spawn(move || Logger::new(log_receiver, running, cfg, io::stdout()).run())?
    };

    // --- Signal thread ---
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT])?;
    {
        let session = Arc::clone(&session);
        let printed = Arc::clone(&final_stats_printed);
        let cfg = Arc::clone(&cfg);
        thread::spawn(move || {
            if let Some(sig) = signals.forever().next() {
                if !printed.swap(true, Ordering::SeqCst) {
                    info!(signal = sig, "Received signal, printing final snapshot");
                    print_final_snapshot(&lock_session(&session), &cfg);
                }
                exit(128 + sig);
            }
        });
    }

    let mut state = MainState {
        log_sender,
        next_seq: [0; 2],
        currently_dropping: false,
        dropped: 0,
    };

    let mut handle = |ev: &InputEvent| {
        let mut session = lock_session(&session);
        session.process(ev);
        state.forward_new_entries(&session);
    };

    // --- Main event loop ---
    let read_result: io::Result<()> = match cfg.format {
        InputFormat::Jsonl => {
            let mut reader = JsonEventReader::new(io::stdin().lock());
            let result = (|| -> io::Result<()> {
                while let Some(ev) = reader.next_event()? {
                    handle(&ev);
                }
                Ok(())
            })();
            if reader.skipped() > 0 {
                warn!(skipped = reader.skipped(), "Malformed input lines were skipped");
            }
            result
        }
        InputFormat::Evdev => {
            let mut stdin = io::stdin().lock();
            let mut translator = EvdevTranslator::new();
            let mut batch = Vec::with_capacity(4);
            (|| -> io::Result<()> {
                while let Some(raw) = read_event(&mut stdin)? {
                    translator.translate(&raw, &mut batch);
                    for ev in batch.drain(..) {
                        handle(&ev);
                    }
                }
                Ok(())
            })()
        }
    };
    drop(handle);

    // Closing the channel lets the logger drain and exit.
    drop(state);
    logger_running.store(false, Ordering::SeqCst);
    match logger_handle.join() {
        Ok(tally) => debug!(?tally, "Logger thread finished"),
        Err(_) => error!("Logger thread panicked"),
    }

    if let Err(e) = read_result {
        error!(error = %e, "Error reading input event");
        exit(3);
    }

    if !final_stats_printed.swap(true, Ordering::SeqCst) {
        print_final_snapshot(&lock_session(&session), &cfg);
    }

    Ok(())
}
