//! Bounded, newest-first event log.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use super::channel::ChannelId;
use super::detector::WheelDirection;
use crate::util::format_us;

/// Severity attached to each log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Normal,
    /// Chatter, wheel bounce.
    Warning,
    /// Faulty double click.
    Fault,
}

/// Why a channel was released without a real "up" event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseCause {
    FocusLost,
    MoveCorrection,
}

/// Structured content of a log entry. Rendering to text happens at the
/// presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogKind {
    /// An initial down. `since_last_us` is `None` for the first down on the
    /// channel (the start marker) and when `backwards` is set.
    Down {
        channel: ChannelId,
        since_last_us: Option<u64>,
        chatter: bool,
        /// Timestamp earlier than the channel's previous down.
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        backwards: bool,
    },
    Up {
        channel: ChannelId,
        held_us: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        forced: Option<ReleaseCause>,
    },
    DoubleClick {
        channel: ChannelId,
        interval_us: u64,
    },
    FaultyDoubleClick {
        channel: ChannelId,
        interval_us: u64,
    },
    Scroll {
        direction: WheelDirection,
        since_last_us: Option<u64>,
        bounce: bool,
    },
    PollingStarted,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub seq: u64,
    pub timestamp_us: u64,
    pub classification: Classification,
    #[serde(flatten)]
    pub kind: LogKind,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let since = |d: &Option<u64>| match d {
            Some(us) => format!("+{}", format_us(*us)),
            None => "start".to_string(),
        };
        match &self.kind {
            LogKind::Down { channel, since_last_us, chatter, backwards } => {
                if *backwards {
                    write!(f, "{channel} down (time went backwards)")?;
                } else {
                    write!(f, "{channel} down ({})", since(since_last_us))?;
                }
                if *chatter {
                    f.write_str(" chatter")?;
                }
                Ok(())
            }
            LogKind::Up { channel, held_us, forced } => {
                write!(f, "{channel} up")?;
                if let Some(held) = held_us {
                    write!(f, " (held {})", format_us(*held))?;
                }
                match forced {
                    Some(ReleaseCause::FocusLost) => f.write_str(" [focus lost]"),
                    Some(ReleaseCause::MoveCorrection) => f.write_str(" [recovered]"),
                    None => Ok(()),
                }
            }
            LogKind::DoubleClick { channel, interval_us } => {
                write!(f, "{channel} double click ({})", format_us(*interval_us))
            }
            LogKind::FaultyDoubleClick { channel, interval_us } => {
                write!(f, "{channel} faulty double click ({})", format_us(*interval_us))
            }
            LogKind::Scroll { direction, since_last_us, bounce } => {
                write!(f, "Wheel {direction:?} ({})", since(since_last_us))?;
                if *bounce {
                    f.write_str(" bounce")?;
                }
                Ok(())
            }
            LogKind::PollingStarted => f.write_str("polling started"),
            LogKind::Reset => f.write_str("reset"),
        }
    }
}

/// Capacity-bounded log; index 0 is the newest entry.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        EventLog {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Prepends an entry, dropping the oldest when over capacity. Returns the
    /// entry's sequence number.
    pub fn append(&mut self, timestamp_us: u64, kind: LogKind, classification: Classification) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_front(LogEntry {
            seq,
            timestamp_us,
            classification,
            kind,
        });
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
        seq
    }

    /// Newest-first view.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Retained entries with `seq >= from`, oldest first.
    pub fn since(&self, from: u64) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev().filter(move |e| e.seq >= from)
    }

    /// Sequence number the next appended entry will get.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry. Sequence numbers keep increasing across clears.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
