use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};

/// One timestamped dashboard log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub seq: u64,
    pub at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Bounded, append-only log shown to the user. Oldest lines fall off the
/// front once `capacity` is reached; sequence numbers never repeat.
#[derive(Debug, Clone)]
pub struct EventLog {
    lines: VecDeque<LogLine>,
    capacity: usize,
    next_seq: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine {
            seq,
            at: Local::now(),
            message: message.into(),
        });
        seq
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.push("Log cleared");
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sequence number the next pushed line will receive
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &LogLine> + ExactSizeIterator {
        self.lines.iter()
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    /// Lines appended at or after `seq` that are still retained
    pub fn since(&self, seq: u64) -> impl Iterator<Item = &LogLine> {
        self.lines.iter().filter(move |line| line.seq >= seq)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LOG_CAPACITY)
    }
}
