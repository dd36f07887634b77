//! Simulated event clock and the append-only event log consumers read.
//!
//! The clock is an event counter, not wall-clock time: it advances by
//! [`LOG_TIME_STEP`] each time an entry is appended.

use crate::config::LOG_TIME_STEP;
use crate::obstacle::DifficultyColor;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimClock {
    counter: f64,
}

impl SimClock {
    pub fn new() -> Self {
        SimClock { counter: 0.0 }
    }

    pub fn now(&self) -> f64 {
        self.counter
    }

    fn advance(&mut self) {
        self.counter += LOG_TIME_STEP;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: f64,
    pub message: String,
    pub tag: Option<DifficultyColor>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time {:.1}s: {}", self.timestamp, self.message)
    }
}

/// Ordered, append-only record of what happened during a run.
///
/// Once sealed (the run finished) further appends are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    clock: SimClock,
    entries: Vec<LogEntry>,
    sealed: bool,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, message: impl Into<String>, tag: Option<DifficultyColor>) {
        if self.sealed {
            return;
        }
        let entry = LogEntry {
            timestamp: self.clock.now(),
            message: message.into(),
            tag,
        };
        log::info!(target: "sim", "{}", entry);
        self.entries.push(entry);
        self.clock.advance();
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn current(&self) -> f64 {
        self.clock.now()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
