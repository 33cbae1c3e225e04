//! Event log types and query filtering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::summarize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl Severity {
    /// Map a syslog priority (0 = emerg .. 7 = debug)
    pub fn from_syslog_priority(priority: u8) -> Self {
        match priority {
            0..=3 => Severity::Error,
            4 => Severity::Warning,
            _ => Severity::Information,
        }
    }

    /// Inclusive syslog priority range covered by this severity
    pub fn syslog_range(self) -> (u8, u8) {
        match self {
            Severity::Error => (0, 3),
            Severity::Warning => (4, 4),
            Severity::Information => (5, 7),
        }
    }
}

/// One event log record; `message` is always the full text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub event_id: Option<String>,
    pub message: String,
}

impl LogEntry {
    /// Single-line display form, truncated to `max_chars`
    pub fn summary(&self, max_chars: usize) -> String {
        summarize(&self.message, max_chars)
    }
}

/// Which slice of which log to read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogQuery {
    pub log: String,
    pub max_entries: usize,
    /// Inclusive lower bound
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub until: Option<DateTime<Utc>>,
    /// `None` means every severity
    pub severity: Option<Severity>,
}

impl LogQuery {
    pub fn new(log: impl Into<String>, max_entries: usize) -> Self {
        Self {
            log: log.into(),
            max_entries,
            since: None,
            until: None,
            severity: None,
        }
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.since.is_some_and(|since| entry.timestamp < since) {
            return false;
        }
        if self.until.is_some_and(|until| entry.timestamp > until) {
            return false;
        }
        self.severity.map_or(true, |s| entry.severity == s)
    }

    /// Filter, order newest first and cut to `max_entries`
    pub fn apply(&self, mut entries: Vec<LogEntry>) -> Vec<LogEntry> {
        entries.retain(|e| self.matches(e));
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(self.max_entries);
        entries
    }
}
