//! Event log store backed by the systemd journal
//!
//! Log names (case-insensitive):
//! - `all` / `application`: the whole journal visible to the caller
//! - `system`, `user`, `kernel`
//! - `unit:<service>`: one systemd unit
//! - `identifier:<tag>`: one syslog identifier

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::command::{output_text, run};
use super::EventLogStore;
use crate::config::EventLogConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::types::{LogEntry, LogQuery, Severity};

/// Native event log store
pub struct Journalctl {
    journalctl: String,
    timeout: Duration,
}

impl Journalctl {
    pub fn new(config: &EventLogConfig) -> Self {
        Self {
            journalctl: config.journalctl.clone(),
            timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }
}

#[async_trait]
impl EventLogStore for Journalctl {
    async fn read(&self, query: &LogQuery) -> InventoryResult<Vec<LogEntry>> {
        let args = journal_args(query)?;
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = run(&self.journalctl, &arg_refs, self.timeout).await?;
        let (stdout, stderr) = output_text(&output);

        if !output.status.success() {
            let lower = stderr.to_lowercase();
            return Err(if lower.contains("no journal files") {
                InventoryError::Unavailable(format!("event log {}: {}", query.log, stderr.trim()))
            } else if lower.contains("permission denied") || lower.contains("access denied") {
                InventoryError::access_denied(format!("read event log {}", query.log))
            } else {
                InventoryError::Unknown(format!("read event log {}: {}", query.log, stderr.trim()))
            });
        }

        let mut malformed = 0usize;
        let entries: Vec<LogEntry> = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let entry = parse_entry(line);
                if entry.is_none() {
                    malformed += 1;
                }
                entry
            })
            .collect();

        if malformed > 0 {
            tracing::debug!(malformed, log = %query.log, "skipped unparseable journal lines");
        }
        Ok(entries)
    }
}

/// Build journalctl arguments for a query
fn journal_args(query: &LogQuery) -> InventoryResult<Vec<String>> {
    let mut args = vec![
        "--output=json".to_string(),
        "--no-pager".to_string(),
        "--reverse".to_string(),
        format!("--lines={}", query.max_entries),
    ];

    let log = query.log.trim();
    let lower = log.to_lowercase();
    match lower.as_str() {
        "all" | "application" => {}
        "system" => args.push("--system".to_string()),
        "user" => args.push("--user".to_string()),
        "kernel" => args.push("--dmesg".to_string()),
        _ => {
            let (flag, value) = if lower.starts_with("unit:") {
                ("--unit", &log["unit:".len()..])
            } else if lower.starts_with("identifier:") {
                ("--identifier", &log["identifier:".len()..])
            } else {
                return Err(InventoryError::not_found("event log", log));
            };
            if value.is_empty() || value.starts_with('-') {
                return Err(InventoryError::not_found("event log", log));
            }
            args.push(format!("{}={}", flag, value));
        }
    }

    // Exact bounds: anything outside the window would still take a --lines slot
    if let Some(since) = query.since {
        args.push(format!("--since={}", journal_time(since)));
    }
    if let Some(until) = query.until {
        args.push(format!("--until={}", journal_time(until)));
    }
    if let Some(severity) = query.severity {
        let (from, to) = severity.syslog_range();
        args.push(format!("--priority={}..{}", from, to));
    }

    Ok(args)
}

/// `@seconds.micros`, the journal's own timestamp resolution
fn journal_time(t: DateTime<Utc>) -> String {
    format!("@{}.{:06}", t.timestamp(), t.timestamp_subsec_micros())
}

fn field_str(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        // Non-UTF-8 payloads are exported as byte arrays
        Value::Array(bytes) => {
            let raw: Vec<u8> = bytes
                .iter()
                .filter_map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            Some(String::from_utf8_lossy(&raw).into_owned())
        }
        _ => None,
    }
}

/// Parse one line of `journalctl --output=json`
fn parse_entry(line: &str) -> Option<LogEntry> {
    let record: Value = serde_json::from_str(line).ok()?;

    let micros: i64 = field_str(&record, "__REALTIME_TIMESTAMP")?.parse().ok()?;
    let timestamp = DateTime::<Utc>::from_timestamp_micros(micros)?;

    let priority = field_str(&record, "PRIORITY")
        .and_then(|p| p.parse::<u8>().ok())
        .unwrap_or(6);

    let source = field_str(&record, "SYSLOG_IDENTIFIER")
        .or_else(|| field_str(&record, "_COMM"))
        .unwrap_or_else(|| "unknown".to_string());

    Some(LogEntry {
        severity: Severity::from_syslog_priority(priority),
        timestamp,
        source,
        event_id: field_str(&record, "MESSAGE_ID"),
        message: field_str(&record, "MESSAGE").unwrap_or_default(),
    })
}
