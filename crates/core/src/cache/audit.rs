//! Audit trail of purge decisions.
//!
//! Purely observational: nothing in the engine reads it back.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of an audit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// Sink for audit lines. Fire-and-forget.
pub trait AuditLog: Send + Sync {
    fn log(&self, message: &str, severity: Severity);

    fn info(&self, message: &str) {
        self.log(message, Severity::Info);
    }

    fn error(&self, message: &str) {
        self.log(message, Severity::Error);
    }
}

/// Forwards audit lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl AuditLog for TracingAudit {
    fn log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "purgekit::audit", "{message}"),
            Severity::Error => tracing::error!(target: "purgekit::audit", "{message}"),
        }
    }
}

/// One recorded audit line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub severity: Severity,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Keeps audit lines in memory for inspection.
#[derive(Debug, Default)]
pub struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Messages logged at `Severity::Error`.
    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .map(|e| e.message)
            .collect()
    }
}

impl AuditLog for MemoryAudit {
    fn log(&self, message: &str, severity: Severity) {
        let entry = AuditEntry { severity, message: message.to_string(), at: Utc::now() };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
