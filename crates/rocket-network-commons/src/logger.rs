//! Diagnostic reporting for network failures
//!
//! Failure paths hand a [`LogEntry`] to a [`CrashLogger`]. Loggers are
//! write-only sinks: they never fail the call that reports to them and never
//! influence its outcome.

use crate::transport::{format_headers, RawResponse, RequestInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LOG_RESPONSE_CODE: &str = "RESPONSE_CODE";
pub const LOG_RESPONSE_URL: &str = "RESPONSE_URL";
pub const LOG_RESPONSE_MESSAGE: &str = "RESPONSE_MESSAGE";
pub const LOG_RESPONSE_HEADERS: &str = "RESPONSE_HEADERS";
pub const LOG_RESPONSE_BODY: &str = "RESPONSE_BODY";

pub const LOG_REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const LOG_REQUEST_URL: &str = "REQUEST_URL";
pub const LOG_REQUEST_BODY: &str = "REQUEST_BODY";
pub const LOG_REQUEST_HEADERS: &str = "REQUEST_HEADERS";

/// Structured context attached to a log entry
pub type LogMap = BTreeMap<String, Option<String>>;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One diagnostic record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Human readable message
    pub message: Option<String>,
    /// Message of the fault being reported
    pub exception: Option<String>,
    /// Request/response context
    pub map: LogMap,
    pub level: LogLevel,
    /// Optional external destination for this entry
    pub log_path: Option<PathBuf>,
    /// RFC 3339 creation time
    pub timestamp: String,
}

impl LogEntry {
    /// Create an empty entry at the given level
    pub fn new(level: LogLevel) -> Self {
        Self {
            message: None,
            exception: None,
            map: LogMap::new(),
            level,
            log_path: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn exception(mut self, exception: impl fmt::Display) -> Self {
        self.exception = Some(exception.to_string());
        self
    }

    /// Merge a context map into the entry
    pub fn map(mut self, map: LogMap) -> Self {
        self.map.extend(map);
        self
    }

    /// Add a single context value
    pub fn entry(mut self, key: &str, value: Option<String>) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }

    /// Context value for `key`, if present and non-null
    pub fn value(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(|v| v.as_deref())
    }
}

/// Sink for diagnostic records
pub trait CrashLogger: Send + Sync {
    /// Record an entry. Must not panic.
    fn log(&self, entry: LogEntry);

    /// Record a plain message
    fn log_message(&self, message: &str, map: LogMap, level: LogLevel) {
        self.log(LogEntry::new(level).message(message).map(map));
    }

    /// Record a fault
    fn log_exception(&self, exception: &dyn std::error::Error, map: LogMap, level: LogLevel) {
        self.log(LogEntry::new(level).exception(exception).map(map));
    }
}

/// Default logger: emits through `tracing` and, when an entry names a
/// destination, appends it there as one JSON line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    fn append(path: &Path, entry: &LogEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry).map_err(std::io::Error::other)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)
    }
}

impl CrashLogger for TracingLogger {
    fn log(&self, entry: LogEntry) {
        let message = entry.message.as_deref().unwrap_or_default();
        let exception = entry.exception.as_deref().unwrap_or_default();
        match entry.level {
            LogLevel::Debug => tracing::debug!(exception, context = ?entry.map, "{}", message),
            LogLevel::Warn => tracing::warn!(exception, context = ?entry.map, "{}", message),
            LogLevel::Error => tracing::error!(exception, context = ?entry.map, "{}", message),
        }

        if let Some(path) = entry.log_path.as_deref() {
            if let Err(e) = Self::append(path, &entry) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to write log entry");
            }
        }
    }
}

/// Context map describing a request
pub fn map_from_request(request: &RequestInfo) -> LogMap {
    LogMap::from([
        (LOG_REQUEST_METHOD.to_string(), Some(request.method.clone())),
        (LOG_REQUEST_URL.to_string(), Some(request.url.clone())),
        (LOG_REQUEST_HEADERS.to_string(), Some(format_headers(&request.headers))),
    ])
}

/// Context map describing a response and the request behind it
pub fn map_from_response(response: &RawResponse) -> LogMap {
    LogMap::from([
        (LOG_RESPONSE_CODE.to_string(), Some(response.status.to_string())),
        (LOG_RESPONSE_URL.to_string(), Some(response.request.url.clone())),
        (LOG_RESPONSE_MESSAGE.to_string(), Some(response.message.clone())),
        (LOG_RESPONSE_HEADERS.to_string(), Some(format_headers(&response.headers))),
        (LOG_RESPONSE_BODY.to_string(), Some(response.body.clone())),
        (LOG_REQUEST_METHOD.to_string(), Some(response.request.method.clone())),
        (LOG_REQUEST_HEADERS.to_string(), Some(format_headers(&response.request.headers))),
        (LOG_REQUEST_BODY.to_string(), Some(response.request.body.clone().unwrap_or_default())),
    ])
}
