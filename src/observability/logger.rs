//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields sorted by key
//! - Synchronous, no buffering
//! - Lines below the configured severity are dropped
//!
//! A logger is a value, not global state: the sequencer owns one, and
//! tests hand it a capture buffer instead of stdout.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use super::Event;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Write attempt aborted
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-memory log destination, shared between a logger and its reader.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Captured output split into lines.
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn append(&self, line: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(line);
    }
}

#[derive(Debug, Clone)]
enum LogTarget {
    /// INFO and below to stdout, WARN and above to stderr
    Console,
    Buffer(LogBuffer),
    Discard,
}

/// A structured logger that outputs one JSON object per line
#[derive(Debug, Clone)]
pub struct Logger {
    min_severity: Severity,
    target: LogTarget,
}

impl Logger {
    /// Console logger at INFO.
    pub fn console() -> Self {
        Self {
            min_severity: Severity::Info,
            target: LogTarget::Console,
        }
    }

    /// Logger that drops everything.
    pub fn disabled() -> Self {
        Self {
            min_severity: Severity::Fatal,
            target: LogTarget::Discard,
        }
    }

    /// Logger writing every severity into the returned buffer.
    pub fn capture() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        let logger = Self {
            min_severity: Severity::Trace,
            target: LogTarget::Buffer(buffer.clone()),
        };
        (logger, buffer)
    }

    /// Drop lines below `min_severity`.
    pub fn with_min_severity(mut self, min_severity: Severity) -> Self {
        self.min_severity = min_severity;
        self
    }

    pub fn is_enabled(&self, severity: Severity) -> bool {
        !matches!(self.target, LogTarget::Discard) && severity >= self.min_severity
    }

    /// Log an event with the given severity and fields
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !self.is_enabled(severity) {
            return;
        }
        let line = render(severity, event, fields);
        match &self.target {
            LogTarget::Console if severity >= Severity::Warn => {
                let _ = io::stderr().write_all(line.as_bytes());
            }
            LogTarget::Console => {
                let _ = io::stdout().write_all(line.as_bytes());
            }
            LogTarget::Buffer(buffer) => buffer.append(line.as_bytes()),
            LogTarget::Discard => {}
        }
    }

    /// Log a sequencing event at its own severity
    pub fn event(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(event.severity(), event.as_str(), fields);
    }

    pub fn trace(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::console()
    }
}

/// Build one JSON line. serde_json handles escaping; key order is fixed
/// here rather than left to a map.
fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(128);
    output.push_str("{\"event\":");
    output.push_str(&Value::from(event).to_string());
    output.push_str(",\"severity\":\"");
    output.push_str(severity.as_str());
    output.push('"');

    let mut sorted_fields: Vec<_> = fields.iter().collect();
    sorted_fields.sort_by_key(|(k, _)| *k);
    for (key, value) in sorted_fields {
        output.push(',');
        output.push_str(&Value::from(*key).to_string());
        output.push(':');
        output.push_str(&Value::from(*value).to_string());
    }

    output.push_str("}\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_log_json_format() {
        let (logger, buffer) = Logger::capture();
        logger.info("TEST_EVENT", &[]);

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["event"], "TEST_EVENT");
        assert_eq!(parsed["severity"], "INFO");
    }

    #[test]
    fn test_log_deterministic_ordering() {
        let a = render(Severity::Info, "T", &[("zebra", "1"), ("apple", "2"), ("mango", "3")]);
        let b = render(Severity::Info, "T", &[("apple", "2"), ("mango", "3"), ("zebra", "1")]);
        assert_eq!(a, b);

        let apple = a.find("apple").unwrap();
        let mango = a.find("mango").unwrap();
        let zebra = a.find("zebra").unwrap();
        assert!(apple < mango && mango < zebra);
        assert!(a.find("\"event\"").unwrap() < a.find("\"severity\"").unwrap());
    }

    #[test]
    fn test_log_escapes_special_chars() {
        let line = render(Severity::Info, "T", &[("edit", "row \"a\"\nnext")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["edit"], "row \"a\"\nnext");
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_min_severity_filters() {
        let (logger, buffer) = Logger::capture();
        let logger = logger.with_min_severity(Severity::Warn);
        logger.info("DROPPED", &[]);
        logger.warn("KEPT", &[]);

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("KEPT"));
    }

    #[test]
    fn test_disabled_logger() {
        let logger = Logger::disabled();
        assert!(!logger.is_enabled(Severity::Fatal));
        logger.error("NOTHING", &[]);
    }

    #[test]
    fn test_event_uses_event_severity() {
        let (logger, buffer) = Logger::capture();
        logger.event(Event::OutOfOrder, &[("txid", "4")]);

        let parsed: serde_json::Value = serde_json::from_str(&buffer.lines()[0]).unwrap();
        assert_eq!(parsed["event"], "ENTRY_OUT_OF_ORDER");
        assert_eq!(parsed["severity"], "FATAL");
        assert_eq!(parsed["txid"], "4");
    }
}
