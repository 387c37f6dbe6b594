//! Structured JSON logger
//!
//! Every observable event in the store is a typed `PipelineEvent`; its
//! severity is a property of the event, not of the call site. Output is
//! one JSON object per line with deterministic key ordering, written
//! synchronously (errors to stderr, everything else to stdout).

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info,
    /// Recoverable issues
    Warn,
    /// Operation failures
    Error,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable events in the store lifecycle and write pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Store constructed, worker spawned
    StoreInit,
    /// A record type was registered with the schema registry
    SchemaRegistered,
    /// A write was applied to the remote store
    WriteApplied,
    /// A write failed at the remote boundary
    WriteFailed,
    /// A write was suppressed by the test-mode guard
    WriteSuppressed,
    /// A row could not be decoded into its record type
    DecodeFailed,
    /// Shutdown requested, queue closed
    DrainStart,
    /// Queue fully drained, worker exited
    DrainComplete,
}

impl PipelineEvent {
    /// Returns the event name as logged
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineEvent::StoreInit => "STORE_INIT",
            PipelineEvent::SchemaRegistered => "SCHEMA_REGISTERED",
            PipelineEvent::WriteApplied => "WRITE_APPLIED",
            PipelineEvent::WriteFailed => "WRITE_FAILED",
            PipelineEvent::WriteSuppressed => "WRITE_SUPPRESSED",
            PipelineEvent::DecodeFailed => "DECODE_FAILED",
            PipelineEvent::DrainStart => "DRAIN_START",
            PipelineEvent::DrainComplete => "DRAIN_COMPLETE",
        }
    }

    /// Severity is fixed per event
    pub fn severity(&self) -> Severity {
        match self {
            PipelineEvent::WriteFailed | PipelineEvent::DecodeFailed => Severity::Error,
            PipelineEvent::WriteSuppressed => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous structured logger
pub struct Logger;

impl Logger {
    /// Emit an event with its context fields
    ///
    /// Fields are sorted alphabetically by key; `event` and `severity`
    /// always lead the line.
    pub fn emit(event: PipelineEvent, fields: &[(&str, &str)]) {
        let line = Self::render(event, fields);
        match event.severity() {
            Severity::Error => {
                let mut err = io::stderr();
                let _ = err.write_all(line.as_bytes());
                let _ = err.flush();
            }
            _ => {
                let mut out = io::stdout();
                let _ = out.write_all(line.as_bytes());
                let _ = out.flush();
            }
        }
    }

    fn render(event: PipelineEvent, fields: &[(&str, &str)]) -> String {
        let mut line = String::with_capacity(128);
        line.push_str("{\"event\":\"");
        line.push_str(event.as_str());
        line.push_str("\",\"severity\":\"");
        line.push_str(event.severity().as_str());
        line.push('"');

        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        for (key, value) in sorted {
            line.push_str(",\"");
            Self::escape(&mut line, key);
            line.push_str("\":\"");
            Self::escape(&mut line, value);
            line.push('"');
        }

        line.push_str("}\n");
        line
    }

    fn escape(out: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severities() {
        assert_eq!(PipelineEvent::StoreInit.severity(), Severity::Info);
        assert_eq!(PipelineEvent::WriteSuppressed.severity(), Severity::Warn);
        assert_eq!(PipelineEvent::WriteFailed.severity(), Severity::Error);
        assert_eq!(PipelineEvent::DecodeFailed.severity(), Severity::Error);
    }

    #[test]
    fn test_render_leads_with_event_and_severity() {
        let line = Logger::render(PipelineEvent::WriteApplied, &[("table", "Quotes")]);
        assert!(line.starts_with("{\"event\":\"WRITE_APPLIED\",\"severity\":\"INFO\""));
        assert!(line.ends_with("}\n"));
        assert!(line.contains("\"table\":\"Quotes\""));
    }

    #[test]
    fn test_render_sorts_fields() {
        let line = Logger::render(
            PipelineEvent::WriteApplied,
            &[("table", "Quotes"), ("operation", "insert")],
        );
        let op = line.find("\"operation\"").unwrap();
        let table = line.find("\"table\"").unwrap();
        assert!(op < table);
    }

    #[test]
    fn test_render_escapes_values() {
        let line = Logger::render(PipelineEvent::WriteFailed, &[("error", "broken \"pipe\"\n")]);
        assert!(line.contains("broken \\\"pipe\\\"\\n"));
    }
}
