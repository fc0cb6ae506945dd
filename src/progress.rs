//! Request-scoped progress log.
//!
//! A scrape request records every step it takes as a [`LogEvent`] in a
//! [`ScrapeLog`]. The sequence is append-only and is returned to the caller
//! with the result (or with the error), so a front end can replay progress.
//!
//! Each event is also pushed synchronously to a [`LogSink`]. Without a
//! caller-supplied sink the events are mirrored to `tracing`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

/// Severity of a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the progress log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
}

/// Receives progress events as they happen.
pub trait LogSink: Send + Sync {
    fn emit(&self, message: &str, severity: Severity);
}

/// Default sink: forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn emit(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(%severity, "{message}"),
            Severity::Warning => warn!(%severity, "{message}"),
            Severity::Error => error!(%severity, "{message}"),
        }
    }
}

/// Adapts a plain closure into a [`LogSink`].
pub struct CallbackSink<F>(pub F);

impl<F> LogSink for CallbackSink<F>
where
    F: Fn(&str, Severity) + Send + Sync,
{
    fn emit(&self, message: &str, severity: Severity) {
        (self.0)(message, severity)
    }
}

/// Append-only event sequence for one request.
pub struct ScrapeLog {
    events: Vec<LogEvent>,
    sink: Box<dyn LogSink>,
}

impl fmt::Debug for ScrapeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapeLog")
            .field("events", &self.events.len())
            .finish()
    }
}

impl Default for ScrapeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeLog {
    /// A log that mirrors events to `tracing`.
    pub fn new() -> Self {
        Self::with_sink(ConsoleSink)
    }

    pub fn with_sink<S: LogSink + 'static>(sink: S) -> Self {
        Self {
            events: Vec::new(),
            sink: Box::new(sink),
        }
    }

    /// A log that calls `callback(message, severity)` for every event.
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(&str, Severity) + Send + Sync + 'static,
    {
        Self::with_sink(CallbackSink(callback))
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        // Wall clocks can step backwards; keep the sequence ordered.
        let mut timestamp = Utc::now();
        if let Some(last) = self.events.last() {
            if timestamp < last.timestamp {
                timestamp = last.timestamp;
            }
        }
        self.sink.emit(&message, severity);
        self.events.push(LogEvent {
            timestamp,
            severity,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message)
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hands the recorded events to the caller.
    pub fn into_events(self) -> Vec<LogEvent> {
        self.events
    }
}
