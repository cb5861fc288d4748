//! Structured logging with correlation context.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use step_core::RequestId;

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Correlation ID.
    pub request_id: String,
    /// Emitting component ("expander", "worker", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// URL or selector the entry concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Microseconds since the logger was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_us: Option<u64>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {}", self.level, self.message);

        if let Some(target) = &self.target {
            s.push_str(&format!(" <{}>", target));
        }

        if let Some(elapsed) = self.elapsed_us {
            s.push_str(&format!(" ({}us)", elapsed));
        }

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON format (for log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

/// Shared in-memory buffer of log entries.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl LogBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Captured entries at the given level.
    pub fn at_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    fn push(&self, entry: LogEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

/// Where log entries go.
#[derive(Debug, Clone, Default)]
pub enum LogSink {
    /// Emit `tracing` events at the matching level.
    #[default]
    Tracing,
    /// Print formatted lines to stderr.
    Stderr,
    /// Capture entries in memory.
    Memory(LogBuffer),
}

/// Structured logger with correlation context.
///
/// Cheap to clone; event handlers and background tasks carry their own copy.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    request_id: RequestId,
    component: Option<String>,
    target: Option<String>,
    start_time: std::time::Instant,
    min_level: LogLevel,
    format: LogFormat,
    sink: LogSink,
}

impl StructuredLogger {
    /// Create a new logger with a correlation ID.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            component: None,
            target: None,
            start_time: std::time::Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
            sink: LogSink::Tracing,
        }
    }

    /// Create a logger for a component with a freshly generated ID.
    pub fn for_component(component: impl Into<String>) -> Self {
        Self::new(RequestId::generate()).with_component(component)
    }

    /// Set the component name.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set the target (URL, selector).
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output sink.
    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    /// Derive a logger for a sub-operation: same settings, new ID and target.
    pub fn child(&self, target: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            target: Some(target.into()),
            start_time: std::time::Instant::now(),
            ..self.clone()
        }
    }

    /// Log at trace level.
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message, BTreeMap::new());
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, BTreeMap::new());
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, BTreeMap::new());
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, BTreeMap::new());
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, BTreeMap::new());
    }

    fn log(&self, level: LogLevel, message: &str, fields: BTreeMap<String, serde_json::Value>) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            request_id: self.request_id.to_string(),
            component: self.component.clone(),
            target: self.target.clone(),
            fields,
            elapsed_us: Some(self.start_time.elapsed().as_micros() as u64),
        };

        match &self.sink {
            LogSink::Memory(buffer) => buffer.push(entry),
            LogSink::Stderr => eprintln!("{}", self.render(&entry)),
            LogSink::Tracing => {
                let line = self.render(&entry);
                let id = entry.request_id.as_str();
                match level {
                    LogLevel::Trace => tracing::trace!(request_id = id, "{}", line),
                    LogLevel::Debug => tracing::debug!(request_id = id, "{}", line),
                    LogLevel::Info => tracing::info!(request_id = id, "{}", line),
                    LogLevel::Warn => tracing::warn!(request_id = id, "{}", line),
                    LogLevel::Error => tracing::error!(request_id = id, "{}", line),
                }
            }
        }
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        }
    }

    /// Get the correlation ID.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a StructuredLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a duration field (in milliseconds).
    pub fn duration_ms(mut self, key: &str, duration: std::time::Duration) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(duration.as_millis() as u64));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

impl StructuredLogger {
    /// Start building an info log entry.
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    /// Start building a warn log entry.
    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, message)
    }

    /// Start building an error log entry.
    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }

    /// Start building a debug log entry.
    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_logger() -> (StructuredLogger, LogBuffer) {
        let buffer = LogBuffer::new();
        let logger = StructuredLogger::new(RequestId::from_string("req-1"))
            .with_component("worker")
            .with_sink(LogSink::Memory(buffer.clone()));
        (logger, buffer)
    }

    #[test]
    fn test_min_level_filters() {
        let (logger, buffer) = memory_logger();
        logger.debug("dropped");
        logger.info("kept");
        logger.warn("kept too");

        let entries = buffer.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "kept");
        assert_eq!(buffer.at_level(LogLevel::Warn).len(), 1);
    }

    #[test]
    fn test_builder_fields() {
        let (logger, buffer) = memory_logger();
        logger
            .info_builder("cache hit")
            .field("url", "/index.html")
            .field_i64("bytes", 42)
            .field_bool("refresh", true)
            .emit();

        let entry = &buffer.entries()[0];
        assert_eq!(entry.fields["url"], serde_json::json!("/index.html"));
        assert_eq!(entry.fields["bytes"], serde_json::json!(42));
        assert_eq!(entry.component.as_deref(), Some("worker"));
    }

    #[test]
    fn test_json_format_is_flat() {
        let (logger, buffer) = memory_logger();
        logger.warn_builder("offline").field("url", "/x").emit();

        let json = buffer.entries()[0].to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], "warn");
        assert_eq!(value["request_id"], "req-1");
        assert_eq!(value["url"], "/x");
    }

    #[test]
    fn test_human_format() {
        let (logger, buffer) = memory_logger();
        logger.child("/a.png").error("failed");

        let entry = &buffer.entries()[0];
        let line = entry.to_human();
        assert!(line.starts_with("[ERROR] failed </a.png>"));
        assert_ne!(entry.request_id, "req-1");
    }
}
