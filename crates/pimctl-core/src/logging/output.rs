//! Sinks for diagnostic output: terminal, file, and in-memory capture.

use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::level::LogLevel;
use super::redaction::Redactor;

/// A log output destination
pub trait LogOutput: Send + Sync {
    /// Write a log entry
    fn write(&self, entry: &LogEntry) -> io::Result<()>;

    /// Flush any buffered output
    fn flush(&self) -> io::Result<()>;
}

/// A log entry to be output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
    /// Component that produced the entry (e.g. `aggregate`, `http`)
    pub context: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// One side of an HTTP exchange, rendered into a `LogEntry` by the logger
#[derive(Debug, Clone)]
pub enum HttpLogEntry {
    Request {
        method: String,
        url: String,
        body: Option<String>,
    },
    Response {
        status: u16,
        elapsed_ms: u64,
        body: Option<String>,
    },
}

impl HttpLogEntry {
    pub fn request(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Request {
            method: method.into(),
            url: url.into(),
            body: None,
        }
    }

    pub fn response(status: u16, elapsed_ms: u64) -> Self {
        Self::Response {
            status,
            elapsed_ms,
            body: None,
        }
    }

    pub fn with_body(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Self::Request { body, .. } | Self::Response { body, .. } => *body = Some(text.into()),
        }
        self
    }

    fn body(&self) -> Option<&str> {
        match self {
            Self::Request { body, .. } | Self::Response { body, .. } => body.as_deref(),
        }
    }

    /// `→ METHOD url` or `← status (Nms)`
    pub fn summary(&self) -> String {
        match self {
            Self::Request { method, url, .. } => format!("→ {method} {url}"),
            Self::Response {
                status, elapsed_ms, ..
            } => format!("← {status} ({elapsed_ms}ms)"),
        }
    }

    /// Summary line plus the redacted body, indented
    pub fn detail(&self, redactor: &Redactor) -> String {
        let summary = self.summary();
        let Some(body) = self.body() else {
            return summary;
        };
        let body = redactor.redact(body);
        if body.trim().is_empty() {
            format!("{summary}\n  Body: (empty)")
        } else {
            format!("{summary}\n  Body:\n    {body}")
        }
    }
}

/// Banner shown before the first trace line of a run.
pub fn trace_banner(color: bool) -> &'static str {
    if color {
        "\x1b[33m⚠️  TRACE MODE: output contains request and response bodies\x1b[0m"
    } else {
        "WARNING: TRACE MODE - output contains request and response bodies"
    }
}

/// Writes entries to stderr
pub struct TerminalWriter {
    color: bool,
}

impl TerminalWriter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn format_entry(&self, entry: &LogEntry) -> String {
        let tag = entry.context.as_deref().unwrap_or("verbose");
        match (self.color, entry.level) {
            (false, _) => format!("[{tag}] {}", entry.message),
            (true, LogLevel::Trace) => format!("\x1b[35m[{tag}]\x1b[0m {}", entry.message),
            (true, LogLevel::Debug) => format!("\x1b[33m[{tag}]\x1b[0m {}", entry.message),
            (true, _) => format!("\x1b[36m[{tag}]\x1b[0m {}", entry.message),
        }
    }
}

impl LogOutput for TerminalWriter {
    fn write(&self, entry: &LogEntry) -> io::Result<()> {
        eprintln!("{}", self.format_entry(entry));
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Appends timestamped entries to a file
pub struct FileWriter {
    file: Mutex<File>,
}

impl FileWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(|file| Self {
                file: Mutex::new(file),
            })
    }

    fn line(entry: &LogEntry) -> String {
        let mut line = format!(
            "[{}] [{}]",
            entry.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            entry.level
        );
        if let Some(context) = &entry.context {
            line.push_str(&format!(" [{context}]"));
        }
        line.push(' ');
        line.push_str(&entry.message);
        line
    }

    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        f(&mut guard)
    }
}

impl LogOutput for FileWriter {
    fn write(&self, entry: &LogEntry) -> io::Result<()> {
        let line = Self::line(entry);
        self.with_file(|file| {
            writeln!(file, "{line}")?;
            file.flush()
        })
    }

    fn flush(&self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

/// Collects entries in memory so tests can inspect what a component logged.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages only, in write order
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// True if any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(needle))
    }
}

impl LogOutput for MemoryWriter {
    fn write(&self, entry: &LogEntry) -> io::Result<()> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("Failed to lock log buffer"))?
            .push(entry.clone());
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_http_request_format() {
        let entry = HttpLogEntry::request("GET", "https://management.azure.com/subscriptions");
        assert_eq!(
            entry.summary(),
            "→ GET https://management.azure.com/subscriptions"
        );
    }

    #[test]
    fn test_http_response_trace_redacts_body() {
        let entry =
            HttpLogEntry::response(200, 12).with_body(r#"{"accessToken": "abc", "x": 1}"#);
        let text = entry.detail(&Redactor::new());
        assert!(text.starts_with("← 200 (12ms)"));
        assert!(text.contains("[REDACTED]"));
        assert!(!text.contains("\"abc\""));
    }

    #[test]
    fn test_terminal_format_without_color() {
        let writer = TerminalWriter::new(false);
        let entry = LogEntry::new(LogLevel::Verbose, "querying scope").with_context("aggregate");
        assert_eq!(writer.format_entry(&entry), "[aggregate] querying scope");
    }

    #[test]
    fn test_file_writer_appends() {
        let temp = NamedTempFile::new().unwrap();
        let writer = FileWriter::new(temp.path()).unwrap();
        writer
            .write(&LogEntry::new(LogLevel::Debug, "first").with_context("http"))
            .unwrap();
        writer.write(&LogEntry::new(LogLevel::Verbose, "second")).unwrap();

        let content = std::fs::read_to_string(temp.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[DEBUG] [http] first"));
        assert!(lines[1].contains("[VERBOSE] second"));
    }

    #[test]
    fn test_memory_writer_shares_buffer() {
        let writer = MemoryWriter::new();
        let clone = writer.clone();
        clone.write(&LogEntry::new(LogLevel::Verbose, "hello")).unwrap();
        assert_eq!(writer.messages(), vec!["hello".to_string()]);
        assert!(writer.contains("hell"));
    }
}
