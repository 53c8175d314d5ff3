//! Diagnostic logging handle.
//!
//! A `Logger` is built once from a [`LogConfig`] and handed to every
//! component as `Arc<Logger>`. There is no process-wide verbosity switch,
//! so a component under test can be given a capturing logger:
//!
//! ```rust
//! use pimctl_core::logging::{LogLevel, Logger};
//!
//! let (logger, capture) = Logger::capturing(LogLevel::Verbose);
//! logger.verbose("aggregate", "querying tenant root");
//! assert!(capture.contains("tenant root"));
//! ```

mod config;
mod level;
mod output;
mod redaction;

pub use config::{LogConfig, ENV_DEBUG, ENV_TRACE, ENV_VERBOSE};
pub use level::LogLevel;
pub use output::{
    trace_banner, FileWriter, HttpLogEntry, LogEntry, LogOutput, MemoryWriter, TerminalWriter,
};
pub use redaction::{Redactor, REDACTED};

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Diagnostic logger shared by the core components
pub struct Logger {
    config: LogConfig,
    sinks: Vec<Arc<dyn LogOutput>>,
    redactor: Redactor,
    trace_warned: AtomicBool,
    trace_warning: Option<String>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Logger {
    /// Terminal logger, plus a file sink when `config.log_file` is set.
    pub fn new(config: LogConfig) -> io::Result<Self> {
        let trace_warning = Some(trace_banner(config.color).to_string());

        let mut sinks: Vec<Arc<dyn LogOutput>> = vec![Arc::new(TerminalWriter::new(config.color))];
        if let Some(ref path) = config.log_file {
            sinks.push(Arc::new(FileWriter::new(path)?));
        }

        Ok(Self {
            config,
            sinks,
            redactor: Redactor::new(),
            trace_warned: AtomicBool::new(false),
            trace_warning,
        })
    }

    /// Logger writing only to the given sinks.
    pub fn with_sinks(config: LogConfig, sinks: Vec<Arc<dyn LogOutput>>) -> Self {
        Self {
            config,
            sinks,
            redactor: Redactor::new(),
            trace_warned: AtomicBool::new(false),
            trace_warning: None,
        }
    }

    /// Logger that records into memory, returned alongside its buffer.
    pub fn capturing(level: LogLevel) -> (Self, MemoryWriter) {
        let memory = MemoryWriter::new();
        let logger = Self::with_sinks(
            LogConfig::with_level(level),
            vec![Arc::new(memory.clone()) as Arc<dyn LogOutput>],
        );
        (logger, memory)
    }

    /// Logger that discards everything.
    pub fn disabled() -> Self {
        Self::with_sinks(LogConfig::default(), Vec::new())
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn is_verbose(&self) -> bool {
        self.config.is_verbose()
    }

    pub fn is_debug(&self) -> bool {
        self.config.is_debug()
    }

    pub fn is_trace(&self) -> bool {
        self.config.is_trace()
    }

    fn emit(&self, entry: LogEntry) {
        for sink in &self.sinks {
            // Diagnostic output never fails the operation being logged.
            let _ = sink.write(&entry);
        }
    }

    fn maybe_show_trace_warning(&self) {
        if let Some(ref warning) = self.trace_warning {
            if !self.trace_warned.swap(true, Ordering::SeqCst) {
                eprintln!("{}", warning);
            }
        }
    }

    /// One line per step, shown with `--verbose` and above
    pub fn verbose(&self, context: &str, message: impl Into<String>) {
        if !self.is_verbose() {
            return;
        }
        self.emit(LogEntry::new(LogLevel::Verbose, message).with_context(context));
    }

    /// Internal detail, shown with `--debug` and above
    pub fn debug(&self, context: &str, message: impl Into<String>) {
        if !self.is_debug() {
            return;
        }
        let message = self.redactor.redact_string(&message.into());
        self.emit(LogEntry::new(LogLevel::Debug, message).with_context(context));
    }

    pub fn debug_request(&self, method: &str, url: &str) {
        if !self.is_debug() {
            return;
        }
        let entry = HttpLogEntry::request(method, self.redactor.redact_string(url));
        self.emit(LogEntry::new(LogLevel::Debug, entry.summary()).with_context("http"));
    }

    pub fn debug_response(&self, status: u16, timing_ms: u64) {
        if !self.is_debug() {
            return;
        }
        let entry = HttpLogEntry::response(status, timing_ms);
        self.emit(LogEntry::new(LogLevel::Debug, entry.summary()).with_context("http"));
    }

    /// Full exchange including the redacted body, shown with `--trace`
    pub fn trace_http(&self, entry: &HttpLogEntry) {
        if !self.is_trace() {
            return;
        }
        self.maybe_show_trace_warning();
        let text = entry.detail(&self.redactor);
        self.emit(LogEntry::new(LogLevel::Trace, text).with_context("http"));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_logger_creation_without_file() {
        let logger = Logger::new(LogConfig::default()).unwrap();
        assert!(!logger.is_verbose());
        assert_eq!(logger.sinks.len(), 1);
    }

    #[test]
    fn test_logger_writes_to_file() {
        let temp = NamedTempFile::new().unwrap();
        let config = LogConfig {
            level: LogLevel::Verbose,
            quiet: false,
            log_file: Some(temp.path().to_path_buf()),
            color: false,
        };

        let logger = Logger::new(config).unwrap();
        logger.verbose("link", "Test message");

        let content = std::fs::read_to_string(temp.path()).unwrap();
        assert!(content.contains("Test message"));
        assert!(content.contains("[VERBOSE] [link]"));
    }

    #[test]
    fn test_capture_respects_level() {
        let (logger, capture) = Logger::capturing(LogLevel::Verbose);
        logger.verbose("aggregate", "shown");
        logger.debug("aggregate", "hidden");
        logger.debug_request("GET", "https://example.com");

        assert_eq!(capture.messages(), vec!["shown".to_string()]);
    }

    #[test]
    fn test_debug_http_lines() {
        let (logger, capture) = Logger::capturing(LogLevel::Debug);
        logger.debug_request("PUT", "https://management.azure.com/x");
        logger.debug_response(201, 87);

        let messages = capture.messages();
        assert_eq!(messages[0], "→ PUT https://management.azure.com/x");
        assert_eq!(messages[1], "← 201 (87ms)");
        assert!(capture
            .entries()
            .iter()
            .all(|e| e.context.as_deref() == Some("http")));
    }

    #[test]
    fn test_trace_body_is_redacted() {
        let (logger, capture) = Logger::capturing(LogLevel::Trace);
        logger.trace_http(&HttpLogEntry::response(200, 3).with_body(r#"{"accessToken":"t0k"}"#));

        assert!(capture.contains(REDACTED));
        assert!(!capture.contains("t0k"));
    }

    #[test]
    fn test_quiet_logger_drops_everything() {
        let memory = MemoryWriter::new();
        let config = LogConfig {
            level: LogLevel::Trace,
            quiet: true,
            log_file: None,
            color: false,
        };
        let logger = Logger::with_sinks(config, vec![Arc::new(memory.clone()) as Arc<dyn LogOutput>]);
        logger.verbose("x", "a");
        logger.debug("x", "b");
        logger.trace_http(&HttpLogEntry::request("GET", "u"));
        assert!(memory.entries().is_empty());
    }

    #[test]
    fn test_disabled_logger() {
        let logger = Logger::disabled();
        logger.verbose("x", "nothing to see");
        assert!(!logger.is_verbose());
    }
}
