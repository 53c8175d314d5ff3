//! Logger configuration built from command-line flags and environment.

use std::path::PathBuf;

use super::level::LogLevel;

/// Environment variable enabling verbose output
pub const ENV_VERBOSE: &str = "PIMCTL_VERBOSE";
/// Environment variable enabling debug output
pub const ENV_DEBUG: &str = "PIMCTL_DEBUG";
/// Environment variable enabling trace output
pub const ENV_TRACE: &str = "PIMCTL_TRACE";

/// Logger configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Requested verbosity
    pub level: LogLevel,
    /// Suppress all diagnostic output, overriding `level`
    pub quiet: bool,
    /// Optional append-only log file
    pub log_file: Option<PathBuf>,
    /// ANSI colors on the terminal sink
    pub color: bool,
}

impl LogConfig {
    /// Combine flags with `PIMCTL_*` environment variables.
    ///
    /// Flags and environment are OR-ed; `quiet` wins over both.
    pub fn from_args_and_env(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_file: Option<PathBuf>,
    ) -> Self {
        let level = LogLevel::from_flags(
            verbose || env_flag(ENV_VERBOSE),
            debug || env_flag(ENV_DEBUG),
            trace || env_flag(ENV_TRACE),
        );

        Self {
            level,
            quiet,
            log_file,
            color: std::env::var("NO_COLOR").is_err(),
        }
    }

    /// Config at a fixed level with no file and no color.
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Level in effect once `quiet` is applied
    pub fn effective_level(&self) -> LogLevel {
        if self.quiet {
            LogLevel::Normal
        } else {
            self.level
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.effective_level().is_verbose()
    }

    pub fn is_debug(&self) -> bool {
        self.effective_level().is_debug()
    }

    pub fn is_trace(&self) -> bool {
        self.effective_level().is_trace()
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
