//! Verbosity levels for diagnostic output.
//!
//! Levels are cumulative: Debug includes Verbose, Trace includes Debug.

use std::fmt;

/// How much diagnostic detail a run asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Command output only
    #[default]
    Normal,
    /// One line per step (scope queries, schedule lookup, fallbacks)
    Verbose,
    /// HTTP method, URL, status code, timing
    Debug,
    /// Request and response bodies
    Trace,
}

impl LogLevel {
    /// Picks the most detailed level among the flags that are set.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool) -> Self {
        [(trace, Self::Trace), (debug, Self::Debug), (verbose, Self::Verbose)]
            .into_iter()
            .find_map(|(set, level)| set.then_some(level))
            .unwrap_or_default()
    }

    /// Whether a message tagged `wanted` is shown at this level.
    pub fn allows(self, wanted: LogLevel) -> bool {
        self >= wanted
    }

    pub fn is_verbose(&self) -> bool {
        self.allows(Self::Verbose)
    }

    pub fn is_debug(&self) -> bool {
        self.allows(Self::Debug)
    }

    pub fn is_trace(&self) -> bool {
        self.allows(Self::Trace)
    }

    /// Tag printed in front of log lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "INFO",
            Self::Verbose => "VERBOSE",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
