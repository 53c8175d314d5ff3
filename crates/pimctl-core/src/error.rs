//! Error types for PIM discovery and activation.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias using `PimError`.
pub type PimResult<T> = Result<T, PimError>;

/// Errors that can occur while discovering or activating eligible roles.
#[derive(Debug, Error)]
pub enum PimError {
    /// Required tooling is missing or the caller is not signed in.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Access token could not be acquired.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The management or Graph API rejected the request.
    ///
    /// `body` holds the remote response payload verbatim for diagnostics.
    #[error("API request failed (status {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        body: String,
    },

    /// A successful response could not be decoded.
    #[error("Failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL or endpoint configuration.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Subscription enumeration failed.
    #[error("Failed to list subscriptions: {0}")]
    Subscriptions(Box<PimError>),

    /// The activating principal could not be established.
    #[error("Failed to resolve current principal: {0}")]
    Principal(String),

    /// Activation parameters are invalid.
    #[error("Invalid activation request: {0}")]
    Validation(String),

    /// There is nothing to select from.
    #[error("No eligible roles available")]
    NoCandidates,

    /// More than one candidate exists and no one may be asked to choose.
    #[error("{count} roles match but running in non-interactive mode; narrow the selection with --role or --scope")]
    AmbiguousSelection { count: usize },

    /// The user dismissed the selection list.
    #[error("Selection cancelled")]
    SelectionCancelled,

    /// The user interrupted a wait.
    #[error("Interrupted")]
    Interrupted,

    /// External command failure.
    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A background operation ended without delivering a result.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error envelope shared by Azure Resource Manager and Microsoft Graph.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl PimError {
    /// Builds an `Api` error from a non-success response, keeping the body verbatim.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body).into_owned();
        match serde_json::from_slice::<ApiErrorEnvelope>(body) {
            Ok(envelope) => PimError::Api {
                status,
                code: envelope.error.code,
                message: envelope
                    .error
                    .message
                    .unwrap_or_else(|| format!("HTTP {status}")),
                body: text,
            },
            Err(_) => PimError::Api {
                status,
                code: None,
                message: if text.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    text.clone()
                },
                body: text,
            },
        }
    }

    /// Wraps a decode failure with the name of what was being decoded.
    pub fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        PimError::Parse {
            context: context.into(),
            source,
        }
    }

    /// True when the error came from the user interrupting a wait.
    pub fn is_interruption(&self) -> bool {
        matches!(self, PimError::Interrupted | PimError::SelectionCancelled)
    }

    /// Remote diagnostic payload, if the error carries one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            PimError::Api { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// HTTP status of an API rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            PimError::Api { status, .. } => Some(*status),
            PimError::Http(e) => e.status().map(|s| s.as_u16()),
            PimError::Subscriptions(inner) => inner.status(),
            _ => None,
        }
    }
}
