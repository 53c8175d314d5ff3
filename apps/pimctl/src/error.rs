//! CLI error types and exit codes

use pimctl_core::PimError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Not signed in / tooling missing / access denied
/// - 3: Network error
/// - 4: Validation or selection error
/// - 5: Server error
/// - 130: Interrupted by the user
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Precondition(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check your internet connection\n  - Verify the configured endpoints\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Selection(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Operation cancelled")]
    Interrupted,

    #[error("{0}")]
    General(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Precondition(_) | CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) | CliError::Selection(_) => 4,
            CliError::Server(_) => 5,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
            CliError::Interrupted => 130,
            CliError::Config(_) | CliError::InputError(_) | CliError::General(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let CliError::Api { body, .. } = self {
            if !body.is_empty() {
                eprintln!("\nResponse: {}", body);
            }
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => Some("Run 'az login' to refresh your sign-in."),
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            CliError::Api { status: 401, .. } => Some("Run 'az login' to refresh your sign-in."),
            CliError::Api { status: 403, .. } => {
                Some("Check that you are eligible for this role at this scope.")
            }
            _ => None,
        }
    }
}

impl From<PimError> for CliError {
    fn from(e: PimError) -> Self {
        match e {
            PimError::Precondition(msg) => CliError::Precondition(msg),
            PimError::Auth(msg) => CliError::AuthenticationFailed(msg),
            PimError::Http(e) => {
                if e.is_connect() {
                    CliError::ConnectionFailed(e.to_string())
                } else if e.is_timeout() {
                    CliError::Network("Request timed out".to_string())
                } else {
                    CliError::Network(e.to_string())
                }
            }
            PimError::Api {
                status,
                message,
                body,
                ..
            } => CliError::Api {
                status,
                message,
                body,
            },
            PimError::Subscriptions(inner) => match CliError::from(*inner) {
                CliError::Api {
                    status,
                    message,
                    body,
                } => CliError::Api {
                    status,
                    message: format!("Failed to list subscriptions: {message}"),
                    body,
                },
                CliError::Interrupted => CliError::Interrupted,
                other => CliError::General(format!("Failed to list subscriptions: {other}")),
            },
            PimError::Validation(msg) => CliError::Validation(msg),
            e @ (PimError::NoCandidates | PimError::AmbiguousSelection { .. }) => {
                CliError::Selection(e.to_string())
            }
            PimError::Interrupted | PimError::SelectionCancelled => CliError::Interrupted,
            PimError::Principal(msg) => CliError::AuthenticationFailed(msg),
            other => CliError::General(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::General(format!("I/O error: {}", e))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::General(format!("JSON error: {}", e))
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::InputError(format!("Dialog error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_precondition() {
        assert_eq!(CliError::Precondition("az".to_string()).exit_code(), 2);
    }

    #[test]
    fn test_exit_code_network_error() {
        assert_eq!(CliError::Network("test".to_string()).exit_code(), 3);
    }

    #[test]
    fn test_exit_code_selection_error() {
        let err = CliError::from(PimError::AmbiguousSelection { count: 2 });
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("non-interactive"));
    }

    #[test]
    fn test_exit_code_interrupted() {
        assert_eq!(CliError::from(PimError::Interrupted).exit_code(), 130);
        assert_eq!(CliError::from(PimError::SelectionCancelled).exit_code(), 130);
    }

    #[test]
    fn test_api_error_keeps_body() {
        let err = CliError::from(PimError::from_response(
            400,
            br#"{"error":{"code":"Bad","message":"Justification is required"}}"#,
        ));
        match err {
            CliError::Api { status, message, body } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Justification is required");
                assert!(body.contains("\"code\":\"Bad\""));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_exit_code_api_statuses() {
        let api = |status| CliError::Api {
            status,
            message: "test".to_string(),
            body: String::new(),
        };
        assert_eq!(api(500).exit_code(), 5);
        assert_eq!(api(403).exit_code(), 2);
        assert_eq!(api(409).exit_code(), 4);
    }

    #[test]
    fn test_subscription_failure_keeps_status() {
        let err = CliError::from(PimError::Subscriptions(Box::new(PimError::from_response(
            401,
            b"expired",
        ))));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Failed to list subscriptions"));
    }
}
