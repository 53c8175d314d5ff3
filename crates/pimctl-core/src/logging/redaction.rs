//! Masking of credentials in logged requests and responses.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Replacement for masked values
pub const REDACTED: &str = "[REDACTED]";

/// Pattern and replacement template, applied in order.
const RULES: &[(&str, &str)] = &[
    (r"(?i)(Authorization:\s*Bearer\s+)\S+", "${1}[REDACTED]"),
    (
        r#"("(?:accessToken|access_token|refresh_token|client_secret)"\s*:\s*")[^"]*""#,
        "${1}[REDACTED]\"",
    ),
    // user:password@host
    (r"(://[^:/\s]+:)[^@\s]+@", "${1}[REDACTED]@"),
    (
        r"eyJ[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]+",
        "[REDACTED]",
    ),
];

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|(pattern, template)| {
            (
                Regex::new(pattern).expect("Invalid redaction pattern"),
                *template,
            )
        })
        .collect()
});

/// Masks bearer tokens, token fields, URL passwords and bare JWTs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Redactor;

impl Redactor {
    pub fn new() -> Self {
        Self
    }

    /// Borrowed when nothing matched.
    pub fn redact<'a>(&self, input: &'a str) -> Cow<'a, str> {
        COMPILED
            .iter()
            .fold(Cow::Borrowed(input), |text, (regex, template)| {
                let replaced = match regex.replace_all(&text, *template) {
                    Cow::Owned(replaced) => Some(replaced),
                    Cow::Borrowed(_) => None,
                };
                replaced.map_or(text, Cow::Owned)
            })
    }

    pub fn redact_string(&self, input: &str) -> String {
        self.redact(input).into_owned()
    }
}
