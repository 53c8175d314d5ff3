//! Prompt helpers for interactive runs.

use std::io::IsTerminal;

use dialoguer::Input;

use crate::error::{CliError, CliResult};

/// Checks if both stdin and stdout are connected to a terminal.
///
/// Returns `false` in pipes and CI, where nobody can answer a prompt.
pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Asks for an optional justification; empty input means none.
pub fn prompt_justification() -> CliResult<Option<String>> {
    let input: String = Input::new()
        .with_prompt("Enter justification reason (optional, press Enter to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CliError::InputError(e.to_string()))?;

    Ok(normalize_optional(&input))
}

/// Trimmed input, or `None` when only whitespace was entered.
pub fn normalize_optional(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
