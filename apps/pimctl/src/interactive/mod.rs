//! Interactive prompts and role selection

mod prompts;
mod selector;

pub use prompts::{is_interactive_terminal, normalize_optional, prompt_justification};
pub use selector::{role_details, DialoguerSelector};
