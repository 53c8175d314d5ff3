//! Status lines printed around command output.
//!
//! Honors `NO_COLOR`: when it is set every helper falls back to a plain prefix.

fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// `ansi` wraps the marker when color is on, `plain` replaces it otherwise.
fn decorate(ansi: &str, marker: &str, plain: &str, message: &str) -> String {
    if color_enabled() {
        format!("\x1b[{ansi}m{marker}\x1b[0m {message}")
    } else {
        format!("{plain} {message}")
    }
}

pub fn print_success(message: &str) {
    println!("{}", decorate("32", "✓", "OK:", message));
}

/// Goes to stderr so it never mixes with `--json` output.
pub fn print_warning(message: &str) {
    eprintln!("{}", decorate("33", "Warning:", "Warning:", message));
}

pub fn print_info(message: &str) {
    println!("{}", decorate("34", "ℹ", "Info:", message));
}

pub fn print_key_value(key: &str, value: &str) {
    let key = format!("{key}:");
    println!("{}", decorate("1", &key, &key, value));
}
