//! Output formatting utilities

use console::{style, Style};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print a warning on stderr, keeping stdout for generated documents
pub fn stderr_warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Print a skipped/empty message
pub fn skipped(message: &str) {
    println!("{} {}", style("-").dim(), message);
}

/// Print a dry-run message
pub fn pending(message: &str) {
    println!("{} {}", style("?").cyan(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Print a document between separator rules
pub fn framed(title: &str, body: &str) {
    let rule = "=".repeat(50);
    println!("{}", header(title));
    println!("{}", style(&rule).dim());
    println!("{}", body);
    println!("{}", style(&rule).dim());
}

/// Style for tags
pub fn tag_style() -> Style {
    Style::new().yellow()
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}
