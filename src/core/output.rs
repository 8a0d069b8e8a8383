//! Styled diagnostics on stderr.
//!
//! Stdout carries only the JSON result, so every human-facing message goes to
//! stderr.
//!
//! # Colors
//! - "✕ Error:" in red, message in white
//! - Failed step names in yellow

use crate::core::state::StepFailure;
use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
/// ✕ Error: <message>
/// ```
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✕ Error:".red(), message.white());
}

/// Prints one line per failed step after the error header
///
/// # Format
/// ```text
/// ✕ Error: 2 step(s) failed for <url>
///   fetch  <message>
///   pull   <message>
/// ```
pub fn print_failures(url: &str, failures: &[StepFailure]) {
    if failures.is_empty() {
        return;
    }

    print_error(&format!("{} step(s) failed for {url}", failures.len()));
    for failure in failures {
        let step = format!("{:<15}", failure.step.to_string());
        eprintln!("  {} {}", step.yellow(), failure.message.bright_black());
    }
}
