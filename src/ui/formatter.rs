//! Pure formatting functions for UI output.
//!
//! Only the changelog itself goes to stdout, so it can be piped; every
//! other message goes to stderr.

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("WARNING:").yellow().bold(), format_warning(warning));
}

/// Print the changelog to stdout, unstyled.
pub fn display_changelog(message: &str) {
    println!("{}", message);
}

/// Plain text of a warning, without styling.
pub fn format_warning(warning: &BoundaryWarning) -> String {
    warning.to_string()
}

/// Summary line after a successful Slack delivery.
pub fn format_delivery_summary(chunks: usize, channel: &str) -> String {
    match chunks {
        1 => format!("Posted changelog to Slack channel {}", channel),
        n => format!("Posted changelog to Slack channel {} in {} messages", channel, n),
    }
}
