//! User interface module - terminal output.
//!
//! The tool is non-interactive; `formatter` holds all display logic.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_changelog, display_error, display_status, display_success,
    format_delivery_summary,
};
