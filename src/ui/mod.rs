//! User interface module - console output.
//!
//! Diagnostics go through `tracing`; everything the user is meant to read
//! goes through [`formatter`].

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_changelog_preview, display_error, display_status,
    display_step, display_success, display_warning, format_release_state,
};
