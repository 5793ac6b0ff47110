//! Formatting functions for UI output.
//!
//! `format_*` functions build text and are pure; `display_*` functions print.

use crate::boundary::BoundaryWarning;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{}", style(message).red());
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), style(message).cyan());
}

/// Main progress line, in cyan.
pub fn display_status(message: &str) {
    println!("{}", style(message).cyan());
}

/// Secondary progress line, in blue.
pub fn display_step(message: &str) {
    println!("{}", style(message).blue());
}

pub fn display_warning(message: &str) {
    eprintln!("{}", style(message).yellow());
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    display_warning(&warning.to_string());
}

/// Print the changelog entry a dry run would have written.
pub fn display_changelog_preview(entry: &str) {
    display_warning("*** DRY RUN: stopping here, the new changelog entry would be:");
    println!("{}", style(entry).magenta().bright());
}

/// Describe the current version, registry and tag state in one sentence.
///
/// # Arguments
/// * `manifest_file` - Name of the manifest the version was read from
/// * `current` - Version in the manifest
/// * `registry_latest` - Latest published version, if any
/// * `previous_tag` - Latest tag of the package, if any
pub fn format_release_state(
    manifest_file: &str,
    current: &str,
    registry_latest: Option<&str>,
    previous_tag: Option<&str>,
) -> String {
    let registry = match registry_latest {
        Some(version) => format!("latest version in registry is {},", style(version).bold()),
        None => "package is not published in the registry,".to_string(),
    };
    let tag = match previous_tag {
        Some(tag) => format!("latest tag in repository is {}.", style(tag).bold()),
        None => "repository has no tag for this package.".to_string(),
    };

    format!(
        "Current version in {} is {}, {} {}",
        manifest_file,
        style(current).bold(),
        registry,
        tag
    )
}
