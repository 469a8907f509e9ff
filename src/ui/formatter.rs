//! Pure formatting functions for UI output.
//!
//! Everything the binary prints goes through here. `format_*` functions build
//! plain strings and are testable; `display_*` functions add styling and print.

use crate::boundary::BoundaryWarning;
use crate::increment::{PlannedBump, VersionPlan};
use console::style;
use std::path::Path;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print an internal error, asking the user to report it.
pub fn display_internal_error(details: &str) {
    eprintln!(
        "{} An unexpected error occurred. This is a bug in git-relver; please report it with the details below.",
        style("ERROR:").red().bold()
    );
    eprintln!("{}", details);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
///
/// # Arguments
/// * `warning` - The boundary warning to display
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One line describing a planned manifest write
pub fn format_bump(bump: &PlannedBump, root: &Path) -> String {
    let path = bump
        .manifest_path
        .strip_prefix(root)
        .unwrap_or(&bump.manifest_path);
    format!(
        "{} ({}): {} -> {}",
        bump.container,
        path.display(),
        bump.from,
        bump.to
    )
}

/// Display every manifest write of a version plan.
///
/// # Arguments
/// * `plan` - The executed plan
/// * `root` - Repository root, used to shorten manifest paths
pub fn display_version_plan(plan: &VersionPlan, root: &Path) {
    println!("\n{}", style("Version changes:").bold());
    for bump in &plan.bumps {
        println!("  {}", format_bump(bump, root));
    }
    if let Some(summary) = format_plan_summary(plan) {
        println!("{}", summary);
    }
}

/// Highest released version, only worth showing when several manifests move
pub fn format_plan_summary(plan: &VersionPlan) -> Option<String> {
    if plan.bumps.len() < 2 {
        return None;
    }
    plan.highest()
        .map(|version| format!("Highest version: {}", version))
}

/// Print a rendered changelog entry as-is.
pub fn display_changelog(markdown: &str) {
    print!("{}", markdown);
}
