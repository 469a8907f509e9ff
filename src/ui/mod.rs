//! User interface module - console output for the binary.
//!
//! All formatting lives in [formatter]; this module only re-exports it so
//! callers can write `ui::display_success(..)`.

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_changelog, display_error, display_internal_error,
    display_status, display_success, display_version_plan, format_bump, format_plan_summary,
};
