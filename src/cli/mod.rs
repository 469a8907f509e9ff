//! Command workflows shared by the binary and the integration tests.

pub mod orchestration;

pub use orchestration::{
    open_workspace, ChangeArgs, ChangeOutcome, ChangelogArgs, ChangelogOutcome,
    ReleaseOrchestrator, VersionArgs, VersionOutcome,
};
