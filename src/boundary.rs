use std::fmt;

/// Non-fatal issues met while releasing.
/// These never abort a run but should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A change file could not be read or deserialized and was skipped
    UnreadableChangeFile { path: String, reason: String },
    /// A change file could not be deleted after the changelog was written
    UndeletableChangeFile { path: String, reason: String },
    /// Commits without a `type: description` header were left out of the changelog
    UnparsableCommits { count: usize },
    /// No project needed a new version, so nothing was written, committed or tagged
    NothingToRelease,
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::UnreadableChangeFile { path, reason } => {
                write!(f, "Unable to read the change file '{}': {}", path, reason)
            }
            BoundaryWarning::UndeletableChangeFile { path, reason } => {
                write!(f, "Unable to delete the change file '{}': {}", path, reason)
            }
            BoundaryWarning::UnparsableCommits { count } => {
                let noun = if *count == 1 { "commit" } else { "commits" };
                write!(
                    f,
                    "Skipped {} {} without a conventional header",
                    count, noun
                )
            }
            BoundaryWarning::NothingToRelease => {
                write!(f, "No project needs a new version; nothing was released")
            }
        }
    }
}
