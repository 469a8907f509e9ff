use thiserror::Error;

/// Unified error type for git-relver operations
#[derive(Error, Debug)]
pub enum RelverError {
    #[error("Malformed version '{0}': expected MAJOR.MINOR.PATCH[-LABEL]")]
    MalformedVersion(String),

    #[error("Missing version field: {0}")]
    MissingVersionField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing increment type: {0}")]
    MissingIncrementType(String),

    #[error("No release tag: {0}")]
    NoReleaseTag(String),

    #[error("Malformed release tag '{0}': expected release_YYYY-MM-DD[_N]")]
    MalformedTag(String),

    #[error("Version '{0}' cannot be incremented further")]
    VersionOutOfRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-relver
pub type Result<T> = std::result::Result<T, RelverError>;

impl RelverError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RelverError::InvalidConfiguration(msg.into())
    }

    /// Create a malformed version error for the offending text
    pub fn version(text: impl Into<String>) -> Self {
        RelverError::MalformedVersion(text.into())
    }

    /// Create a malformed tag error for the offending tag name
    pub fn tag(name: impl Into<String>) -> Self {
        RelverError::MalformedTag(name.into())
    }

    /// Create an invalid argument error with context
    pub fn argument(msg: impl Into<String>) -> Self {
        RelverError::InvalidArgument(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        RelverError::Manifest(msg.into())
    }

    /// Whether this error is a recognised user or configuration mistake.
    ///
    /// User errors are reported without a trace and exit with code 1; anything
    /// else is treated as an internal bug.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RelverError::MalformedVersion(_)
                | RelverError::MissingVersionField(_)
                | RelverError::InvalidConfiguration(_)
                | RelverError::MissingIncrementType(_)
                | RelverError::NoReleaseTag(_)
                | RelverError::MalformedTag(_)
                | RelverError::VersionOutOfRange(_)
                | RelverError::InvalidArgument(_)
                | RelverError::Manifest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelverError::config("test config issue");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: test config issue"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RelverError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_error_constructors() {
        assert!(RelverError::version("1.2").to_string().contains("'1.2'"));
        assert!(RelverError::tag("release_x")
            .to_string()
            .contains("release_x"));
        assert!(RelverError::argument("bad")
            .to_string()
            .starts_with("Invalid argument"));
    }

    #[test]
    fn test_user_errors_are_classified() {
        let user_errors = vec![
            RelverError::version("x"),
            RelverError::MissingVersionField("x".to_string()),
            RelverError::config("x"),
            RelverError::MissingIncrementType("x".to_string()),
            RelverError::NoReleaseTag("x".to_string()),
            RelverError::tag("x"),
            RelverError::argument("x"),
            RelverError::VersionOutOfRange("x".to_string()),
            RelverError::manifest("broken"),
        ];

        for err in user_errors {
            assert!(err.is_user_error(), "expected user error: {}", err);
        }
    }

    #[test]
    fn test_internal_errors_are_not_user_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let errors = vec![
            RelverError::from(json_err),
            RelverError::from(git2::Error::from_str("boom")),
        ];

        for err in errors {
            assert!(!err.is_user_error(), "expected internal error: {}", err);
        }
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (RelverError::config("x"), "Invalid configuration"),
            (RelverError::version("x"), "Malformed version"),
            (RelverError::tag("x"), "Malformed release tag"),
            (RelverError::manifest("x"), "Manifest error"),
            (
                RelverError::VersionOutOfRange("x".to_string()),
                "Version 'x' cannot be incremented",
            ),
            (
                RelverError::NoReleaseTag("x".to_string()),
                "No release tag",
            ),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
