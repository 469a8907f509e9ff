//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of Git
//! operations a release needs, allowing for a real repository implementation
//! and an in-memory mock for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! All paths passed to a [Repository] are relative to its working tree root.
//!
//! # Usage
//!
//! ```rust
//! # use git_relver::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_relver::Result<()> {
//! let tags = repo.list_tags()?;
//! let commits = repo.commits_since(tags.first().map(String::as_str))?;
//! # let _ = commits;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Commit information used for changelog generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The commit hash
    pub hash: String,
    /// First line of the commit message
    pub header: String,
    /// Remainder of the commit message after the header
    pub body: String,
}

impl CommitInfo {
    /// Build commit information from a full commit message
    pub fn from_message(hash: impl Into<String>, message: &str) -> Self {
        let (header, body) = message.split_once('\n').unwrap_or((message, ""));
        CommitInfo {
            hash: hash.into(),
            header: header.trim_end().to_string(),
            body: body.trim().to_string(),
        }
    }
}

/// A file read from the tree of a tagged commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitFile {
    /// Path relative to the repository root
    pub path: PathBuf,
    /// UTF-8 file contents
    pub contents: String,
}

/// Common git operation trait for abstraction
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map underlying
/// errors (like `git2::Error`) to [crate::error::RelverError] variants.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation for mocking Git operations
pub trait Repository {
    /// Root directory of the working tree
    fn root(&self) -> &Path;

    /// Get all tag names in the repository
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Tag names in no particular order
    /// * `Err` - If there's a Git error
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Get commits reachable from HEAD but not from `since_tag`
    ///
    /// # Arguments
    /// * `since_tag` - Tag bounding the range (exclusive), or `None` for the whole history
    ///
    /// # Returns
    /// * `Ok(Vec<CommitInfo>)` - Commits, newest first. Empty when HEAD is unborn.
    /// * `Err` - If the tag doesn't exist or if there's a Git error
    fn commits_since(&self, since_tag: Option<&str>) -> Result<Vec<CommitInfo>>;

    /// Stage a path in the index
    ///
    /// Additions, modifications and deletions below `path` are all recorded.
    ///
    /// # Arguments
    /// * `path` - File or folder relative to the repository root
    fn stage(&mut self, path: &Path) -> Result<()>;

    /// Commit the current index on top of HEAD
    ///
    /// # Arguments
    /// * `message` - Full commit message
    ///
    /// # Returns
    /// * `Ok(String)` - Hash of the new commit
    /// * `Err` - If the index cannot be written or if there's a Git error
    fn commit(&mut self, message: &str) -> Result<String>;

    /// Create a lightweight tag at HEAD
    ///
    /// # Arguments
    /// * `name` - Name for the new tag
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err` - If the tag already exists, HEAD is unborn, or Git error occurs
    fn create_tag(&mut self, name: &str) -> Result<()>;

    /// Read a single file from the tree of a tagged commit
    ///
    /// # Returns
    /// * `Ok(Some(String))` - File contents
    /// * `Ok(None)` - If the file doesn't exist at that tag
    /// * `Err` - If the tag doesn't exist or if there's a Git error
    fn read_file_at_tag(&self, tag: &str, path: &Path) -> Result<Option<String>>;

    /// Read every file directly inside a folder in the tree of a tagged commit
    ///
    /// # Returns
    /// * `Ok(Vec<GitFile>)` - Files sorted by path; empty if the folder doesn't exist
    /// * `Err` - If the tag doesn't exist or if there's a Git error
    fn read_folder_at_tag(&self, tag: &str, folder: &Path) -> Result<Vec<GitFile>>;
}

/// Convert a repository-relative path to a git pathspec
pub(crate) fn pathspec(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_info_from_message() {
        let info = CommitInfo::from_message("abc", "feat: add\n\nlonger body\n");
        assert_eq!(info.header, "feat: add");
        assert_eq!(info.body, "longer body");
    }

    #[test]
    fn test_commit_info_without_body() {
        let info = CommitInfo::from_message("abc", "fix: one line");
        assert_eq!(info.header, "fix: one line");
        assert!(info.body.is_empty());
    }

    #[test]
    fn test_pathspec_uses_forward_slashes() {
        let path = Path::new(".relver").join("changes");
        assert_eq!(pathspec(&path), ".relver/changes");
    }
}
