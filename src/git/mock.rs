use crate::error::{RelverError, Result};
use crate::git::{CommitInfo, GitFile, Repository};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mock repository for testing without actual git operations
///
/// History is a single linear branch. A tag remembers the commit it points at
/// and an optional snapshot of files readable through `read_*_at_tag`.
pub struct MockRepository {
    root: PathBuf,
    commits: Vec<CommitInfo>,
    tags: HashMap<String, usize>,
    snapshots: HashMap<String, HashMap<PathBuf, String>>,
    staged: Vec<PathBuf>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::with_root("/mock")
    }

    /// Create an empty mock repository reporting `root` as its working tree
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        MockRepository {
            root: root.into(),
            commits: Vec::new(),
            tags: HashMap::new(),
            snapshots: HashMap::new(),
            staged: Vec::new(),
        }
    }

    /// Append a commit to the history
    pub fn add_commit(&mut self, message: &str) {
        let hash = format!("{:040x}", self.commits.len() + 1);
        self.commits.push(CommitInfo::from_message(hash, message));
    }

    /// Add a tag pointing at the latest commit
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let index = self.commits.len().saturating_sub(1);
        self.tags.insert(name.into(), index);
    }

    /// Record a file as present in the tree of `tag`
    pub fn add_file_at_tag(
        &mut self,
        tag: impl Into<String>,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
    ) {
        self.snapshots
            .entry(tag.into())
            .or_default()
            .insert(path.into(), contents.into());
    }

    /// Paths staged so far, in staging order
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Commit messages, oldest first
    pub fn commit_messages(&self) -> Vec<String> {
        self.commits
            .iter()
            .map(|c| {
                if c.body.is_empty() {
                    c.header.clone()
                } else {
                    format!("{}\n\n{}", c.header, c.body)
                }
            })
            .collect()
    }

    fn require_tag(&self, tag: &str) -> Result<()> {
        if self.tags.contains_key(tag) {
            Ok(())
        } else {
            Err(RelverError::NoReleaseTag(format!(
                "Tag '{}' does not exist",
                tag
            )))
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.keys().cloned().collect())
    }

    fn commits_since(&self, since_tag: Option<&str>) -> Result<Vec<CommitInfo>> {
        let start = match since_tag {
            Some(tag) => {
                self.require_tag(tag)?;
                self.tags[tag] + 1
            }
            None => 0,
        };

        Ok(self
            .commits
            .iter()
            .skip(start)
            .rev()
            .cloned()
            .collect())
    }

    fn stage(&mut self, path: &Path) -> Result<()> {
        self.staged.push(path.to_path_buf());
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<String> {
        self.add_commit(message);
        self.staged.clear();
        Ok(format!("{:040x}", self.commits.len()))
    }

    fn create_tag(&mut self, name: &str) -> Result<()> {
        if self.commits.is_empty() {
            return Err(RelverError::Git(git2::Error::from_str(
                "cannot tag an unborn HEAD",
            )));
        }
        if self.tags.contains_key(name) {
            return Err(RelverError::Git(git2::Error::from_str(&format!(
                "tag '{}' already exists",
                name
            ))));
        }
        self.add_tag(name);
        Ok(())
    }

    fn read_file_at_tag(&self, tag: &str, path: &Path) -> Result<Option<String>> {
        self.require_tag(tag)?;
        Ok(self
            .snapshots
            .get(tag)
            .and_then(|files| files.get(path))
            .cloned())
    }

    fn read_folder_at_tag(&self, tag: &str, folder: &Path) -> Result<Vec<GitFile>> {
        self.require_tag(tag)?;
        let mut files: Vec<GitFile> = self
            .snapshots
            .get(tag)
            .map(|files| {
                files
                    .iter()
                    .filter(|(path, _)| path.parent() == Some(folder))
                    .map(|(path, contents)| GitFile {
                        path: path.clone(),
                        contents: contents.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: one");
        repo.add_tag("release_2024-01-01");

        let tags = repo.list_tags().unwrap();
        assert_eq!(tags, vec!["release_2024-01-01".to_string()]);
    }

    #[test]
    fn test_mock_repository_commits_since() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: one");
        repo.add_tag("release_2024-01-01");
        repo.add_commit("fix: two");
        repo.add_commit("docs: three");

        let commits = repo.commits_since(Some("release_2024-01-01")).unwrap();
        let headers: Vec<&str> = commits.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["docs: three", "fix: two"]);

        assert_eq!(repo.commits_since(None).unwrap().len(), 3);
        assert!(repo.commits_since(Some("missing")).is_err());
    }

    #[test]
    fn test_mock_repository_commit_and_tag() {
        let mut repo = MockRepository::new();
        assert!(repo.create_tag("release_2024-01-01").is_err());

        repo.stage(Path::new("Cargo.toml")).unwrap();
        assert_eq!(repo.staged().len(), 1);
        repo.commit("Release 2024-01-01").unwrap();
        assert!(repo.staged().is_empty());

        repo.create_tag("release_2024-01-01").unwrap();
        assert!(repo.create_tag("release_2024-01-01").is_err());
        assert_eq!(repo.commit_messages(), vec!["Release 2024-01-01"]);
    }

    #[test]
    fn test_mock_repository_files_at_tag() {
        let mut repo = MockRepository::new();
        repo.add_commit("chore: init");
        repo.add_tag("release_2024-01-01");
        repo.add_file_at_tag("release_2024-01-01", "notes/b.json", "b");
        repo.add_file_at_tag("release_2024-01-01", "notes/a.json", "a");
        repo.add_file_at_tag("release_2024-01-01", "notes/deep/c.json", "c");

        let files = repo
            .read_folder_at_tag("release_2024-01-01", Path::new("notes"))
            .unwrap();
        let contents: Vec<&str> = files.iter().map(|f| f.contents.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);

        assert_eq!(
            repo.read_file_at_tag("release_2024-01-01", Path::new("notes/a.json"))
                .unwrap()
                .as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tags().unwrap().is_empty());
        assert_eq!(repo.root(), Path::new("/mock"));
    }
}
