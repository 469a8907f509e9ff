use crate::error::{RelverError, Result};
use crate::git::{pathspec, CommitInfo, GitFile};
use git2::{IndexAddOption, ObjectType, Repository as Git2Repo, Signature, Sort, Tree};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    root: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| RelverError::config("Bare repositories are not supported"))?;

        Ok(Git2Repository { repo, root })
    }

    fn tag_tree(&self, tag: &str) -> Result<Tree<'_>> {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", tag))
            .map_err(|e| {
                if e.code() == git2::ErrorCode::NotFound {
                    RelverError::NoReleaseTag(format!("Tag '{}' does not exist", tag))
                } else {
                    RelverError::Git(e)
                }
            })?;

        Ok(reference.peel_to_tree()?)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => Ok(Signature::now("git-relver", "git-relver@localhost")?),
        }
    }

    fn blob_text(&self, oid: git2::Oid) -> Result<String> {
        let blob = self.repo.find_blob(oid)?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

impl super::Repository for Git2Repository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn commits_since(&self, since_tag: Option<&str>) -> Result<Vec<CommitInfo>> {
        match self.repo.head() {
            Ok(_) => {}
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        if let Some(tag) = since_tag {
            let commit = self
                .repo
                .find_reference(&format!("refs/tags/{}", tag))?
                .peel_to_commit()?;
            revwalk.hide(commit.id())?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
            commits.push(CommitInfo::from_message(oid.to_string(), &message));
        }

        debug!(
            "Found {} commit(s) since {}",
            commits.len(),
            since_tag.unwrap_or("the beginning of history")
        );
        Ok(commits)
    }

    fn stage(&mut self, path: &Path) -> Result<()> {
        let spec = pathspec(path);
        let mut index = self.repo.index()?;

        index.add_all([spec.as_str()], IndexAddOption::DEFAULT, None)?;
        index.update_all([spec.as_str()], None)?;
        index.write()?;

        debug!("Staged {}", spec);
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<String> {
        let signature = self.signature()?;
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(oid.to_string())
    }

    fn create_tag(&mut self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel(ObjectType::Commit)?;

        self.repo.tag_lightweight(name, &head, false)?;

        Ok(())
    }

    fn read_file_at_tag(&self, tag: &str, path: &Path) -> Result<Option<String>> {
        let tree = self.tag_tree(tag)?;

        let entry = match tree.get_path(path) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }

        Ok(Some(self.blob_text(entry.id())?))
    }

    fn read_folder_at_tag(&self, tag: &str, folder: &Path) -> Result<Vec<GitFile>> {
        let tree = self.tag_tree(tag)?;

        let entry = match tree.get_path(folder) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if entry.kind() != Some(ObjectType::Tree) {
            return Ok(Vec::new());
        }

        let subtree = self.repo.find_tree(entry.id())?;
        let mut files = Vec::new();
        for item in subtree.iter() {
            if item.kind() != Some(ObjectType::Blob) {
                continue;
            }
            let Some(name) = item.name() else {
                continue;
            };
            files.push(GitFile {
                path: folder.join(name),
                contents: self.blob_text(item.id())?,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}
