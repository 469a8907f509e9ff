//! Release tag lineage
//!
//! Release tags form a single ordered history keyed by (date, count). The
//! parsed tag list is cached per repository root for the lifetime of one
//! invocation and must be invalidated after a tag is created.

use crate::domain::ReleaseTag;
use crate::error::{RelverError, Result};
use crate::git::Repository;
use chrono::{NaiveDate, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of "today" for tag naming
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system time (UTC)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock frozen at a given date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct ReleaseTagLineage {
    cache: RefCell<HashMap<PathBuf, Vec<ReleaseTag>>>,
}

impl ReleaseTagLineage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All release tags, newest first
    ///
    /// A tag carrying the release prefix that does not parse fails the whole
    /// lookup with `MalformedTag`.
    pub fn list_release_tags<R: Repository + ?Sized>(&self, repo: &R) -> Result<Vec<ReleaseTag>> {
        let root = repo.root().to_path_buf();
        if let Some(tags) = self.cache.borrow().get(&root) {
            return Ok(tags.clone());
        }

        let mut tags = repo
            .list_tags()?
            .into_iter()
            .filter(|name| ReleaseTag::is_release_tag(name))
            .map(|name| ReleaseTag::parse(&name))
            .collect::<Result<Vec<_>>>()?;
        tags.sort_by(|a, b| b.cmp(a));

        debug!("Found {} release tag(s) in {}", tags.len(), root.display());
        self.cache.borrow_mut().insert(root, tags.clone());
        Ok(tags)
    }

    /// Newest release tag
    pub fn current<R: Repository + ?Sized>(&self, repo: &R) -> Result<ReleaseTag> {
        self.list_release_tags(repo)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RelverError::NoReleaseTag(
                    "The repository has no release tags. Run the version command first.".to_string(),
                )
            })
    }

    /// Release tag before the newest one, if any
    pub fn previous<R: Repository + ?Sized>(&self, repo: &R) -> Result<Option<ReleaseTag>> {
        Ok(self.list_release_tags(repo)?.into_iter().nth(1))
    }

    /// Tag to create for a release made on `today`
    pub fn next_tag_for<R: Repository + ?Sized>(
        &self,
        repo: &R,
        today: NaiveDate,
    ) -> Result<ReleaseTag> {
        let same_day = self
            .list_release_tags(repo)?
            .iter()
            .filter(|tag| tag.date == today)
            .map(|tag| tag.count)
            .max();

        Ok(ReleaseTag::new(today, same_day.map(|c| c + 1).unwrap_or(1)))
    }

    /// Drop cached tags for a repository root
    pub fn invalidate(&self, root: &Path) {
        self.cache.borrow_mut().remove(root);
    }
}
