//! Changelog assembly and persistence.
//!
//! An entry is titled after the newest release tag. In commit mode it lists
//! the conventional commits made since the release before it, grouped by
//! type; in change-file mode it lists the messages of the change files
//! committed with the newest release, grouped by project.

use crate::boundary::BoundaryWarning;
use crate::changes::{categorize, commits_since, load_change_files, ChangeFile, ProjectChange};
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::git::Repository;
use crate::lineage::ReleaseTagLineage;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Default changelog file name at the repository root
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// One release section of the changelog
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogEntry {
    pub title: String,
    pub tag_name: String,
    pub categories: Vec<ChangelogCategory>,
}

/// A heading within a release section: a commit type or a project
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogCategory {
    pub label: String,
    /// Project version, shown next to the label in change-file mode
    pub version: Option<String>,
    pub changes: Vec<ChangelogChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogChange {
    pub scope: Option<String>,
    pub description: String,
}

impl ChangelogEntry {
    /// Render the entry as markdown
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "## {}", self.title);
        output.push('\n');

        for category in &self.categories {
            match &category.version {
                Some(version) => {
                    let _ = writeln!(output, "### {} ({})", category.label, version);
                }
                None => {
                    let _ = writeln!(output, "### {}", category.label);
                }
            }

            for change in &category.changes {
                match &change.scope {
                    Some(scope) => {
                        let _ = writeln!(output, "* **{}**: {}", scope, change.description);
                    }
                    None => {
                        let _ = writeln!(output, "* {}", change.description);
                    }
                }
            }
        }

        output
    }
}

/// An assembled entry together with the non-fatal issues met on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub entry: ChangelogEntry,
    pub warnings: Vec<BoundaryWarning>,
}

pub struct ChangelogAssembler<'a> {
    lineage: &'a ReleaseTagLineage,
}

impl<'a> ChangelogAssembler<'a> {
    pub fn new(lineage: &'a ReleaseTagLineage) -> Self {
        ChangelogAssembler { lineage }
    }

    /// Build the changelog entry for the newest release tag.
    ///
    /// # Errors
    /// `NoReleaseTag` when the repository has no release tag yet.
    pub fn assemble<R: Repository + ?Sized>(
        &self,
        repo: &R,
        config: &ReleaseConfig,
    ) -> Result<Assembly> {
        let current = self.lineage.current(repo)?;
        let mut warnings = Vec::new();

        let categories = if config.use_commits_for_changelog {
            let previous = self.lineage.previous(repo)?;
            let since = previous.as_ref().map(|tag| tag.name());
            let scan = commits_since(repo, since.as_deref())?;

            debug!(
                "Changelog from {} commit(s) since {}",
                scan.records.len(),
                since.as_deref().unwrap_or("the beginning of history")
            );
            if scan.skipped > 0 {
                warnings.push(BoundaryWarning::UnparsableCommits {
                    count: scan.skipped,
                });
            }

            categorize(&scan.records, &config.changelog_categories)
        } else {
            let tag_name = current.name();
            let loaded = load_change_files(repo, Some(tag_name.as_str()))?;
            warnings.extend(loaded.skipped);
            project_categories(loaded.files, config)
        };

        Ok(Assembly {
            entry: ChangelogEntry {
                title: current.title(),
                tag_name: current.name(),
                categories,
            },
            warnings,
        })
    }
}

/// Group change-file messages by project, in first-seen order.
///
/// Unconfigured project names are dropped. Projects with no messages are
/// left out unless versions are synchronised, in which case every configured
/// project gets a heading.
fn project_categories(mut files: Vec<ChangeFile>, config: &ReleaseConfig) -> Vec<ChangelogCategory> {
    let configured: HashSet<&str> = config.containers.iter().map(|c| c.name.as_str()).collect();
    for file in &mut files {
        file.projects
            .retain(|project| configured.contains(project.name.as_str()));
    }

    if config.synchronize_versions {
        files.push(ChangeFile {
            projects: config
                .containers
                .iter()
                .map(|c| ProjectChange {
                    name: c.name.clone(),
                    r#type: c.increment_level,
                    changelog_messages: Vec::new(),
                })
                .collect(),
        });
    }

    let mut categories: Vec<ChangelogCategory> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for project in files.into_iter().flat_map(|f| f.projects) {
        let changes = project
            .changelog_messages
            .into_iter()
            .map(|description| ChangelogChange {
                scope: None,
                description,
            });

        if let Some(&at) = index.get(&project.name) {
            categories[at].changes.extend(changes);
            continue;
        }

        let changes: Vec<ChangelogChange> = changes.collect();
        if changes.is_empty() && !config.synchronize_versions {
            continue;
        }

        let version = config
            .container(&project.name)
            .and_then(|c| c.manifests.first())
            .and_then(|m| m.version_text());

        index.insert(project.name.clone(), categories.len());
        categories.push(ChangelogCategory {
            label: project.name,
            version,
            changes,
        });
    }

    categories
}

/// Prepend `markdown` to the changelog at `path`, creating it if needed
pub fn persist_changelog(path: &Path, markdown: &str) -> Result<()> {
    if path.is_file() {
        let existing = fs::read_to_string(path)?;
        fs::write(path, format!("{}\n{}", markdown, existing))?;
    } else {
        fs::write(path, markdown)?;
    }

    info!("Updated {}", path.display());
    Ok(())
}
