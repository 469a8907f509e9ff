//! Command workflow orchestration
//!
//! This module sequences the release steps behind each command. It is kept
//! separate from `main.rs` so workflows can be driven programmatically (and
//! tested) without depending on clap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::changelog::{persist_changelog, ChangelogAssembler, CHANGELOG_FILE};
use crate::changes::{
    generate_change_file, load_change_files, persist_change_file, reset_change_files,
    resolve_increment_levels, ChangeFile,
};
use crate::config::ReleaseConfig;
use crate::domain::{IncrementLevel, ThreePartVersion};
use crate::error::{RelverError, Result};
use crate::git::{Git2Repository, Repository};
use crate::increment::{IncrementResolver, VersionPlan};
use crate::lineage::{Clock, ReleaseTagLineage, SystemClock};
use crate::manifest::{FsManifestStore, ManifestStore};

/// Commit message used when the changelog is committed
pub const CHANGELOG_COMMIT_MESSAGE: &str = "Updated changelog";

/// Arguments for the `version` workflow
///
/// Mirrors the CLI arguments in a form that does not depend on clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionArgs {
    /// Where to discover manifests when the configuration lists none
    pub project_path: Option<PathBuf>,

    /// Increment type requested on the command line
    pub increment_type: Option<IncrementLevel>,

    /// Allow manifests without a version field (they start at 0.0.1)
    pub skip_version_check: bool,

    /// Write manifests but do not commit (implies no tag)
    pub no_commit: bool,

    /// Commit but do not tag
    pub no_tag: bool,

    /// Explicit version written to every manifest
    pub use_version: Option<String>,
}

/// Arguments for the `changelog` workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangelogArgs {
    pub project_path: Option<PathBuf>,

    /// Print the changelog instead of writing it
    pub output_to_console: bool,

    /// Only print the current release title
    pub release_name: bool,

    /// Only print the current release tag name
    pub tag_name: bool,

    /// Write the changelog but do not commit
    pub no_commit: bool,
}

/// Arguments for the `change` workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeArgs {
    pub project_path: Option<PathBuf>,

    /// Project the change belongs to
    pub project_name: Option<String>,

    /// Increment type recorded in the change file (defaults to Patch)
    pub increment_type: Option<IncrementLevel>,

    /// Changelog message
    pub message: Option<String>,
}

/// Result of a `version` run
#[derive(Debug, Clone, PartialEq)]
pub struct VersionOutcome {
    /// Manifest writes that were performed
    pub plan: VersionPlan,

    /// Hash of the release commit, if one was made
    pub commit: Option<String>,

    /// Name of the release tag, if one was created
    pub tag: Option<String>,

    pub warnings: Vec<BoundaryWarning>,
}

/// Result of a `changelog` run
#[derive(Debug, Clone, PartialEq)]
pub enum ChangelogOutcome {
    /// Title of the current release
    ReleaseName(String),

    /// Tag name of the current release
    TagName(String),

    /// Rendered changelog, not written anywhere
    Rendered {
        markdown: String,
        warnings: Vec<BoundaryWarning>,
    },

    /// Changelog prepended to the file at `path`
    Persisted {
        path: PathBuf,
        markdown: String,
        commit: Option<String>,
        warnings: Vec<BoundaryWarning>,
    },
}

/// Result of a `change` run
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOutcome {
    /// Repository-relative path of the new change file
    pub path: PathBuf,
    pub file: ChangeFile,
}

/// Drives the release workflows against a repository, a manifest store and a clock
pub struct ReleaseOrchestrator<R, S, C> {
    repo: R,
    store: S,
    clock: C,
    lineage: ReleaseTagLineage,
}

/// Open the repository containing `project_path` (or the current directory)
pub fn open_workspace(
    project_path: Option<&Path>,
) -> Result<ReleaseOrchestrator<Git2Repository, FsManifestStore, SystemClock>> {
    let start = project_path.unwrap_or_else(|| Path::new("."));
    let repo = Git2Repository::open(start).map_err(|e| match e {
        RelverError::Git(inner) if inner.code() == git2::ErrorCode::NotFound => {
            RelverError::config(format!(
                "The path '{}' is not inside a git repository",
                start.display()
            ))
        }
        other => other,
    })?;

    Ok(ReleaseOrchestrator::new(repo, FsManifestStore, SystemClock))
}

impl<R: Repository, S: ManifestStore, C: Clock> ReleaseOrchestrator<R, S, C> {
    pub fn new(repo: R, store: S, clock: C) -> Self {
        ReleaseOrchestrator {
            repo,
            store,
            clock,
            lineage: ReleaseTagLineage::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    fn resolve_config(
        &self,
        project_path: Option<&Path>,
        cli_increment: Option<IncrementLevel>,
    ) -> Result<ReleaseConfig> {
        let root = self.repo.root().to_path_buf();
        let search = project_path.unwrap_or(&root);
        ReleaseConfig::resolve(&root, search, cli_increment, &self.store)
    }

    /// Bump, write, stage, commit and tag.
    ///
    /// Steps:
    /// 1. Resolve configuration
    /// 2. Check every manifest has a version field (unless skipped)
    /// 3. Resolve change-file levels when they drive the increment
    /// 4. Validate the explicit version, if any
    /// 5. Plan; an empty plan ends the run without side effects
    /// 6. Write and stage every planned manifest
    /// 7. Reset per-project increment overrides in the configuration file
    /// 8. Commit and tag
    pub fn run_version(&mut self, args: &VersionArgs) -> Result<VersionOutcome> {
        let mut config = self.resolve_config(args.project_path.as_deref(), args.increment_type)?;
        let mut warnings = Vec::new();

        if !args.skip_version_check {
            for container in &config.containers {
                for manifest in &container.manifests {
                    if !manifest.has_version_field() {
                        return Err(RelverError::MissingVersionField(format!(
                            "The project '{}' ('{}') does not have a version field. Add one and run the tool again.",
                            container.name,
                            config.relative_to_root(&manifest.path).display()
                        )));
                    }
                }
            }
        }

        let change_levels = if !config.use_commits_for_changelog
            && config.change_files_determine_increment
        {
            let loaded = load_change_files(&self.repo, None)?;
            warnings.extend(loaded.skipped);
            Some(resolve_increment_levels(
                &loaded.files,
                &config.containers,
                true,
            )?)
        } else {
            None
        };

        let override_version = match args.use_version.as_deref() {
            Some(text) => {
                let (version, valid) = ThreePartVersion::try_parse(text);
                if !valid {
                    return Err(RelverError::argument(format!(
                        "The version '{}' you are trying to update to is invalid.",
                        text
                    )));
                }
                Some(version)
            }
            None => None,
        };

        let plan = IncrementResolver::new(&config, change_levels.as_ref())
            .plan(override_version.as_ref())?;

        if plan.is_empty() {
            info!("No project needs a new version");
            warnings.push(BoundaryWarning::NothingToRelease);
            return Ok(VersionOutcome {
                plan,
                commit: None,
                tag: None,
                warnings,
            });
        }

        self.write_plan(&mut config, &plan)?;

        if config.is_persisted() {
            config.reset_increment_levels();
            if let Some(relative) = config.save()? {
                self.repo.stage(&relative)?;
            }
        }

        let mut outcome = VersionOutcome {
            plan,
            commit: None,
            tag: None,
            warnings,
        };
        if args.no_commit {
            return Ok(outcome);
        }

        let tag = self.lineage.next_tag_for(&self.repo, self.clock.today())?;
        outcome.commit = Some(self.repo.commit(&tag.title())?);
        info!("Committed '{}'", tag.title());

        if !args.no_tag {
            self.repo.create_tag(&tag.name())?;
            self.lineage.invalidate(self.repo.root());
            info!("Tagged {}", tag.name());
            outcome.tag = Some(tag.name());
        }

        Ok(outcome)
    }

    fn write_plan(&mut self, config: &mut ReleaseConfig, plan: &VersionPlan) -> Result<()> {
        let targets: HashMap<&Path, String> = plan
            .bumps
            .iter()
            .map(|b| (b.manifest_path.as_path(), b.to.to_string()))
            .collect();

        let root = config.root.clone();
        for container in &mut config.containers {
            for manifest in &mut container.manifests {
                let Some(version) = targets.get(manifest.path.as_path()) else {
                    continue;
                };
                debug!("Setting {} to {}", manifest.path.display(), version);
                manifest.set_version_text(version)?;
                self.store.save(manifest)?;

                let relative = manifest
                    .path
                    .strip_prefix(&root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| manifest.path.clone());
                self.repo.stage(&relative)?;
            }
        }
        Ok(())
    }

    /// Generate the changelog for the newest release, persist it and commit.
    pub fn run_changelog(&mut self, args: &ChangelogArgs) -> Result<ChangelogOutcome> {
        let config = self.resolve_config(args.project_path.as_deref(), None)?;

        if args.release_name {
            return Ok(ChangelogOutcome::ReleaseName(
                self.lineage.current(&self.repo)?.title(),
            ));
        }
        if args.tag_name {
            return Ok(ChangelogOutcome::TagName(
                self.lineage.current(&self.repo)?.name(),
            ));
        }

        let assembly = ChangelogAssembler::new(&self.lineage).assemble(&self.repo, &config)?;
        let markdown = assembly.entry.to_markdown();
        let mut warnings = assembly.warnings;

        if args.output_to_console {
            return Ok(ChangelogOutcome::Rendered { markdown, warnings });
        }

        let path = config.root.join(CHANGELOG_FILE);
        persist_changelog(&path, &markdown)?;
        self.repo.stage(Path::new(CHANGELOG_FILE))?;

        if !config.use_commits_for_changelog {
            warnings.extend(reset_change_files(&mut self.repo)?);
        }

        let commit = if args.no_commit {
            None
        } else {
            let hash = self.repo.commit(CHANGELOG_COMMIT_MESSAGE)?;
            info!("Committed '{}'", CHANGELOG_COMMIT_MESSAGE);
            Some(hash)
        };

        Ok(ChangelogOutcome::Persisted {
            path,
            markdown,
            commit,
            warnings,
        })
    }

    /// Record a change file for the next release.
    pub fn run_change(&mut self, args: &ChangeArgs) -> Result<ChangeOutcome> {
        let config = self.resolve_config(args.project_path.as_deref(), None)?;

        if config.use_commits_for_changelog {
            return Err(RelverError::config(
                "This repository is not configured to use change files. Set 'UseCommitsForChangelog' to 'false' in the repository's '.relver/relver.json' file.",
            ));
        }

        let file = generate_change_file(
            &config,
            args.increment_type.unwrap_or(IncrementLevel::Patch),
            args.project_name.as_deref(),
            args.message.as_deref(),
        )?;
        let path = persist_change_file(&config.root, &file)?;

        Ok(ChangeOutcome { path, file })
    }
}
