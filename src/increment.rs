//! Next-version resolution for every project container.

use crate::config::{ProjectContainer, ReleaseConfig};
use crate::domain::{IncrementLevel, ThreePartVersion};
use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// A single manifest write planned by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBump {
    pub container: String,
    pub manifest_path: PathBuf,
    pub from: ThreePartVersion,
    pub to: ThreePartVersion,
}

/// Every manifest write a `version` run will perform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionPlan {
    pub bumps: Vec<PlannedBump>,
}

impl VersionPlan {
    /// Nothing to write, commit or tag
    pub fn is_empty(&self) -> bool {
        self.bumps.is_empty()
    }

    /// Highest version the plan writes
    pub fn highest(&self) -> Option<&ThreePartVersion> {
        self.bumps.iter().map(|b| &b.to).max()
    }
}

pub struct IncrementResolver<'a> {
    config: &'a ReleaseConfig,
    change_levels: Option<&'a HashMap<String, IncrementLevel>>,
}

impl<'a> IncrementResolver<'a> {
    /// # Arguments
    /// * `config` - Resolved configuration
    /// * `change_levels` - Levels resolved from change files, when they drive the increment
    pub fn new(
        config: &'a ReleaseConfig,
        change_levels: Option<&'a HashMap<String, IncrementLevel>>,
    ) -> Self {
        IncrementResolver {
            config,
            change_levels,
        }
    }

    /// Effective level for a container.
    ///
    /// Container override first, then the change-file level (absent projects
    /// resolve to `None`) when change files determine the increment, then the
    /// global default.
    pub fn level_for(&self, container: &ProjectContainer) -> IncrementLevel {
        if let Some(level) = container.increment_level {
            return level;
        }

        let from_changes = !self.config.use_commits_for_changelog
            && self.config.change_files_determine_increment;
        if from_changes {
            if let Some(levels) = self.change_levels {
                return levels
                    .get(&container.name)
                    .copied()
                    .unwrap_or(IncrementLevel::None);
            }
        }

        self.config.default_increment
    }

    /// Highest next version over the container's own manifests
    pub fn candidate_for(
        &self,
        container: &ProjectContainer,
        level: IncrementLevel,
    ) -> Result<Option<ThreePartVersion>> {
        let mut best: Option<ThreePartVersion> = None;
        for manifest in &container.manifests {
            let current = ThreePartVersion::current(manifest.version_text().as_deref())?;
            let next = current.bump(level, container.prerelease_label.as_deref())?;
            if best.as_ref().map(|b| next > *b).unwrap_or(true) {
                best = Some(next);
            }
        }
        Ok(best)
    }

    /// Plan every manifest write.
    ///
    /// An explicit `override_version` is written to every manifest regardless
    /// of levels.
    pub fn plan(&self, override_version: Option<&ThreePartVersion>) -> Result<VersionPlan> {
        if let Some(version) = override_version {
            debug!("Using explicit version {} for every project", version);
            return self.apply_to_all(|_| Some(version.clone()));
        }

        let mut candidates: Vec<(IncrementLevel, Option<ThreePartVersion>)> = Vec::new();
        for container in &self.config.containers {
            let level = self.level_for(container);
            let candidate = self.candidate_for(container, level)?;
            debug!(
                "Project '{}': increment {}, candidate {}",
                container.name,
                level,
                candidate
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".to_string())
            );
            candidates.push((level, candidate));
        }

        if self.config.synchronize_versions {
            let any_change = candidates
                .iter()
                .any(|(level, _)| *level != IncrementLevel::None);
            if !any_change {
                return Ok(VersionPlan::default());
            }

            let Some(global) = candidates.iter().filter_map(|(_, c)| c.clone()).max() else {
                return Ok(VersionPlan::default());
            };
            debug!("Synchronising every project to {}", global);
            return self.apply_to_all(|_| Some(global.clone()));
        }

        self.apply_to_all(|index| match &candidates[index] {
            (IncrementLevel::None, _) => None,
            (_, candidate) => candidate.clone(),
        })
    }

    fn apply_to_all<F>(&self, target: F) -> Result<VersionPlan>
    where
        F: Fn(usize) -> Option<ThreePartVersion>,
    {
        let mut plan = VersionPlan::default();
        for (index, container) in self.config.containers.iter().enumerate() {
            let Some(to) = target(index) else {
                continue;
            };
            for manifest in &container.manifests {
                plan.bumps.push(PlannedBump {
                    container: container.name.clone(),
                    manifest_path: manifest.path.clone(),
                    from: ThreePartVersion::current(manifest.version_text().as_deref())?,
                    to: to.clone(),
                });
            }
        }
        Ok(plan)
    }
}
