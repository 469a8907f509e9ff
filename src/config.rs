use crate::domain::IncrementLevel;
use crate::error::{RelverError, Result};
use crate::manifest::{discover_manifests, ManifestStore, ProjectManifest};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Folder holding the configuration file and pending change files
pub const CONFIG_FOLDER: &str = ".relver";

/// Configuration file name inside [CONFIG_FOLDER]
pub const CONFIG_FILE: &str = "relver.json";

/// Change-file folder name inside [CONFIG_FOLDER]
pub const CHANGES_FOLDER: &str = "changes";

/// Repository-relative path of the configuration file
pub fn config_path() -> PathBuf {
    Path::new(CONFIG_FOLDER).join(CONFIG_FILE)
}

/// Repository-relative path of the change-file folder
pub fn changes_path() -> PathBuf {
    Path::new(CONFIG_FOLDER).join(CHANGES_FOLDER)
}

/// Represents the configuration file as stored in the repository.
///
/// Keys are PascalCase on disk (`UseCommitsForChangelog`, `Projects`, ...).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct UserConfiguration {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,

    #[serde(default = "default_use_commits_for_changelog")]
    pub use_commits_for_changelog: bool,

    #[serde(default)]
    pub use_same_version_for_all_projects: bool,

    #[serde(default)]
    pub default_increment_type: IncrementLevel,

    #[serde(default)]
    pub change_files_determine_increment_type: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_categories: Option<BTreeMap<String, String>>,
}

/// Returns the default changelog strategy (commit-derived).
fn default_use_commits_for_changelog() -> bool {
    true
}

impl Default for UserConfiguration {
    fn default() -> Self {
        UserConfiguration {
            projects: Vec::new(),
            use_commits_for_changelog: default_use_commits_for_changelog(),
            use_same_version_for_all_projects: false,
            default_increment_type: IncrementLevel::default(),
            change_files_determine_increment_type: false,
            changelog_categories: None,
        }
    }
}

/// A named project as listed in the configuration file.
///
/// Exactly one of `path` and `paths` must be set; paths are relative to the
/// repository root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_type: Option<IncrementLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerelease_label: Option<String>,
}

impl ProjectEntry {
    /// The configured manifest paths, validating that exactly one form is used
    fn manifest_paths(&self) -> Result<Vec<&str>> {
        match (&self.path, &self.paths) {
            (Some(path), None) => Ok(vec![path.as_str()]),
            (None, Some(paths)) if !paths.is_empty() => {
                Ok(paths.iter().map(String::as_str).collect())
            }
            (None, Some(_)) => Err(RelverError::config(format!(
                "Project '{}' has an empty 'Paths' list",
                self.name
            ))),
            (Some(_), Some(_)) => Err(RelverError::config(format!(
                "Project '{}' sets both 'Path' and 'Paths'; use only one",
                self.name
            ))),
            (None, None) => Err(RelverError::config(format!(
                "Project '{}' must set either 'Path' or 'Paths'",
                self.name
            ))),
        }
    }
}

/// Loads the configuration file from a repository root.
///
/// # Returns
/// * `Ok(Some(UserConfiguration))` - Parsed configuration
/// * `Ok(None)` - If the repository has no configuration file
/// * `Err` - If the file exists but cannot be read or parsed
pub fn load_config(root: &Path) -> Result<Option<UserConfiguration>> {
    let path = root.join(config_path());
    if !path.is_file() {
        return Ok(None);
    }

    let text = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&text).map_err(|e| {
        RelverError::config(format!(
            "There was an issue loading the configuration at '{}': {}",
            path.display(),
            e
        ))
    })?;

    debug!("Loaded configuration from {}", path.display());
    Ok(Some(config))
}

/// Writes the configuration file as pretty JSON, returning its repository-relative path.
pub fn save_config(root: &Path, config: &UserConfiguration) -> Result<PathBuf> {
    let relative = config_path();
    let path = root.join(&relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut text = serde_json::to_string_pretty(config)?;
    text.push('\n');
    fs::write(&path, text)?;

    info!("Wrote {}", path.display());
    Ok(relative)
}

/// A named group of manifests versioned together
#[derive(Debug)]
pub struct ProjectContainer {
    pub name: String,
    pub manifests: Vec<ProjectManifest>,
    pub increment_level: Option<IncrementLevel>,
    pub prerelease_label: Option<String>,
}

/// Fully resolved configuration for one invocation.
///
/// Built from the configuration file when it lists projects, otherwise from
/// manifests discovered under the project path.
#[derive(Debug)]
pub struct ReleaseConfig {
    pub root: PathBuf,
    pub containers: Vec<ProjectContainer>,
    pub default_increment: IncrementLevel,
    pub use_commits_for_changelog: bool,
    pub synchronize_versions: bool,
    pub change_files_determine_increment: bool,
    pub changelog_categories: BTreeMap<String, String>,
    /// The file configuration, kept only when projects came from it
    pub file: Option<UserConfiguration>,
}

impl ReleaseConfig {
    /// Resolve the configuration for the repository at `root`.
    ///
    /// # Arguments
    /// * `root` - Repository working tree root
    /// * `project_path` - Where to look for manifests when the file lists no projects
    /// * `cli_increment` - Increment type given on the command line, if any
    /// * `store` - Manifest loader
    pub fn resolve<S: ManifestStore + ?Sized>(
        root: &Path,
        project_path: &Path,
        cli_increment: Option<IncrementLevel>,
        store: &S,
    ) -> Result<Self> {
        let file = load_config(root)?;
        let settings = file.clone().unwrap_or_default();

        let has_projects = !settings.projects.is_empty();
        let (containers, default_increment) = if has_projects {
            let containers = containers_from_file(root, &settings.projects, store)?;
            (
                containers,
                cli_increment.unwrap_or(settings.default_increment_type),
            )
        } else {
            let containers = discover_containers(root, project_path, cli_increment, store)?;
            (containers, settings.default_increment_type)
        };

        debug!(
            "Resolved {} project(s) (from {})",
            containers.len(),
            if has_projects { "configuration file" } else { "discovery" }
        );

        Ok(ReleaseConfig {
            root: root.to_path_buf(),
            containers,
            default_increment,
            use_commits_for_changelog: settings.use_commits_for_changelog,
            synchronize_versions: settings.use_same_version_for_all_projects,
            change_files_determine_increment: settings.change_files_determine_increment_type,
            changelog_categories: settings.changelog_categories.clone().unwrap_or_default(),
            file: if has_projects { file } else { None },
        })
    }

    /// Look up a container by name
    pub fn container(&self, name: &str) -> Option<&ProjectContainer> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// Whether the configuration came from a file and should be written back
    pub fn is_persisted(&self) -> bool {
        self.file.is_some()
    }

    /// Clear every per-project increment override
    pub fn reset_increment_levels(&mut self) {
        for container in &mut self.containers {
            container.increment_level = None;
        }
        if let Some(file) = &mut self.file {
            for entry in &mut file.projects {
                entry.increment_type = None;
            }
        }
    }

    /// Write the configuration file back when it was loaded from disk.
    ///
    /// # Returns
    /// * `Ok(Some(PathBuf))` - Repository-relative path of the written file
    /// * `Ok(None)` - If the configuration was discovered rather than loaded
    pub fn save(&self) -> Result<Option<PathBuf>> {
        match &self.file {
            Some(file) => save_config(&self.root, file).map(Some),
            None => Ok(None),
        }
    }

    /// Express an absolute path relative to the repository root
    pub fn relative_to_root(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn containers_from_file<S: ManifestStore + ?Sized>(
    root: &Path,
    entries: &[ProjectEntry],
    store: &S,
) -> Result<Vec<ProjectContainer>> {
    let mut seen = HashSet::new();
    let mut containers = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.name.trim().is_empty() {
            return Err(RelverError::config("Every project needs a non-empty 'Name'"));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(RelverError::config(format!(
                "Project name '{}' is used more than once",
                entry.name
            )));
        }

        let mut manifests = Vec::new();
        for relative in entry.manifest_paths()? {
            let path = root.join(relative);
            if path.is_dir() {
                let found = discover_manifests(&path)?;
                if found.is_empty() {
                    return Err(RelverError::config(format!(
                        "Project '{}' path '{}' contains no supported manifest",
                        entry.name, relative
                    )));
                }
                for manifest_path in found {
                    manifests.push(store.load(&manifest_path)?);
                }
            } else {
                manifests.push(store.load(&path)?);
            }
        }

        containers.push(ProjectContainer {
            name: entry.name.clone(),
            manifests,
            increment_level: entry.increment_type,
            prerelease_label: entry
                .prerelease_label
                .clone()
                .filter(|label| !label.is_empty()),
        });
    }

    Ok(containers)
}

fn discover_containers<S: ManifestStore + ?Sized>(
    root: &Path,
    project_path: &Path,
    cli_increment: Option<IncrementLevel>,
    store: &S,
) -> Result<Vec<ProjectContainer>> {
    let search = if project_path.is_absolute() {
        project_path.to_path_buf()
    } else {
        root.join(project_path)
    };

    let found = discover_manifests(&search)?;
    if found.is_empty() {
        return Err(RelverError::config(format!(
            "Failed to find a supported manifest at path '{}'",
            search.display()
        )));
    }

    let mut containers: Vec<ProjectContainer> = Vec::with_capacity(found.len());
    for path in found {
        let manifest = store.load(&path)?;
        let mut name = manifest.default_name();
        if containers.iter().any(|c| c.name == name) {
            name = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .display()
                .to_string();
        }

        containers.push(ProjectContainer {
            name,
            manifests: vec![manifest],
            increment_level: cli_increment,
            prerelease_label: None,
        });
    }

    Ok(containers)
}
