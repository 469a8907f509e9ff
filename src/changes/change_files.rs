use crate::boundary::BoundaryWarning;
use crate::config::{changes_path, ProjectContainer, ReleaseConfig};
use crate::domain::IncrementLevel;
use crate::error::{RelverError, Result};
use crate::git::Repository;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

/// A change file deposited between releases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeFile {
    #[serde(default)]
    pub projects: Vec<ProjectChange>,
}

/// One project's entry in a change file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectChange {
    pub name: String,

    #[serde(default)]
    pub r#type: Option<IncrementLevel>,

    #[serde(default)]
    pub changelog_messages: Vec<String>,
}

/// Change files that could be read, plus the ones that were skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedChangeFiles {
    pub files: Vec<ChangeFile>,
    pub skipped: Vec<BoundaryWarning>,
}

impl LoadedChangeFiles {
    fn push(&mut self, path: &Path, contents: &str) {
        match serde_json::from_str::<ChangeFile>(contents) {
            Ok(file) => self.files.push(file),
            Err(e) => {
                warn!("Unable to deserialize the change file '{}': {}", path.display(), e);
                self.skipped.push(BoundaryWarning::UnreadableChangeFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

fn is_change_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Load change files from the working tree (`tag` is `None`) or from the tree of `tag`
pub fn load_change_files<R: Repository + ?Sized>(
    repo: &R,
    tag: Option<&str>,
) -> Result<LoadedChangeFiles> {
    let mut loaded = LoadedChangeFiles::default();

    match tag {
        Some(tag) => {
            for file in repo.read_folder_at_tag(tag, &changes_path())? {
                if is_change_file(&file.path) {
                    loaded.push(&file.path, &file.contents);
                }
            }
        }
        None => {
            let folder = repo.root().join(changes_path());
            if !folder.is_dir() {
                return Ok(loaded);
            }

            let walker = WalkDir::new(&folder)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name();
            for entry in walker {
                let entry = entry.map_err(|e| RelverError::Io(e.into()))?;
                if !entry.file_type().is_file() || !is_change_file(entry.path()) {
                    continue;
                }
                match fs::read_to_string(entry.path()) {
                    Ok(contents) => loaded.push(entry.path(), &contents),
                    Err(e) => {
                        warn!(
                            "Unable to read the change file '{}': {}",
                            entry.path().display(),
                            e
                        );
                        loaded.skipped.push(BoundaryWarning::UnreadableChangeFile {
                            path: entry.path().display().to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    debug!(
        "Loaded {} change file(s), skipped {}",
        loaded.files.len(),
        loaded.skipped.len()
    );
    Ok(loaded)
}

/// Highest increment level per configured project.
///
/// Projects without any change file entry resolve to `None`; entries for
/// names that are not configured are ignored.
///
/// # Errors
/// `MissingIncrementType` when `require_level` is set and an entry for a
/// configured project omits its `Type`.
pub fn resolve_increment_levels(
    files: &[ChangeFile],
    containers: &[ProjectContainer],
    require_level: bool,
) -> Result<HashMap<String, IncrementLevel>> {
    let mut levels: HashMap<String, IncrementLevel> = containers
        .iter()
        .map(|c| (c.name.clone(), IncrementLevel::None))
        .collect();

    for project in files.iter().flat_map(|f| &f.projects) {
        let Some(current) = levels.get_mut(&project.name) else {
            debug!("Ignoring change for unconfigured project '{}'", project.name);
            continue;
        };

        match project.r#type {
            Some(level) => *current = (*current).max(level),
            None if require_level => {
                return Err(RelverError::MissingIncrementType(format!(
                    "A change file entry for project '{}' has no 'Type', which is required when 'ChangeFilesDetermineIncrementType' is enabled",
                    project.name
                )));
            }
            None => {}
        }
    }

    Ok(levels)
}

/// Build a change file for the `change` command.
///
/// With `project_name` the file lists only that project; otherwise it lists
/// every configured project, and a message is only allowed when there is a
/// single project.
pub fn generate_change_file(
    config: &ReleaseConfig,
    level: IncrementLevel,
    project_name: Option<&str>,
    message: Option<&str>,
) -> Result<ChangeFile> {
    let messages: Vec<String> = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| vec![m.to_string()])
        .unwrap_or_default();

    let names: Vec<&str> = match project_name {
        Some(name) => {
            let container = config.container(name).ok_or_else(|| {
                RelverError::config(format!(
                    "The project '{}' is not configured. Check the 'Projects' list in the configuration file.",
                    name
                ))
            })?;
            vec![container.name.as_str()]
        }
        None => {
            if config.containers.len() > 1 && !messages.is_empty() {
                return Err(RelverError::argument(
                    "You need to specify a project name with the change message. Use the '--project-name' argument to specify the project name.",
                ));
            }
            config.containers.iter().map(|c| c.name.as_str()).collect()
        }
    };

    Ok(ChangeFile {
        projects: names
            .into_iter()
            .map(|name| ProjectChange {
                name: name.to_string(),
                r#type: Some(level),
                changelog_messages: messages.clone(),
            })
            .collect(),
    })
}

/// Write a change file under a fresh uuid name, returning its repository-relative path
pub fn persist_change_file(root: &Path, file: &ChangeFile) -> Result<PathBuf> {
    let folder = root.join(changes_path());
    fs::create_dir_all(&folder)?;

    let relative = changes_path().join(format!("{}.json", Uuid::new_v4()));
    let mut text = serde_json::to_string_pretty(file)?;
    text.push('\n');
    fs::write(root.join(&relative), text)?;

    info!("Created change file {}", relative.display());
    Ok(relative)
}

/// Delete every working-tree change file and stage the removal.
///
/// Files that cannot be deleted are logged and returned as warnings.
pub fn reset_change_files<R: Repository + ?Sized>(repo: &mut R) -> Result<Vec<BoundaryWarning>> {
    let folder = repo.root().join(changes_path());
    if !folder.is_dir() {
        return Ok(Vec::new());
    }

    let mut warnings = Vec::new();
    let mut deleted = 0usize;
    for entry in WalkDir::new(&folder).min_depth(1) {
        let entry = entry.map_err(|e| RelverError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => deleted += 1,
            Err(e) => {
                warn!(
                    "Unable to delete the change file '{}': {}",
                    entry.path().display(),
                    e
                );
                warnings.push(BoundaryWarning::UndeletableChangeFile {
                    path: entry.path().display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    repo.stage(&changes_path())?;
    info!("Removed {} change file(s)", deleted);
    Ok(warnings)
}
