//! Build manifests and their version fields
//!
//! A manifest is only ever touched through [ManifestDocument], so the release
//! logic never cares whether it is editing TOML, JSON or XML.

pub mod cargo;
pub mod package_json;
pub mod xml;

pub use cargo::CargoManifest;
pub use package_json::PackageJsonManifest;
pub use xml::{XmlFlavor, XmlManifest};

use crate::error::{RelverError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Directories never searched for manifests
const SKIPPED_DIRS: [&str; 5] = ["target", "node_modules", ".git", "bin", "obj"];

/// Version-field capability of a parsed manifest
pub trait ManifestDocument {
    /// Raw text of the version field, `None` when the field is absent
    fn version_text(&self) -> Option<String>;

    /// Replace (or create) the version field
    fn set_version_text(&mut self, text: &str) -> Result<()>;

    /// Serialize the document back to text
    fn render(&self) -> String;
}

/// Supported manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Cargo,
    PackageJson,
    MsBuild,
    Nuspec,
}

impl ManifestKind {
    /// Detect the format from a file name
    pub fn detect(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if file_name == "Cargo.toml" {
            return Some(ManifestKind::Cargo);
        }
        if file_name == "package.json" {
            return Some(ManifestKind::PackageJson);
        }

        match path.extension()?.to_str()? {
            "csproj" | "props" => Some(ManifestKind::MsBuild),
            "nuspec" => Some(ManifestKind::Nuspec),
            _ => None,
        }
    }

    /// Whether the manifest is named after its directory rather than its file
    pub fn named_by_directory(self) -> bool {
        matches!(self, ManifestKind::Cargo | ManifestKind::PackageJson)
    }
}

/// A manifest file on disk together with its parsed document
pub struct ProjectManifest {
    pub path: PathBuf,
    pub kind: ManifestKind,
    document: Box<dyn ManifestDocument>,
}

impl ProjectManifest {
    /// Parse manifest `contents` belonging to `path`
    pub fn from_source(path: impl Into<PathBuf>, contents: &str) -> Result<Self> {
        let path = path.into();
        let kind = ManifestKind::detect(&path).ok_or_else(|| {
            RelverError::config(format!(
                "Unsupported manifest '{}': expected Cargo.toml, package.json, .csproj, .props or .nuspec",
                path.display()
            ))
        })?;

        let document: Box<dyn ManifestDocument> = match kind {
            ManifestKind::Cargo => Box::new(CargoManifest::parse(contents)?),
            ManifestKind::PackageJson => Box::new(PackageJsonManifest::parse(contents)?),
            ManifestKind::MsBuild => Box::new(XmlManifest::parse(contents, XmlFlavor::MsBuild)?),
            ManifestKind::Nuspec => Box::new(XmlManifest::parse(contents, XmlFlavor::Nuspec)?),
        };

        Ok(ProjectManifest {
            path,
            kind,
            document,
        })
    }

    pub fn version_text(&self) -> Option<String> {
        self.document.version_text()
    }

    pub fn set_version_text(&mut self, text: &str) -> Result<()> {
        self.document.set_version_text(text)
    }

    pub fn has_version_field(&self) -> bool {
        self.document.version_text().is_some()
    }

    pub fn render(&self) -> String {
        self.document.render()
    }

    /// Default project name for a discovered manifest
    pub fn default_name(&self) -> String {
        let from_dir = || {
            self.path
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
        };
        let from_stem = || {
            self.path
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
        };

        let name = if self.kind.named_by_directory() {
            from_dir().or_else(from_stem)
        } else {
            from_stem().or_else(from_dir)
        };
        name.unwrap_or_else(|| self.path.display().to_string())
    }
}

impl fmt::Debug for ProjectManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectManifest")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("version", &self.version_text())
            .finish()
    }
}

/// Loads and saves manifests
pub trait ManifestStore {
    fn load(&self, path: &Path) -> Result<ProjectManifest>;
    fn save(&self, manifest: &ProjectManifest) -> Result<()>;
}

/// Filesystem-backed manifest store
#[derive(Debug, Default, Clone, Copy)]
pub struct FsManifestStore;

impl ManifestStore for FsManifestStore {
    fn load(&self, path: &Path) -> Result<ProjectManifest> {
        if !path.is_file() {
            return Err(RelverError::config(format!(
                "Manifest '{}' does not exist",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        debug!("Loaded manifest {}", path.display());
        ProjectManifest::from_source(path, &contents)
    }

    fn save(&self, manifest: &ProjectManifest) -> Result<()> {
        fs::write(&manifest.path, manifest.render())?;
        info!("Wrote {}", manifest.path.display());
        Ok(())
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Find every supported manifest below `dir`, sorted by path
pub fn discover_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    if dir.is_file() {
        return Ok(ManifestKind::detect(dir)
            .map(|_| vec![dir.to_path_buf()])
            .unwrap_or_default());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_skipped(e)) {
        let entry = entry.map_err(|e| RelverError::Io(e.into()))?;
        if entry.file_type().is_file() && ManifestKind::detect(entry.path()).is_some() {
            found.push(entry.into_path());
        }
    }

    found.sort();
    debug!("Discovered {} manifest(s) under {}", found.len(), dir.display());
    Ok(found)
}
