//! `package.json` manifests.

use super::ManifestDocument;
use crate::error::{RelverError, Result};
use serde_json::{Map, Value};

pub struct PackageJsonManifest {
    root: Map<String, Value>,
    trailing_newline: bool,
}

impl PackageJsonManifest {
    pub fn parse(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| RelverError::manifest(format!("Failed to parse package.json: {e}")))?;

        match value {
            Value::Object(root) => Ok(PackageJsonManifest {
                root,
                trailing_newline: contents.ends_with('\n'),
            }),
            _ => Err(RelverError::manifest(
                "package.json must contain a JSON object",
            )),
        }
    }
}

impl ManifestDocument for PackageJsonManifest {
    fn version_text(&self) -> Option<String> {
        self.root
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set_version_text(&mut self, text: &str) -> Result<()> {
        self.root
            .insert("version".to_string(), Value::String(text.to_string()));
        Ok(())
    }

    fn render(&self) -> String {
        // A map of JSON values always serializes.
        let mut out = serde_json::to_string_pretty(&self.root).unwrap_or_default();
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }
}
