//! `Cargo.toml` manifests.
//!
//! Edits go through `toml_edit` so comments, ordering and formatting of the
//! rest of the document survive a version bump. Both `[package].version` and
//! the workspace inheritance root `[workspace.package].version` are handled.

use super::ManifestDocument;
use crate::error::{RelverError, Result};
use toml_edit::{DocumentMut, Item, Table, Value};

#[derive(Debug)]
pub struct CargoManifest {
    doc: DocumentMut,
}

impl CargoManifest {
    pub fn parse(contents: &str) -> Result<Self> {
        let doc = contents
            .parse::<DocumentMut>()
            .map_err(|e| RelverError::manifest(format!("Failed to parse Cargo.toml: {e}")))?;
        Ok(CargoManifest { doc })
    }

    fn package_table(&self) -> Option<&Table> {
        self.doc.get("package").and_then(Item::as_table)
    }

    fn workspace_package_table(&self) -> Option<&Table> {
        self.doc
            .get("workspace")
            .and_then(|w| w.get("package"))
            .and_then(Item::as_table)
    }

    fn version_slot(&mut self) -> Option<&mut Item> {
        let package_has_string = self
            .package_table()
            .and_then(|p| p.get("version"))
            .and_then(Item::as_str)
            .is_some();

        if package_has_string {
            return self.doc.get_mut("package")?.get_mut("version");
        }

        self.doc
            .get_mut("workspace")?
            .get_mut("package")?
            .get_mut("version")
            .filter(|item| item.as_str().is_some())
    }
}

impl ManifestDocument for CargoManifest {
    fn version_text(&self) -> Option<String> {
        // `version.workspace = true` is not a version of its own
        self.package_table()
            .and_then(|p| p.get("version"))
            .and_then(Item::as_str)
            .or_else(|| {
                self.workspace_package_table()
                    .and_then(|p| p.get("version"))
                    .and_then(Item::as_str)
            })
            .map(str::to_string)
    }

    fn set_version_text(&mut self, text: &str) -> Result<()> {
        if let Some(slot) = self.version_slot() {
            let decor = slot.as_value().map(|v| v.decor().clone());
            let mut value = Value::from(text);
            if let Some(decor) = decor {
                *value.decor_mut() = decor;
            }
            *slot = Item::Value(value);
            return Ok(());
        }

        let table = if self.package_table().is_some() {
            self.doc.get_mut("package").and_then(Item::as_table_mut)
        } else {
            self.doc
                .get_mut("workspace")
                .and_then(|w| w.get_mut("package"))
                .and_then(Item::as_table_mut)
        };

        match table {
            Some(table) => {
                table.insert("version", toml_edit::value(text));
                Ok(())
            }
            None => Err(RelverError::MissingVersionField(
                "Cargo.toml has neither a [package] nor a [workspace.package] table".to_string(),
            )),
        }
    }

    fn render(&self) -> String {
        self.doc.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_version() {
        let manifest = CargoManifest::parse(
            "[package]\nname = \"demo\"\nversion = \"1.2.3\" # keep me\n",
        )
        .unwrap();
        assert_eq!(manifest.version_text().as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_set_version_preserves_comments() {
        let mut manifest = CargoManifest::parse(
            "# header\n[package]\nname = \"demo\"\nversion = \"1.2.3\" # keep me\n\n[dependencies]\nserde = \"1\"\n",
        )
        .unwrap();
        manifest.set_version_text("1.3.0").unwrap();

        let rendered = manifest.render();
        assert!(rendered.contains("version = \"1.3.0\" # keep me"));
        assert!(rendered.starts_with("# header\n"));
        assert!(rendered.contains("serde = \"1\""));
    }

    #[test]
    fn test_workspace_package_version() {
        let mut manifest = CargoManifest::parse(
            "[workspace]\nmembers = [\"a\"]\n\n[workspace.package]\nversion = \"0.4.0\"\n",
        )
        .unwrap();
        assert_eq!(manifest.version_text().as_deref(), Some("0.4.0"));

        manifest.set_version_text("0.5.0").unwrap();
        assert!(manifest.render().contains("version = \"0.5.0\""));
    }

    #[test]
    fn test_inherited_version_is_not_a_version() {
        let manifest =
            CargoManifest::parse("[package]\nname = \"a\"\nversion.workspace = true\n").unwrap();
        assert_eq!(manifest.version_text(), None);
    }

    #[test]
    fn test_missing_version_is_inserted_into_package() {
        let mut manifest = CargoManifest::parse("[package]\nname = \"demo\"\n").unwrap();
        assert_eq!(manifest.version_text(), None);

        manifest.set_version_text("0.0.1").unwrap();
        assert_eq!(manifest.version_text().as_deref(), Some("0.0.1"));
    }

    #[test]
    fn test_no_package_table() {
        let mut manifest = CargoManifest::parse("[dependencies]\n").unwrap();
        assert!(matches!(
            manifest.set_version_text("1.0.0"),
            Err(RelverError::MissingVersionField(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = CargoManifest::parse("[package\n").unwrap_err();
        assert!(matches!(err, RelverError::Manifest(_)));
        assert!(err.is_user_error());
    }
}
