//! MSBuild (`.csproj`, `.props`) and NuGet (`.nuspec`) manifests.
//!
//! Only the first version element is read or rewritten; the rest of the
//! document is kept byte for byte.

use super::ManifestDocument;
use crate::error::{RelverError, Result};
use regex::Regex;

/// Which element carries the version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlFlavor {
    /// `<Version>` inside a `<PropertyGroup>`
    MsBuild,
    /// `<version>` inside `<metadata>`
    Nuspec,
}

impl XmlFlavor {
    fn element(self) -> &'static str {
        match self {
            XmlFlavor::MsBuild => "Version",
            XmlFlavor::Nuspec => "version",
        }
    }

    fn container(self) -> &'static str {
        match self {
            XmlFlavor::MsBuild => "PropertyGroup",
            XmlFlavor::Nuspec => "metadata",
        }
    }
}

pub struct XmlManifest {
    text: String,
    flavor: XmlFlavor,
    element: Regex,
    container: Regex,
}

impl XmlManifest {
    pub fn parse(contents: &str, flavor: XmlFlavor) -> Result<Self> {
        let element = Regex::new(&format!(
            r"(?s)(<{0}(?:\s[^>]*)?>)(.*?)(</{0}\s*>)",
            flavor.element()
        ))
        .map_err(|e| RelverError::manifest(e.to_string()))?;
        let container = Regex::new(&format!(
            r"(?m)^([ \t]*)<{}(?:\s[^>]*)?>",
            flavor.container()
        ))
        .map_err(|e| RelverError::manifest(e.to_string()))?;

        Ok(XmlManifest {
            text: contents.to_string(),
            flavor,
            element,
            container,
        })
    }
}

impl ManifestDocument for XmlManifest {
    fn version_text(&self) -> Option<String> {
        self.element
            .captures(&self.text)
            .and_then(|c| c.get(2))
            .map(|m| m.as_str().trim().to_string())
    }

    fn set_version_text(&mut self, text: &str) -> Result<()> {
        let existing = self
            .element
            .captures(&self.text)
            .and_then(|c| c.get(2))
            .map(|m| m.range());
        if let Some(range) = existing {
            self.text.replace_range(range, text);
            return Ok(());
        }

        let open = self.container.captures(&self.text).map(|c| {
            let indent = c.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            let end = c.get(0).map(|m| m.end()).unwrap_or(0);
            (indent, end)
        });
        let Some((indent, end)) = open else {
            return Err(RelverError::MissingVersionField(format!(
                "Document has no <{}> element to hold a <{}> element",
                self.flavor.container(),
                self.flavor.element()
            )));
        };

        let insertion = format!(
            "\n{indent}  <{el}>{text}</{el}>",
            el = self.flavor.element()
        );
        self.text.insert_str(end, &insertion);
        Ok(())
    }

    fn render(&self) -> String {
        self.text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Version>1.4.0</Version>
  </PropertyGroup>
</Project>
"#;

    #[test]
    fn test_msbuild_version() {
        let manifest = XmlManifest::parse(CSPROJ, XmlFlavor::MsBuild).unwrap();
        assert_eq!(manifest.version_text().as_deref(), Some("1.4.0"));
    }

    #[test]
    fn test_msbuild_set_version_touches_only_element() {
        let mut manifest = XmlManifest::parse(CSPROJ, XmlFlavor::MsBuild).unwrap();
        manifest.set_version_text("1.5.0-beta").unwrap();
        assert_eq!(
            manifest.render(),
            CSPROJ.replace("<Version>1.4.0</Version>", "<Version>1.5.0-beta</Version>")
        );
    }

    #[test]
    fn test_msbuild_missing_version_is_inserted() {
        let text = "<Project>\n  <PropertyGroup>\n    <OutputType>Exe</OutputType>\n  </PropertyGroup>\n</Project>\n";
        let mut manifest = XmlManifest::parse(text, XmlFlavor::MsBuild).unwrap();
        assert_eq!(manifest.version_text(), None);

        manifest.set_version_text("0.0.1").unwrap();
        assert_eq!(manifest.version_text().as_deref(), Some("0.0.1"));
        assert!(manifest
            .render()
            .contains("  <PropertyGroup>\n    <Version>0.0.1</Version>"));
    }

    #[test]
    fn test_msbuild_without_property_group() {
        let mut manifest = XmlManifest::parse("<Project />", XmlFlavor::MsBuild).unwrap();
        assert!(matches!(
            manifest.set_version_text("1.0.0"),
            Err(RelverError::MissingVersionField(_))
        ));
    }

    #[test]
    fn test_nuspec_uses_lowercase_element() {
        let text = "<package>\n  <metadata>\n    <id>Lib</id>\n    <version>3.0.0</version>\n  </metadata>\n</package>\n";
        let mut manifest = XmlManifest::parse(text, XmlFlavor::Nuspec).unwrap();
        assert_eq!(manifest.version_text().as_deref(), Some("3.0.0"));

        manifest.set_version_text("3.0.1").unwrap();
        assert!(manifest.render().contains("<version>3.0.1</version>"));
    }

    #[test]
    fn test_version_prefix_is_not_a_version() {
        let text = "<Project>\n  <PropertyGroup>\n    <VersionPrefix>1.0.0</VersionPrefix>\n  </PropertyGroup>\n</Project>";
        let manifest = XmlManifest::parse(text, XmlFlavor::MsBuild).unwrap();
        assert_eq!(manifest.version_text(), None);
    }
}
