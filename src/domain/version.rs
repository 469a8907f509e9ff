use crate::error::{RelverError, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Three-part version with an optional prerelease label
///
/// Ordering compares major, minor and patch numerically, then the prerelease
/// labels ordinally with an absent label treated as the empty string. This means
/// `1.0.0` sorts before `1.0.0-alpha`.
#[derive(Debug, Clone)]
pub struct ThreePartVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub prerelease: Option<String>,
}

impl ThreePartVersion {
    /// Version used when a manifest has no usable version yet
    pub const BOOTSTRAP: ThreePartVersion = ThreePartVersion {
        major: 0,
        minor: 0,
        patch: 1,
        prerelease: None,
    };

    /// Create a new version without a prerelease label
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        ThreePartVersion {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Attach (or clear) a prerelease label. Empty labels are treated as absent.
    pub fn with_prerelease(mut self, label: Option<&str>) -> Self {
        self.prerelease = label.filter(|l| !l.is_empty()).map(str::to_string);
        self
    }

    /// Parse `MAJOR.MINOR.PATCH[-LABEL]`
    ///
    /// The text is split once on `-`; everything after it is the label. The
    /// remainder must be exactly three dot-separated, all-digit components.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let (numbers, label) = match trimmed.split_once('-') {
            Some((numbers, label)) => {
                if label.is_empty() {
                    return Err(RelverError::version(text));
                }
                (numbers, Some(label))
            }
            None => (trimmed, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() != 3 {
            return Err(RelverError::version(text));
        }

        let component = |part: &str| -> Result<u32> {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(RelverError::version(text));
            }
            part.parse::<u32>().map_err(|_| RelverError::version(text))
        };

        Ok(ThreePartVersion {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
            prerelease: label.map(str::to_string),
        })
    }

    /// Parse without failing: malformed text yields the bootstrap version and `false`.
    pub fn try_parse(text: &str) -> (Self, bool) {
        match Self::parse(text) {
            Ok(version) => (version, true),
            Err(_) => (Self::BOOTSTRAP, false),
        }
    }

    /// Current version of a manifest; missing or blank text bootstraps to `0.0.1`.
    pub fn current(text: Option<&str>) -> Result<Self> {
        match text.map(str::trim) {
            None | Some("") => Ok(Self::BOOTSTRAP),
            Some(text) => Self::parse(text),
        }
    }

    /// Bump according to `level`; the prerelease label is always replaced by `label`.
    ///
    /// Fails with `VersionOutOfRange` when the bumped component would exceed `u32::MAX`.
    pub fn bump(&self, level: IncrementLevel, label: Option<&str>) -> Result<Self> {
        let next = |component: u32| {
            component
                .checked_add(1)
                .ok_or_else(|| RelverError::VersionOutOfRange(self.to_string()))
        };

        let (major, minor, patch) = match level {
            IncrementLevel::Major => (next(self.major)?, 0, 0),
            IncrementLevel::Minor => (self.major, next(self.minor)?, 0),
            IncrementLevel::Patch => (self.major, self.minor, next(self.patch)?),
            IncrementLevel::None => (self.major, self.minor, self.patch),
        };

        Ok(ThreePartVersion::new(major, minor, patch).with_prerelease(label))
    }

    /// Three-way comparison returning -1, 0 or 1
    pub fn compare(&self, other: &Self) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    fn label_key(&self) -> &str {
        self.prerelease.as_deref().unwrap_or("")
    }
}

impl Ord for ThreePartVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| self.label_key().cmp(other.label_key()))
    }
}

impl PartialOrd for ThreePartVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ThreePartVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ThreePartVersion {}

impl FromStr for ThreePartVersion {
    type Err = RelverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ThreePartVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(label) = &self.prerelease {
            write!(f, "-{}", label)?;
        }
        Ok(())
    }
}

/// Granularity of a version bump
///
/// Variant order gives the precedence used when several sources disagree:
/// `Major > Minor > Patch > None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum IncrementLevel {
    None,
    #[default]
    Patch,
    Minor,
    Major,
}

impl FromStr for IncrementLevel {
    type Err = RelverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(IncrementLevel::None),
            "patch" => Ok(IncrementLevel::Patch),
            "minor" => Ok(IncrementLevel::Minor),
            "major" => Ok(IncrementLevel::Major),
            _ => Err(RelverError::argument(format!(
                "Unknown increment type '{}'. Available values: Major, Minor, Patch, None",
                s
            ))),
        }
    }
}

/// Configuration files may spell levels in any case (`"minor"`, `"MAJOR"`)
impl<'de> Deserialize<'de> for IncrementLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(|_| {
            de::Error::unknown_variant(&text, &["None", "Patch", "Minor", "Major"])
        })
    }
}

impl fmt::Display for IncrementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IncrementLevel::None => "None",
            IncrementLevel::Patch => "Patch",
            IncrementLevel::Minor => "Minor",
            IncrementLevel::Major => "Major",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = ThreePartVersion::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
        assert_eq!(v.prerelease, None);
    }

    #[test]
    fn test_version_parse_prerelease() {
        let v = ThreePartVersion::parse("2.0.0-beta.1").unwrap();
        assert_eq!(v, ThreePartVersion::new(2, 0, 0).with_prerelease(Some("beta.1")));
        assert_eq!(v.prerelease.as_deref(), Some("beta.1"));
    }

    #[test]
    fn test_version_parse_label_keeps_later_hyphens() {
        let v = ThreePartVersion::parse("1.0.0-rc-2").unwrap();
        assert_eq!(v.prerelease.as_deref(), Some("rc-2"));
    }

    #[test]
    fn test_version_parse_invalid() {
        for text in [
            "1.2", "1.2.3.4", "v1.2.3", "1.a.3", "", "1..3", "1.2.3-", "+1.2.3", "1.2.-3",
        ] {
            assert!(
                matches!(
                    ThreePartVersion::parse(text),
                    Err(RelverError::MalformedVersion(_))
                ),
                "'{}' should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_try_parse_recovers_to_bootstrap() {
        let (version, ok) = ThreePartVersion::try_parse("not-a-version");
        assert!(!ok);
        assert_eq!(version, ThreePartVersion::new(0, 0, 1));

        let (version, ok) = ThreePartVersion::try_parse("3.4.5");
        assert!(ok);
        assert_eq!(version, ThreePartVersion::new(3, 4, 5));
    }

    #[test]
    fn test_current_bootstraps_missing_text() {
        assert_eq!(
            ThreePartVersion::current(None).unwrap(),
            ThreePartVersion::BOOTSTRAP
        );
        assert_eq!(
            ThreePartVersion::current(Some("  ")).unwrap(),
            ThreePartVersion::BOOTSTRAP
        );
        assert!(ThreePartVersion::current(Some("1.0")).is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["0.0.0", "1.2.3", "10.20.30-alpha", "4.5.6-rc.1"] {
            let v = ThreePartVersion::parse(text).unwrap();
            assert_eq!(v.to_string(), text);
            assert_eq!(ThreePartVersion::parse(&v.to_string()).unwrap(), v);
        }
    }

    #[test]
    fn test_ordering_numeric() {
        let versions: Vec<ThreePartVersion> = ["1.2.0", "1.2.1", "1.3.0", "2.0.0"]
            .iter()
            .map(|t| ThreePartVersion::parse(t).unwrap())
            .collect();

        for pair in versions.windows(2) {
            assert!(pair[0] < pair[1], "{} < {}", pair[0], pair[1]);
            assert_eq!(pair[0].compare(&pair[1]), -1);
            assert_eq!(pair[1].compare(&pair[0]), 1);
        }
        assert!(ThreePartVersion::new(1, 10, 0) > ThreePartVersion::new(1, 9, 0));
    }

    #[test]
    fn test_ordering_prerelease_is_ordinal() {
        let plain = ThreePartVersion::new(1, 0, 0);
        let alpha = plain.clone().with_prerelease(Some("alpha"));
        let beta = plain.clone().with_prerelease(Some("beta"));

        // Absent label compares as "" and therefore sorts first.
        assert!(plain < alpha);
        assert!(alpha < beta);
        assert_eq!(plain.compare(&ThreePartVersion::new(1, 0, 0)), 0);
    }

    #[test]
    fn test_version_bump_major() {
        let v = ThreePartVersion::new(1, 2, 3);
        assert_eq!(
            v.bump(IncrementLevel::Major, None).unwrap(),
            ThreePartVersion::new(2, 0, 0)
        );
    }

    #[test]
    fn test_version_bump_minor() {
        let v = ThreePartVersion::new(1, 2, 3);
        assert_eq!(
            v.bump(IncrementLevel::Minor, None).unwrap(),
            ThreePartVersion::new(1, 3, 0)
        );
    }

    #[test]
    fn test_version_bump_patch() {
        let v = ThreePartVersion::new(1, 2, 3);
        assert_eq!(
            v.bump(IncrementLevel::Patch, None).unwrap(),
            ThreePartVersion::new(1, 2, 4)
        );
    }

    #[test]
    fn test_version_bump_none_keeps_triple() {
        let v = ThreePartVersion::new(1, 2, 3);
        assert_eq!(v.bump(IncrementLevel::None, None).unwrap(), v);
    }

    #[test]
    fn test_version_bump_replaces_label() {
        let v = ThreePartVersion::parse("1.2.3-alpha").unwrap();
        assert_eq!(v.bump(IncrementLevel::None, None).unwrap().to_string(), "1.2.3");
        assert_eq!(
            v.bump(IncrementLevel::Patch, Some("beta")).unwrap().to_string(),
            "1.2.4-beta"
        );
        assert_eq!(
            ThreePartVersion::new(1, 0, 0)
                .bump(IncrementLevel::None, Some("preview"))
                .unwrap()
                .to_string(),
            "1.0.0-preview"
        );
    }

    #[test]
    fn test_version_bump_at_component_limit() {
        let top = ThreePartVersion::parse("4294967295.0.0").unwrap();
        assert!(matches!(
            top.bump(IncrementLevel::Major, None),
            Err(RelverError::VersionOutOfRange(_))
        ));
        assert_eq!(
            top.bump(IncrementLevel::Minor, None).unwrap().to_string(),
            "4294967295.1.0"
        );

        let minor = ThreePartVersion::new(1, u32::MAX, 7);
        assert!(minor.bump(IncrementLevel::Minor, None).is_err());
        assert_eq!(
            minor.bump(IncrementLevel::Major, None).unwrap(),
            ThreePartVersion::new(2, 0, 0)
        );

        let patch = ThreePartVersion::new(0, 0, u32::MAX);
        assert!(patch.bump(IncrementLevel::Patch, None).is_err());
        assert_eq!(patch.bump(IncrementLevel::None, None).unwrap(), patch);
    }

    #[test]
    fn test_increment_level_precedence() {
        let levels = [
            IncrementLevel::Patch,
            IncrementLevel::Major,
            IncrementLevel::Minor,
        ];
        assert_eq!(levels.iter().max(), Some(&IncrementLevel::Major));
        assert!(IncrementLevel::None < IncrementLevel::Patch);
    }

    #[test]
    fn test_increment_level_from_str() {
        assert_eq!(
            "major".parse::<IncrementLevel>().unwrap(),
            IncrementLevel::Major
        );
        assert_eq!(
            "Patch".parse::<IncrementLevel>().unwrap(),
            IncrementLevel::Patch
        );
        assert_eq!(
            "NONE".parse::<IncrementLevel>().unwrap(),
            IncrementLevel::None
        );
        assert!("huge".parse::<IncrementLevel>().is_err());
    }

    #[test]
    fn test_increment_level_serde_names() {
        let json = serde_json::to_string(&IncrementLevel::Minor).unwrap();
        assert_eq!(json, "\"Minor\"");
        let level: IncrementLevel = serde_json::from_str("\"None\"").unwrap();
        assert_eq!(level, IncrementLevel::None);
    }

    #[test]
    fn test_increment_level_deserialize_ignores_case() {
        let level: IncrementLevel = serde_json::from_str("\"minor\"").unwrap();
        assert_eq!(level, IncrementLevel::Minor);
        let level: IncrementLevel = serde_json::from_str("\"MAJOR\"").unwrap();
        assert_eq!(level, IncrementLevel::Major);

        let err = serde_json::from_str::<IncrementLevel>("\"huge\"").unwrap_err();
        assert!(err.to_string().contains("huge"));
    }
}
