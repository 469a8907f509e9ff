use crate::error::{RelverError, Result};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::fmt;

/// Date-named release tag (e.g. `release_2024-05-01`, `release_2024-05-01_2`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag {
    pub date: NaiveDate,
    pub count: u32,
}

impl ReleaseTag {
    /// Prefix shared by every release tag
    pub const PREFIX: &'static str = "release";

    const DATE_FORMAT: &'static str = "%Y-%m-%d";

    /// Create a tag for `date`; counts below 1 are raised to 1
    pub fn new(date: NaiveDate, count: u32) -> Self {
        ReleaseTag {
            date,
            count: count.max(1),
        }
    }

    /// Whether a raw git tag name belongs to the release lineage
    pub fn is_release_tag(name: &str) -> bool {
        name.strip_prefix(Self::PREFIX)
            .map(|rest| rest.starts_with('_'))
            .unwrap_or(false)
    }

    /// Parse `release_YYYY-MM-DD[_N]`
    ///
    /// Returns `MalformedTag` when the name carries the release prefix but the
    /// remainder is not a valid date with an optional positive count.
    pub fn parse(name: &str) -> Result<Self> {
        let rest = name
            .strip_prefix(Self::PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(|| RelverError::tag(name))?;

        let (date_part, count_part) = match rest.split_once('_') {
            Some((date, count)) => (date, Some(count)),
            None => (rest, None),
        };

        // chrono accepts unpadded fields, the tag format does not
        if date_part.len() != 10 {
            return Err(RelverError::tag(name));
        }
        let date = NaiveDate::parse_from_str(date_part, Self::DATE_FORMAT)
            .map_err(|_| RelverError::tag(name))?;

        let count = match count_part {
            None => 1,
            Some(text) => {
                if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
                    return Err(RelverError::tag(name));
                }
                match text.parse::<u32>() {
                    Ok(n) if n >= 1 => n,
                    _ => return Err(RelverError::tag(name)),
                }
            }
        };

        Ok(ReleaseTag { date, count })
    }

    /// Git tag name; the count suffix is omitted for the first release of a day
    pub fn name(&self) -> String {
        let date = self.date.format(Self::DATE_FORMAT);
        if self.count > 1 {
            format!("{}_{}_{}", Self::PREFIX, date, self.count)
        } else {
            format!("{}_{}", Self::PREFIX, date)
        }
    }

    /// Human readable release title used for commits and changelog headings
    pub fn title(&self) -> String {
        let date = self.date.format(Self::DATE_FORMAT);
        if self.count > 1 {
            format!("Release {} #{}", date, self.count)
        } else {
            format!("Release {}", date)
        }
    }
}

impl Ord for ReleaseTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then(self.count.cmp(&other.count))
    }
}

impl PartialOrd for ReleaseTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
