use crate::changelog::{ChangelogCategory, ChangelogChange};
use crate::domain::ChangeRecord;
use crate::error::Result;
use crate::git::Repository;
use std::collections::BTreeMap;
use tracing::debug;

/// Built-in labels for well-known commit types
const BUILTIN_CATEGORIES: [(&str, &str); 11] = [
    ("build", "Build System"),
    ("chore", "Chores"),
    ("ci", "Continuous Integration"),
    ("docs", "Documentation"),
    ("feat", "Features"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance"),
    ("refactor", "Refactor"),
    ("revert", "Revert"),
    ("style", "Style"),
    ("test", "Testing"),
];

/// Result of scanning commit history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitScan {
    /// Commits that parsed as change records, newest first
    pub records: Vec<ChangeRecord>,
    /// Number of commits whose header had no `:`
    pub skipped: usize,
}

/// Parse every commit reachable from HEAD but not from `since_tag`
pub fn commits_since<R: Repository + ?Sized>(
    repo: &R,
    since_tag: Option<&str>,
) -> Result<CommitScan> {
    let mut scan = CommitScan::default();

    for commit in repo.commits_since(since_tag)? {
        match ChangeRecord::parse(&commit.header, &commit.body) {
            Some(record) => scan.records.push(record),
            None => {
                debug!("Skipping commit {}: '{}'", commit.hash, commit.header);
                scan.skipped += 1;
            }
        }
    }

    Ok(scan)
}

/// Label for a commit type: user override, then built-in, then the raw type
pub fn category_label(kind: &str, overrides: &BTreeMap<String, String>) -> String {
    if let Some(label) = overrides.get(kind) {
        return label.clone();
    }

    BUILTIN_CATEGORIES
        .iter()
        .find(|(key, _)| *key == kind)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| kind.to_string())
}

/// Group change records into changelog categories.
///
/// Categories are ordered alphabetically by commit type; changes within a
/// category by scope (unscoped first) and then description.
pub fn categorize(
    records: &[ChangeRecord],
    overrides: &BTreeMap<String, String>,
) -> Vec<ChangelogCategory> {
    let mut groups: BTreeMap<&str, Vec<&ChangeRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.kind.as_str()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(kind, mut group)| {
            group.sort_by(|a, b| {
                a.scope
                    .cmp(&b.scope)
                    .then_with(|| a.description.cmp(&b.description))
            });

            ChangelogCategory {
                label: category_label(kind, overrides),
                version: None,
                changes: group
                    .into_iter()
                    .map(|record| ChangelogChange {
                        scope: record.scope.clone(),
                        description: record.description.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn record(header: &str) -> ChangeRecord {
        ChangeRecord::parse(header, "").unwrap()
    }

    #[test]
    fn test_commits_since_counts_skipped() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: old");
        repo.add_tag("release_2024-01-01");
        repo.add_commit("fix: new");
        repo.add_commit("Update readme");

        let scan = commits_since(&repo, Some("release_2024-01-01")).unwrap();
        assert_eq!(scan.records.len(), 1);
        assert_eq!(scan.records[0].description, "new");
        assert_eq!(scan.skipped, 1);
    }

    #[test]
    fn test_category_label_precedence() {
        let mut overrides = BTreeMap::new();
        overrides.insert("feat".to_string(), "New Features".to_string());

        assert_eq!(category_label("feat", &overrides), "New Features");
        assert_eq!(category_label("fix", &overrides), "Bug Fixes");
        assert_eq!(category_label("ci", &overrides), "Continuous Integration");
        assert_eq!(category_label("wip", &overrides), "wip");
    }

    #[test]
    fn test_categorize_orders_types_and_changes() {
        let records = vec![
            record("fix(ui): b"),
            record("feat: x"),
            record("fix: z"),
            record("fix(api): a"),
            record("fix: c"),
        ];

        let categories = categorize(&records, &BTreeMap::new());
        let labels: Vec<&str> = categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Features", "Bug Fixes"]);

        let fixes: Vec<(Option<&str>, &str)> = categories[1]
            .changes
            .iter()
            .map(|c| (c.scope.as_deref(), c.description.as_str()))
            .collect();
        assert_eq!(
            fixes,
            vec![
                (None, "c"),
                (None, "z"),
                (Some("api"), "a"),
                (Some("ui"), "b"),
            ]
        );
    }

    #[test]
    fn test_categorize_orders_by_type_key_not_label() {
        let mut overrides = BTreeMap::new();
        overrides.insert("feat".to_string(), "Added".to_string());

        let records = vec![record("feat: a"), record("docs: b"), record("build: c")];
        let categories = categorize(&records, &overrides);
        let labels: Vec<&str> = categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Build System", "Documentation", "Added"]);
    }

    #[test]
    fn test_categorize_empty() {
        assert!(categorize(&[], &BTreeMap::new()).is_empty());
    }
}
