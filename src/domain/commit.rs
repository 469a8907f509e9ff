use regex::Regex;
use std::sync::OnceLock;

/// Body markers that flag a commit as a breaking change
const BREAKING_MARKERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

/// Conventional-commit record extracted from a commit header and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub kind: String,
    pub scope: Option<String>,
    pub description: String,
    pub body: String,
    pub is_breaking: bool,
}

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<type>[^(!]*)\((?P<scope>.*)\)(?P<bang>!?)$")
            .unwrap_or_else(|_| unreachable!("static pattern is valid"))
    })
}

impl ChangeRecord {
    /// Parse a commit from its header line and remaining body
    ///
    /// Supports formats:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    ///
    /// Returns `None` when the header contains no `:` at all, or when the prefix
    /// closes a parenthesis before opening one (`feat)x(: y`). Anything else
    /// before the first `:` is accepted as a type, so free-form headers such as
    /// `Merge branch: main` still produce a record.
    pub fn parse(header: &str, body: &str) -> Option<Self> {
        let (prefix, rest) = header.split_once(':')?;

        if let (Some(open), Some(close)) = (prefix.find('('), prefix.rfind(')')) {
            if open >= close {
                return None;
            }
        }

        let bang = prefix.ends_with('!');
        let (kind, scope) = match prefix_pattern().captures(prefix) {
            Some(captures) => {
                let kind = captures.name("type").map(|m| m.as_str()).unwrap_or("");
                let scope = captures
                    .name("scope")
                    .map(|m| m.as_str().trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                (kind, scope)
            }
            None => (prefix.strip_suffix('!').unwrap_or(prefix), None),
        };

        let body = body.trim().to_string();
        let is_breaking = bang || BREAKING_MARKERS.iter().any(|m| body.contains(m));

        Some(ChangeRecord {
            kind: kind.trim().to_string(),
            scope,
            description: rest.trim().to_string(),
            body,
            is_breaking,
        })
    }
}
