//! Inline suppression comments
//!
//! ```text
//! // complint-disable-next-line missing-alt
//! <img src={logo} />
//! {/* complint-disable-line hardcoded-string, mixed-language */}
//! /* complint-disable-file unused-import */
//! ```
//!
//! `*` (or no kind at all) suppresses every kind.

use super::SourceUnit;
use crate::issue::Issue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"complint-disable(-next-line|-line|-file)(?:\s+([\w*,\s-]+?))?\s*(?:\*/|$)")
        .unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Kinds {
    #[default]
    All,
    Only(HashSet<String>),
}

impl Kinds {
    fn parse(list: Option<&str>) -> Self {
        let names: HashSet<String> = list
            .unwrap_or("")
            .split([',', ' ', '\t'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() || names.contains("*") {
            Kinds::All
        } else {
            Kinds::Only(names)
        }
    }

    fn covers(&self, kind: &str) -> bool {
        match self {
            Kinds::All => true,
            Kinds::Only(names) => names.contains(kind),
        }
    }

    fn merge(&mut self, other: Kinds) {
        match other {
            Kinds::All => *self = Kinds::All,
            Kinds::Only(names) => {
                if let Kinds::Only(existing) = self {
                    existing.extend(names);
                }
            }
        }
    }
}

/// Suppressions declared in one unit's comments
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    file: Option<Kinds>,
    lines: HashMap<usize, Kinds>,
}

impl Suppressions {
    pub fn from_unit(unit: &SourceUnit) -> Self {
        let mut result = Suppressions::default();
        for span in unit.comments() {
            let comment = &unit.full_text()[span.range()];
            let end_line = unit.line_of(span.end.saturating_sub(1));
            for cap in DIRECTIVE.captures_iter(comment) {
                let kinds = Kinds::parse(cap.get(2).map(|m| m.as_str()));
                match &cap[1] {
                    "-file" => match result.file.as_mut() {
                        Some(existing) => existing.merge(kinds),
                        None => result.file = Some(kinds),
                    },
                    "-line" => result.add_line(end_line, kinds),
                    _ => result.add_line(end_line + 1, kinds),
                }
            }
        }
        result
    }

    fn add_line(&mut self, line: usize, kinds: Kinds) {
        match self.lines.get_mut(&line) {
            Some(existing) => existing.merge(kinds),
            None => {
                self.lines.insert(line, kinds);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.lines.is_empty()
    }

    pub fn is_suppressed(&self, issue: &Issue) -> bool {
        let kind = issue.kind.as_str();
        self.file.as_ref().is_some_and(|k| k.covers(kind))
            || self.lines.get(&issue.line).is_some_and(|k| k.covers(kind))
    }

    /// Drop suppressed issues
    pub fn filter(&self, issues: Vec<Issue>) -> Vec<Issue> {
        if self.is_empty() {
            return issues;
        }
        issues.into_iter().filter(|i| !self.is_suppressed(i)).collect()
    }
}
