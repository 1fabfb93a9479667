//! Auto-fix engine.
//!
//! Issues are grouped by file. Each file is parsed once, every fix
//! re-locates its target on the current unit (tag, line and a predicate such
//! as "`img` without `alt`") before editing, and the file is saved once.
//! Fixes run bottom-up with import insertion last. A fix whose target is
//! gone is skipped and not counted.
//!
//! Catalog additions for `missing-translation` are merged after all files,
//! and the catalogs are saved once.

use crate::catalog::{humanize_key, TranslationCatalog};
use crate::checkers::{
    add_width_cap, conflicting_families, lacks_width_cap, resolve_family, CheckOptions,
    ClassFamily,
};
use crate::issue::{Category, Issue, IssueKind};
use crate::source::{AttrValue, Attribute, Edit, Element, Node, SourceUnit};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Lines of context around a diff hunk
const DIFF_CONTEXT: usize = 3;

/// What to do with fixed units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixMode {
    /// Save fixed files and catalogs
    #[default]
    Write,
    /// Count fixes without writing anything
    DryRun,
    /// Produce unified diffs without writing anything
    Diff,
}

/// Result of a fix pass
#[derive(Debug, Default)]
pub struct FixOutcome {
    /// Files changed (or that would change outside `Write` mode)
    pub files_modified: usize,
    /// Fixes applied
    pub fixed: usize,
    pub fixed_by_category: BTreeMap<Category, usize>,
    /// Eligible issues whose target could not be located
    pub skipped: usize,
    pub errors: Vec<String>,
    /// Unified diffs keyed by file (`Diff` mode)
    pub diffs: BTreeMap<PathBuf, String>,
}

impl FixOutcome {
    fn record(&mut self, category: Category) {
        self.fixed += 1;
        *self.fixed_by_category.entry(category).or_default() += 1;
    }

    /// Fixed count for one category
    pub fn fixed_in(&self, category: Category) -> usize {
        self.fixed_by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Per-file result, merged into [`FixOutcome`]
#[derive(Debug, Default)]
struct FileFix {
    applied: Vec<Category>,
    skipped: usize,
    modified: bool,
    error: Option<String>,
    diff: Option<String>,
}

pub struct Fixer {
    mode: FixMode,
    parallel: bool,
    wrapper_component: String,
    wrapper_import: String,
    accepted_wrappers: Vec<String>,
}

impl Fixer {
    pub fn new(options: &CheckOptions) -> Self {
        Self {
            mode: FixMode::Write,
            parallel: true,
            wrapper_component: options.wrapper_component.clone(),
            wrapper_import: options.wrapper_import.clone(),
            accepted_wrappers: options.layout_wrappers.clone(),
        }
    }

    pub fn with_mode(mut self, mode: FixMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn mode(&self) -> FixMode {
        self.mode
    }

    /// Apply every fixable issue. Non-fixable kinds are ignored.
    pub fn apply(&self, issues: &[Issue], catalog: &mut TranslationCatalog) -> FixOutcome {
        let mut outcome = FixOutcome::default();

        let mut by_file: BTreeMap<&Path, Vec<&Issue>> = BTreeMap::new();
        let mut keys: BTreeSet<&str> = BTreeSet::new();
        for issue in issues.iter().filter(|i| i.kind.is_fixable()) {
            if issue.kind == IssueKind::MissingTranslation {
                match issue.key.as_deref() {
                    Some(key) => {
                        keys.insert(key);
                    }
                    None => outcome.skipped += 1,
                }
            } else {
                by_file.entry(issue.file.as_path()).or_default().push(issue);
            }
        }

        let results: Vec<(&Path, FileFix)> = if self.parallel {
            by_file
                .par_iter()
                .map(|(path, group)| (*path, self.fix_file(path, group)))
                .collect()
        } else {
            by_file
                .iter()
                .map(|(path, group)| (*path, self.fix_file(path, group)))
                .collect()
        };

        for (path, result) in results {
            for category in result.applied {
                outcome.record(category);
            }
            outcome.skipped += result.skipped;
            if result.modified {
                outcome.files_modified += 1;
            }
            if let Some(err) = result.error {
                outcome.errors.push(format!("{}: {}", path.display(), err));
            }
            if let Some(diff) = result.diff {
                outcome.diffs.insert(path.to_path_buf(), diff);
            }
        }

        for key in keys {
            if catalog.has_translation(key) {
                outcome.skipped += 1;
                continue;
            }
            catalog.add_missing_key(key);
            if catalog.has_translation(key) {
                outcome.record(Category::I18n);
            } else {
                debug!("cannot add translation key {}", key);
                outcome.skipped += 1;
            }
        }

        if self.mode == FixMode::Write {
            if let Err(err) = catalog.save() {
                outcome.errors.push(err.to_string());
            }
        }

        info!(
            "applied {} fix(es) across {} file(s), {} skipped",
            outcome.fixed,
            outcome.files_modified,
            outcome.skipped
        );
        outcome
    }

    fn fix_file(&self, path: &Path, issues: &[&Issue]) -> FileFix {
        let mut result = FileFix::default();
        let mut unit = match SourceUnit::parse(path) {
            Ok(unit) => unit,
            Err(err) => {
                result.skipped = issues.len();
                result.error = Some(err.to_string());
                return result;
            }
        };
        let original = unit.full_text().to_string();

        let mut ordered = issues.to_vec();
        ordered.sort_by(|a, b| {
            let a_import = a.kind == IssueKind::MissingCenteredLayout;
            let b_import = b.kind == IssueKind::MissingCenteredLayout;
            a_import
                .cmp(&b_import)
                .then(b.line.cmp(&a.line))
                .then(b.column.cmp(&a.column))
        });

        for issue in ordered {
            let Some(edit) = self.plan(&unit, issue) else {
                debug!(
                    "{}:{}: target for {} not found, skipping",
                    path.display(),
                    issue.line,
                    issue.kind
                );
                result.skipped += 1;
                continue;
            };
            match unit.mutate(vec![edit]) {
                Ok(next) => {
                    unit = next;
                    result.applied.push(issue.category);
                }
                Err(err) => {
                    // the edited text no longer parses; drop every fix for this file
                    result.skipped = issues.len();
                    result.applied.clear();
                    result.error = Some(err.to_string());
                    return result;
                }
            }
        }

        if result.applied.is_empty() {
            return result;
        }

        match self.mode {
            FixMode::Write => match unit.save() {
                Ok(written) => result.modified = written,
                Err(err) => {
                    result.skipped += result.applied.len();
                    result.applied.clear();
                    result.error = Some(err.to_string());
                }
            },
            FixMode::DryRun => result.modified = true,
            FixMode::Diff => {
                result.modified = true;
                result.diff = Some(generate_unified_diff(path, &original, unit.full_text()));
            }
        }
        result
    }

    /// Locate the issue's target on the current unit and build its edit
    fn plan(&self, unit: &SourceUnit, issue: &Issue) -> Option<Edit> {
        match issue.kind {
            IssueKind::MissingAlt => {
                let el = find_element(unit, issue, |e| {
                    e.tag == "img" && e.has_attr("src") && !e.has_attr("alt")
                })?;
                Some(Edit::insert(el.name_end, " alt=\"\""))
            }
            IssueKind::MissingAriaLabel => {
                let el = find_element(unit, issue, |e| {
                    !e.has_attr("aria-label") && !e.has_attr("aria-labelledby")
                })?;
                Some(Edit::insert(
                    el.name_end,
                    format!(" aria-label=\"{}\"", escape_attr(&accessible_label(el))),
                ))
            }
            IssueKind::MissingRole => {
                let el = find_element(unit, issue, |e| {
                    e.tag == "div" && e.has_attr("onClick") && !e.has_attr("role")
                })?;
                Some(Edit::insert(el.name_end, " role=\"button\""))
            }
            IssueKind::ConflictingClasses => {
                let family = issue.fix.as_deref().and_then(ClassFamily::from_canonical)?;
                let attr = find_class_attr(unit, issue, |class| {
                    conflicting_families(class).iter().any(|(f, _)| *f == family)
                })?;
                rewrite_class(attr, |class| resolve_family(class, family))
            }
            IssueKind::IncorrectWidth => {
                let attr = find_class_attr(unit, issue, lacks_width_cap)?;
                rewrite_class(attr, add_width_cap)
            }
            IssueKind::MissingCenteredLayout => {
                let wrapped = unit
                    .imports()
                    .any(|i| self.accepted_wrappers.iter().any(|w| i.binds(w)));
                if wrapped {
                    return None;
                }
                let statement = format!(
                    "import {} from '{}';",
                    self.wrapper_component, self.wrapper_import
                );
                match unit.imports().last() {
                    Some(last) => {
                        let text = unit.full_text();
                        let eol = text[last.span.end..]
                            .find('\n')
                            .map_or(text.len(), |i| last.span.end + i);
                        Some(Edit::insert(eol, format!("\n{}", statement)))
                    }
                    None => Some(Edit::insert(0, format!("{}\n", statement))),
                }
            }
            _ => None,
        }
    }
}

fn find_element<'a, P>(unit: &'a SourceUnit, issue: &Issue, predicate: P) -> Option<&'a Element>
where
    P: Fn(&Element) -> bool,
{
    unit.elements().find(|e| {
        e.line == issue.line
            && issue.element.as_deref().map_or(true, |tag| e.tag == tag)
            && predicate(e)
    })
}

fn find_class_attr<'a, P>(unit: &'a SourceUnit, issue: &Issue, predicate: P) -> Option<&'a Attribute>
where
    P: Fn(&str) -> bool,
{
    unit.nodes().find_map(|node| match node {
        Node::Attribute(attr)
            if attr.line == issue.line
                && (attr.name == "className" || attr.name == "class")
                && issue.element.as_deref().map_or(true, |tag| attr.tag == tag)
                && attr.literal().is_some_and(&predicate) =>
        {
            Some(attr)
        }
        _ => None,
    })
}

/// Replace a static class string, keeping `{"..."}` wrapping intact
fn rewrite_class<F>(attr: &Attribute, rewrite: F) -> Option<Edit>
where
    F: Fn(&str) -> String,
{
    let span = attr.value_span?;
    let fixed = rewrite(attr.literal()?);
    let replacement = match &attr.value {
        AttrValue::Literal(_) => fixed,
        AttrValue::Expression(expr) => {
            let quote = expr.trim().chars().next()?;
            format!("{}{}{}", quote, fixed, quote)
        }
        AttrValue::None => return None,
    };
    Some(Edit::replace(span, replacement))
}

/// Label text from the element's own `name`, `placeholder` or `id`
fn accessible_label(el: &Element) -> String {
    ["name", "placeholder", "id"]
        .iter()
        .filter_map(|a| el.literal_attr(a))
        .find(|v| !v.trim().is_empty())
        .map(humanize_key)
        .unwrap_or_else(|| el.tag.clone())
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Render diffs from a [`FixOutcome`] for the console
pub fn format_diffs(outcome: &FixOutcome) -> String {
    let mut output = String::new();
    for (file, diff) in &outcome.diffs {
        output.push_str(&format!(
            "diff --complint a/{} b/{}\n",
            file.display(),
            file.display()
        ));
        output.push_str(diff);
        output.push('\n');
    }
    output
}

/// Single-hunk unified diff: the changed middle between the common prefix
/// and suffix, with context lines
pub fn generate_unified_diff(file: &Path, original: &str, modified: &str) -> String {
    let old: Vec<&str> = original.lines().collect();
    let new: Vec<&str> = modified.lines().collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut diff = format!("--- a/{}\n+++ b/{}\n", file.display(), file.display());
    if prefix == old.len() && prefix == new.len() {
        return diff;
    }

    let start = prefix.saturating_sub(DIFF_CONTEXT);
    let old_end = old.len() - suffix;
    let new_end = new.len() - suffix;
    let tail = (old.len() - old_end).min(DIFF_CONTEXT);

    let old_count = old_end + tail - start;
    let new_count = new_end + tail - start;
    diff.push_str(&format!(
        "@@ -{},{} +{},{} @@\n",
        start + 1,
        old_count,
        start + 1,
        new_count
    ));
    for line in &old[start..prefix] {
        diff.push_str(&format!(" {}\n", line));
    }
    for line in &old[prefix..old_end] {
        diff.push_str(&format!("-{}\n", line));
    }
    for line in &new[prefix..new_end] {
        diff.push_str(&format!("+{}\n", line));
    }
    for line in &old[old_end..old_end + tail] {
        diff.push_str(&format!(" {}\n", line));
    }
    diff
}
