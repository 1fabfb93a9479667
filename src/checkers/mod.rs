//! Checkers: one per category, each a pure function of a source unit and
//! the read-only run context

mod accessibility;
mod i18n;
mod layout;
mod performance;
mod security;
mod theme;

pub use accessibility::AccessibilityChecker;
pub use i18n::I18nChecker;
pub use layout::{
    add_width_cap, conflicting_families, lacks_width_cap, resolve_family, ClassFamily,
    LayoutChecker, DEFAULT_MAX_WIDTH,
};
pub use performance::{dependency_issues, PerformanceChecker};
pub use security::SecurityChecker;
pub use theme::{ThemeChecker, COLOR_CLASS_FIXES};

use crate::catalog::TranslationCatalog;
use crate::css_vars::CssVariableTable;
use crate::issue::{Category, Issue};
use crate::source::{SourceUnit, Suppressions};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Tunables shared by the checkers
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Files the layout checker treats as pages
    pub layout_pages: GlobSet,
    /// Components accepted as a page layout wrapper
    pub layout_wrappers: Vec<String>,
    /// Component and module inserted by the layout fix
    pub wrapper_component: String,
    pub wrapper_import: String,
    /// Unit size above which `large-bundle` is reported
    pub max_file_bytes: usize,
    /// Exported component declarations allowed per unit
    pub max_components: usize,
    /// Line count above which a `.tsx` unit is `large-component`
    pub max_component_lines: usize,
    /// Direct plus dev dependencies allowed in `package.json`
    pub max_dependencies: usize,
}

pub const DEFAULT_PAGE_GLOBS: &[&str] = &["**/pages/**"];
pub const DEFAULT_WRAPPERS: &[&str] = &["CenteredLayout", "PageTemplate", "LayoutShell"];
pub const DEFAULT_WRAPPER_IMPORT: &str = "@/components/layout/CenteredLayout";

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            layout_pages: build_globset(DEFAULT_PAGE_GLOBS).unwrap_or_else(|_| GlobSet::empty()),
            layout_wrappers: DEFAULT_WRAPPERS.iter().map(|s| s.to_string()).collect(),
            wrapper_component: "CenteredLayout".to_string(),
            wrapper_import: DEFAULT_WRAPPER_IMPORT.to_string(),
            max_file_bytes: 50_000,
            max_components: 3,
            max_component_lines: 200,
            max_dependencies: 100,
        }
    }
}

impl CheckOptions {
    pub fn is_page(&self, path: &Path) -> bool {
        self.layout_pages.is_match(path)
    }
}

pub fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    builder.build()
}

/// Read-only data available to every checker
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub catalog: &'a TranslationCatalog,
    pub css_vars: &'a CssVariableTable,
    pub options: &'a CheckOptions,
}

/// A category checker
pub trait Checker: Send + Sync {
    fn category(&self) -> Category;

    /// Whether this checker inspects the unit at all
    fn applies_to(&self, unit: &SourceUnit, _ctx: &CheckContext<'_>) -> bool {
        unit.language().is_script()
    }

    /// Issues for one unit, in ascending line order
    fn check(&self, unit: &SourceUnit, ctx: &CheckContext<'_>) -> Vec<Issue>;
}

/// Checkers for the given categories, in report order
pub fn checkers_for(categories: &[Category]) -> Vec<Box<dyn Checker>> {
    Category::ALL
        .into_iter()
        .filter(|c| categories.contains(c))
        .map(|c| -> Box<dyn Checker> {
            match c {
                Category::I18n => Box::new(I18nChecker),
                Category::Layout => Box::new(LayoutChecker),
                Category::Theme => Box::new(ThemeChecker),
                Category::Accessibility => Box::new(AccessibilityChecker),
                Category::Performance => Box::new(PerformanceChecker),
                Category::Security => Box::new(SecurityChecker),
            }
        })
        .collect()
}

pub fn all_checkers() -> Vec<Box<dyn Checker>> {
    checkers_for(&Category::ALL)
}

/// Run checkers sequentially over one unit and drop suppressed issues
pub fn check_unit(
    unit: &SourceUnit,
    ctx: &CheckContext<'_>,
    checkers: &[Box<dyn Checker>],
) -> Vec<Issue> {
    let suppressions = Suppressions::from_unit(unit);
    let mut issues = Vec::new();
    for checker in checkers {
        if !checker.applies_to(unit, ctx) {
            continue;
        }
        let mut found = checker.check(unit, ctx);
        found.sort_by_key(|i| i.line);
        issues.extend(suppressions.filter(found));
    }
    issues
}


#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use crate::issue::IssueKind;

    #[test]
    fn test_checkers_for_subset() {
        let checkers = checkers_for(&[Category::Security, Category::I18n]);
        let cats: Vec<_> = checkers.iter().map(|c| c.category()).collect();
        assert_eq!(cats, vec![Category::I18n, Category::Security]);
        assert_eq!(all_checkers().len(), 6);
    }

    #[test]
    fn test_default_pages_glob() {
        let options = CheckOptions::default();
        assert!(options.is_page(Path::new("src/pages/Home.tsx")));
        assert!(!options.is_page(Path::new("src/components/Button.tsx")));
    }

    #[test]
    fn test_check_unit_applies_suppressions() {
        let fixture = Fixture::new();
        let unit = SourceUnit::from_text(
            "src/App.tsx",
            "export const A = () => (\n  <div>\n    {/* complint-disable-next-line missing-alt */}\n    <img src=\"a.png\" />\n    <img src=\"b.png\" />\n  </div>\n);\n",
        )
        .unwrap();
        let issues = check_unit(&unit, &fixture.ctx(), &checkers_for(&[Category::Accessibility]));
        let alts: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::MissingAlt)
            .map(|i| i.line)
            .collect();
        assert_eq!(alts, vec![5]);
    }
}
