//! Bundle-size and render-cost heuristics

use super::{CheckContext, CheckOptions, Checker};
use crate::issue::{Category, Issue, IssueKind, Severity};
use crate::source::{Import, Node, SourceUnit};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Heavy libraries and how many bindings one import may pull from the
/// package root before it is reported. Zero means any root import.
const HEAVY_LIBRARIES: &[(&str, usize)] = &[
    ("lodash", 0),
    ("moment", 0),
    ("rxjs", 5),
    ("antd", 3),
    ("material-ui", 3),
    ("@material-ui/core", 3),
    ("@mui/material", 5),
    ("@mui/icons-material", 5),
];

/// Packages that bloat the bundle when they appear in `package.json` at all
const HEAVY_DEPENDENCIES: &[&str] = &["lodash", "moment", "rxjs", "antd", "material-ui"];

static EXPORTED_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(const|let|function|class)\s+([A-Z][\w$]*)").unwrap()
});

static INLINE_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=]+)?=>|^(?:async\s+)?function\b")
        .unwrap()
});

/// `props => ...`
static BARE_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:async\s+)?[A-Za-z_$][\w$]*\s*=>").unwrap());

static HANDLER_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^on[A-Z]").unwrap());

pub struct PerformanceChecker;

impl Checker for PerformanceChecker {
    fn category(&self) -> Category {
        Category::Performance
    }

    fn check(&self, unit: &SourceUnit, ctx: &CheckContext<'_>) -> Vec<Issue> {
        let path = unit.path();
        let text = unit.full_text();
        let options = ctx.options;
        let mut issues = Vec::new();

        for import in unit.imports() {
            if let Some(issue) = large_import(unit, import) {
                issues.push(issue);
            }
            for name in import.bindings() {
                if occurrences(text, name) <= 1 {
                    issues.push(
                        Issue::new(path, import.line, IssueKind::UnusedImport, format!("Unused import: {}", name))
                            .with_grade(Severity::Low)
                            .with_fix("Remove unused import to reduce bundle size"),
                    );
                }
            }
        }

        for node in unit.nodes() {
            let Node::Attribute(attr) = node else {
                continue;
            };
            let Some(expr) = attr.expression() else {
                continue;
            };
            if HANDLER_NAME.is_match(&attr.name) && INLINE_HANDLER.is_match(expr) {
                issues.push(
                    Issue::new(
                        path,
                        attr.line,
                        IssueKind::InlineFunction,
                        format!("Inline function in {} re-creates a handler on every render", attr.name),
                    )
                    .with_column(attr.column)
                    .with_element(attr.tag.as_str())
                    .with_grade(Severity::Low)
                    .with_fix("Use useCallback or move the function outside the component"),
                );
            } else if attr.name == "style" && expr.starts_with('{') {
                issues.push(
                    Issue::new(
                        path,
                        attr.line,
                        IssueKind::InlineStyle,
                        "Inline style object re-created on every render",
                    )
                    .with_column(attr.column)
                    .with_element(attr.tag.as_str())
                    .with_grade(Severity::Low)
                    .with_fix("Use utility classes or hoist the style object to a constant"),
                );
            }
        }

        for (name, offset) in unmemoized_components(text) {
            issues.push(
                Issue::new(
                    path,
                    unit.line_of(offset),
                    IssueKind::MissingMemo,
                    format!("Component {} could benefit from React.memo", name),
                )
                .with_grade(Severity::Low)
                .with_fix("Wrap with React.memo if props change infrequently"),
            );
        }

        if text.len() > options.max_file_bytes {
            issues.push(
                Issue::new(
                    path,
                    1,
                    IssueKind::LargeBundle,
                    format!(
                        "Large file: {} bytes exceeds the {} byte budget",
                        text.len(),
                        options.max_file_bytes
                    ),
                )
                .with_grade(Severity::Medium)
                .with_fix("Split into smaller modules or lazy-load heavy parts"),
            );
        }

        let lines = text.split('\n').count();
        let is_tsx = path.extension().is_some_and(|ext| ext == "tsx");
        if is_tsx && lines > options.max_component_lines {
            issues.push(
                Issue::new(
                    path,
                    1,
                    IssueKind::LargeComponent,
                    format!("Large component file: {} lines", lines),
                )
                .with_grade(Severity::Medium)
                .with_fix("Consider breaking into smaller components"),
            );
        }

        let components = EXPORTED_COMPONENT.captures_iter(text).count();
        if components > options.max_components {
            issues.push(
                Issue::new(
                    path,
                    1,
                    IssueKind::TooManyComponents,
                    format!("Multiple components in one file: {}", components),
                )
                .with_grade(Severity::Medium)
                .with_fix("Split into separate files for better maintainability"),
            );
        }

        issues.sort_by_key(|i| i.line);
        issues
    }
}

/// Project-level bundle findings from a parsed `package.json`: heavy
/// packages and an oversized dependency list. Issues point at line 1.
pub fn dependency_issues(manifest: &Path, package: &Value, options: &CheckOptions) -> Vec<Issue> {
    let mut names = BTreeSet::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = package.get(section).and_then(Value::as_object) {
            names.extend(deps.keys().map(String::as_str));
        }
    }

    let mut issues: Vec<Issue> = HEAVY_DEPENDENCIES
        .iter()
        .filter(|pkg| names.contains(*pkg))
        .map(|pkg| {
            Issue::new(
                manifest,
                1,
                IssueKind::LargeBundle,
                format!("Heavy dependency detected: {}", pkg),
            )
            .with_grade(Severity::Medium)
            .with_fix("Consider tree-shaking or lighter alternatives")
        })
        .collect();

    if names.len() > options.max_dependencies {
        issues.push(
            Issue::new(
                manifest,
                1,
                IssueKind::LargeBundle,
                format!("High dependency count: {} packages", names.len()),
            )
            .with_grade(Severity::Medium)
            .with_fix("Review and remove unused dependencies"),
        );
    }
    issues
}

fn large_import(unit: &SourceUnit, import: &Import) -> Option<Issue> {
    let (library, allowed) = HEAVY_LIBRARIES
        .iter()
        .find(|(lib, _)| *lib == import.source)?;
    if import.type_only {
        return None;
    }

    let message = if let Some(ns) = &import.namespace {
        format!("Whole-library import of {} as {}", library, ns)
    } else {
        let count = import.bindings().len();
        if count <= *allowed {
            return None;
        }
        format!("Large import from {}: {} binding(s)", library, count)
    };

    Some(
        Issue::new(unit.path(), import.line, IssueKind::LargeImport, message)
            .with_grade(Severity::High)
            .with_fix(format!(
                "Import specific modules (e.g. '{}/<name>') or use a lighter alternative",
                library
            )),
    )
}

/// Word-bounded occurrences of an identifier in the text
fn occurrences(text: &str, name: &str) -> usize {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    text.match_indices(name)
        .filter(|(at, _)| {
            let before = text[..*at].chars().next_back();
            let after = text[at + name.len()..].chars().next();
            !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
        })
        .count()
}

/// Exported uppercase function components that take parameters and are
/// not wrapped in `memo`. Returns (name, offset of the export).
fn unmemoized_components(text: &str) -> Vec<(String, usize)> {
    let mut found = Vec::new();
    for cap in EXPORTED_COMPONENT.captures_iter(text) {
        let (Some(whole), Some(kind), Some(name)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        let name = name.as_str();
        let tail = &text[whole.end()..];

        let has_params = match kind.as_str() {
            "function" => params_nonempty(tail),
            "class" => false,
            _ => {
                let Some(eq) = tail.find('=') else {
                    continue;
                };
                let init = tail[eq + 1..].trim_start();
                if init.starts_with("memo(")
                    || init.starts_with("React.memo(")
                    || init.starts_with("forwardRef(")
                    || init.starts_with("React.forwardRef(")
                {
                    continue;
                }
                if BARE_ARROW.is_match(init) {
                    true
                } else {
                    let is_function = init.starts_with('(')
                        || init.starts_with("async")
                        || init.starts_with("function");
                    is_function && params_nonempty(init)
                }
            }
        };
        if !has_params {
            continue;
        }

        let wrapped_later = text.contains(&format!("memo({})", name))
            || text.contains(&format!("memo( {} )", name));
        if !wrapped_later {
            found.push((name.to_string(), whole.start()));
        }
    }
    found
}

/// True when the first parenthesised list in `s` has content
fn params_nonempty(s: &str) -> bool {
    let Some(open) = s.find('(') else {
        return false;
    };
    let mut depth = 0usize;
    for (i, ch) in s[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return !s[open + 1..open + i].trim().is_empty();
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(text: &str) -> Vec<Issue> {
        Fixture::new().check(&PerformanceChecker, "src/components/List.tsx", text)
    }

    fn of_kind(issues: &[Issue], kind: IssueKind) -> Vec<&Issue> {
        issues.iter().filter(|i| i.kind == kind).collect()
    }

    #[test]
    fn test_occurrences() {
        assert_eq!(occurrences("import x from 'y';\nexport default 1;", "x"), 1);
        assert_eq!(occurrences("import { map } from 'a';\nmap(list);", "map"), 2);
        assert_eq!(occurrences("import Foo from 'f';\nconst FooBar = 1;", "Foo"), 1);
        assert_eq!(occurrences("a a a", "a"), 3);
    }

    #[test]
    fn test_unused_import() {
        let issues = check("import { useState, useEffect } from 'react';\nexport function List() { const [a] = useState(0); return a; }\n");
        let unused = of_kind(&issues, IssueKind::UnusedImport);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].message, "Unused import: useEffect");
        assert_eq!(unused[0].impact, Some(Severity::Low));
    }

    #[test]
    fn test_large_import() {
        let issues = check("import _ from 'lodash';\nimport debounce from 'lodash/debounce';\nimport * as Rx from 'rxjs';\nimport { Button } from 'antd';\n_.map(); debounce(); Rx.of(); Button;\n");
        let large = of_kind(&issues, IssueKind::LargeImport);
        let lines: Vec<_> = large.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 3]);
        assert_eq!(large[0].impact, Some(Severity::High));
    }

    #[test]
    fn test_inline_function_and_style() {
        let text = "export const A = () => (\n  <div>\n    <button onClick={() => go(1)} aria-label=\"go\">Go</button>\n    <button onClick={handleClick} aria-label=\"ok\">Ok</button>\n    <p style={{ color: 'red' }}>x</p>\n  </div>\n);";
        let issues = check(text);
        assert_eq!(of_kind(&issues, IssueKind::InlineFunction).len(), 1);
        assert_eq!(of_kind(&issues, IssueKind::InlineFunction)[0].line, 3);
        assert_eq!(of_kind(&issues, IssueKind::InlineStyle)[0].line, 5);
    }

    #[test]
    fn test_missing_memo() {
        let text = "export const Row = ({ item }: RowProps) => <li>{item}</li>;\nexport const Header = () => <h1>x</h1>;\nexport const Cell = memo(({ v }: CellProps) => <td>{v}</td>);\nexport function Footer(props: FooterProps) { return <p>{props.x}</p>; }\nexport const Item = ({ a }: P) => <i>{a}</i>;\nexport default memo(Item);\n";
        let issues = check(text);
        let names: Vec<_> = of_kind(&issues, IssueKind::MissingMemo)
            .iter()
            .map(|i| i.message.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "Component Row could benefit from React.memo".to_string(),
                "Component Footer could benefit from React.memo".to_string(),
            ]
        );
    }

    #[test]
    fn test_large_component_only_for_tsx() {
        let mut fixture = Fixture::new();
        fixture.options.max_component_lines = 5;
        let text = "export function page() {\n  const a = 1;\n  const b = 2;\n  const c = 3;\n  const d = 4;\n  return a + b + c + d;\n}\n";

        let issues = fixture.check(&PerformanceChecker, "src/Page.tsx", text);
        let large = of_kind(&issues, IssueKind::LargeComponent);
        assert_eq!(large.len(), 1);
        assert_eq!(large[0].line, 1);
        assert_eq!(large[0].message, "Large component file: 8 lines");
        assert_eq!(large[0].impact, Some(Severity::Medium));

        let issues = fixture.check(&PerformanceChecker, "src/page.ts", text);
        assert!(of_kind(&issues, IssueKind::LargeComponent).is_empty());

        fixture.options.max_component_lines = 8;
        let issues = fixture.check(&PerformanceChecker, "src/Page.tsx", text);
        assert!(of_kind(&issues, IssueKind::LargeComponent).is_empty());
    }

    #[test]
    fn test_dependency_issues() {
        let options = CheckOptions::default();
        let package = serde_json::json!({
            "dependencies": {"react": "^18.0.0", "lodash": "^4.17.21"},
            "devDependencies": {"moment": "^2.29.0", "vitest": "^1.0.0"}
        });
        let issues = dependency_issues(Path::new("package.json"), &package, &options);
        let messages: Vec<_> = issues.iter().map(|i| i.message.clone()).collect();
        assert_eq!(
            messages,
            vec![
                "Heavy dependency detected: lodash".to_string(),
                "Heavy dependency detected: moment".to_string(),
            ]
        );
        assert!(issues
            .iter()
            .all(|i| i.kind == IssueKind::LargeBundle && i.line == 1));
    }

    #[test]
    fn test_dependency_count_threshold() {
        let mut options = CheckOptions::default();
        options.max_dependencies = 2;
        let package = serde_json::json!({
            "dependencies": {"react": "1", "react-dom": "1"},
            "devDependencies": {"typescript": "5", "react": "1"}
        });
        let issues = dependency_issues(Path::new("package.json"), &package, &options);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "High dependency count: 3 packages");

        let none = dependency_issues(Path::new("package.json"), &serde_json::json!({}), &options);
        assert!(none.is_empty());
    }

    #[test]
    fn test_too_many_components_and_bundle() {
        let mut fixture = Fixture::new();
        fixture.options.max_file_bytes = 100;
        let text = "export const A = 1;\nexport const B = 2;\nexport const C = 3;\nexport function D() {}\n// padding padding padding padding padding padding padding\n";
        let issues = fixture.check(&PerformanceChecker, "src/x.tsx", text);
        assert_eq!(of_kind(&issues, IssueKind::TooManyComponents).len(), 1);
        assert_eq!(of_kind(&issues, IssueKind::LargeBundle).len(), 1);
        assert_eq!(
            of_kind(&issues, IssueKind::LargeBundle)[0].impact,
            Some(Severity::Medium)
        );
    }
}
