//! Accessibility checks over JSX elements

use super::{CheckContext, Checker};
use crate::issue::{Category, Issue, IssueKind};
use crate::source::{Element, SourceUnit};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const INTERACTIVE_TAGS: &[&str] = &["button", "input", "select", "textarea"];

/// Any of these gives an interactive element an accessible name
const NAME_ATTRIBUTES: &[&str] = &["aria-label", "aria-labelledby", "title"];

/// Shared application widgets that must always carry an `aria-label`
const UNIVERSAL_COMPONENTS: &[&str] = &[
    "ModuleTooltip",
    "HowToUsePanel",
    "ModuleDocumentUploader",
    "ModuleAIChat",
    "ModuleDiagnosticPanel",
];

static STATUS_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:text|bg|border)-(?:red|green|yellow|orange|amber|emerald|rose)-\d{2,3}\b")
        .unwrap()
});

static INLINE_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s*[^<>{}\s][^<>{}]*<").unwrap());

pub struct AccessibilityChecker;

impl Checker for AccessibilityChecker {
    fn category(&self) -> Category {
        Category::Accessibility
    }

    fn check(&self, unit: &SourceUnit, _ctx: &CheckContext<'_>) -> Vec<Issue> {
        let path = unit.path();
        let labelled_ids: HashSet<&str> = unit
            .elements()
            .filter(|e| e.tag == "label")
            .filter_map(|e| e.literal_attr("htmlFor").or_else(|| e.literal_attr("for")))
            .collect();

        let mut issues = Vec::new();
        let mut headings: Vec<(u8, &Element)> = Vec::new();

        for el in unit.elements() {
            let at = |kind: IssueKind, message: String| {
                Issue::new(path, el.line, kind, message)
                    .with_column(el.column)
                    .with_element(el.tag.as_str())
            };

            if el.tag == "img" && el.has_attr("src") && !el.has_attr("alt") {
                issues.push(
                    at(IssueKind::MissingAlt, "Image missing alt attribute".to_string()).with_fix(
                        "Add alt=\"\" for decorative images or alt=\"description\" for informative images",
                    ),
                );
            }

            if INTERACTIVE_TAGS.contains(&el.tag.as_str())
                && !NAME_ATTRIBUTES.iter().any(|a| el.has_attr(a))
            {
                let label_for = el.tag == "input"
                    && el
                        .literal_attr("id")
                        .is_some_and(|id| labelled_ids.contains(id));
                if !label_for {
                    issues.push(
                        at(
                            IssueKind::MissingAriaLabel,
                            format!("Interactive {} missing accessible name", el.tag),
                        )
                        .with_fix("Add aria-label or aria-labelledby, or associate a <label>"),
                    );
                }
            }

            if UNIVERSAL_COMPONENTS.contains(&el.tag.as_str()) && !el.has_attr("aria-label") {
                issues.push(
                    at(
                        IssueKind::MissingAriaLabel,
                        format!("Universal component {} missing aria-label", el.tag),
                    )
                    .with_fix(format!(
                        "Add aria-label={{t('{}.ariaLabel')}}",
                        el.tag.to_lowercase()
                    )),
                );
            }

            if el.tag == "div" && el.has_attr("onClick") && !el.has_attr("role") {
                issues.push(
                    at(
                        IssueKind::MissingRole,
                        "Interactive div missing role attribute".to_string(),
                    )
                    .with_fix("Add role=\"button\" and an onKeyDown handler, or use <button> instead"),
                );
            }

            if el.tag == "button" && el.is_inside("form") && !el.has_attr("type") {
                issues.push(
                    at(
                        IssueKind::MissingButtonType,
                        "Button inside form missing explicit type attribute".to_string(),
                    )
                    .with_fix("Add type=\"button\" or type=\"submit\""),
                );
            }

            if let Some(level) = el.heading_level() {
                headings.push((level, el));
            }
        }

        for pair in headings.windows(2) {
            let (prev, _) = pair[0];
            let (level, el) = pair[1];
            if level > prev + 1 {
                issues.push(
                    Issue::new(
                        path,
                        el.line,
                        IssueKind::InvalidHeadingOrder,
                        format!("Heading level jumps from h{} to h{}", prev, level),
                    )
                    .with_column(el.column)
                    .with_element(el.tag.as_str())
                    .with_fix(format!("Use h{} instead of h{}", prev + 1, level)),
                );
            }
        }

        for (n, line) in unit.lines() {
            if STATUS_COLOR.is_match(line)
                && INLINE_TEXT.is_match(line)
                && !line.to_lowercase().contains("icon")
                && !unit.is_comment_line(n)
            {
                issues.push(
                    Issue::new(
                        path,
                        n,
                        IssueKind::ColorOnlyInformation,
                        "Information may be conveyed by color alone",
                    )
                    .with_fix("Pair the color with an icon or text indicator"),
                );
            }
        }

        issues.sort_by_key(|i| i.line);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(text: &str) -> Vec<Issue> {
        Fixture::new().check(&AccessibilityChecker, "src/components/Card.tsx", text)
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_missing_alt() {
        let issues = check("export const A = () => <img src=\"a.png\" />;");
        assert_eq!(kinds(&issues), vec![IssueKind::MissingAlt]);
        assert_eq!(issues[0].element.as_deref(), Some("img"));

        let issues = check("export const A = () => <img src=\"a.png\" alt=\"Logo\" />;");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_img_without_src_ignored() {
        assert!(check("export const A = () => <img {...props} />;").is_empty());
    }

    #[test]
    fn test_interactive_needs_name() {
        let issues = check(
            "export const F = () => (\n  <div>\n    <button title=\"Close\">x</button>\n    <select></select>\n    <textarea aria-labelledby=\"lbl\" />\n  </div>\n);",
        );
        assert_eq!(kinds(&issues), vec![IssueKind::MissingAriaLabel]);
        assert_eq!(issues[0].line, 4);
        assert_eq!(issues[0].message, "Interactive select missing accessible name");
    }

    #[test]
    fn test_input_label_carve_out() {
        let text = "export const F = () => (\n  <form>\n    <label htmlFor=\"email\">Email</label>\n    <input id=\"email\" />\n    <input id=\"phone\" />\n  </form>\n);";
        let issues = check(text);
        let lines: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::MissingAriaLabel)
            .map(|i| i.line)
            .collect();
        assert_eq!(lines, vec![5]);
    }

    #[test]
    fn test_universal_component() {
        let issues = check("export const P = () => <ModuleAIChat mode=\"full\" />;");
        assert_eq!(kinds(&issues), vec![IssueKind::MissingAriaLabel]);
        assert_eq!(
            issues[0].fix.as_deref(),
            Some("Add aria-label={t('moduleaichat.ariaLabel')}")
        );
    }

    #[test]
    fn test_div_click_without_role() {
        let issues = check("export const A = () => <div onClick={go}>Go</div>;");
        assert_eq!(kinds(&issues), vec![IssueKind::MissingRole]);
        assert!(check("export const A = () => <div onClick={go} role=\"button\">Go</div>;").is_empty());
    }

    #[test]
    fn test_button_in_form_needs_type() {
        let text = "export const F = () => (\n  <form>\n    <button aria-label=\"Save\">Save</button>\n    <button type=\"button\" aria-label=\"Cancel\">Cancel</button>\n  </form>\n);";
        let issues = check(text);
        assert_eq!(kinds(&issues), vec![IssueKind::MissingButtonType]);
        assert_eq!(issues[0].line, 3);

        let outside = check("export const A = () => <button aria-label=\"x\">x</button>;");
        assert!(outside.is_empty());
    }

    #[test]
    fn test_heading_jump() {
        let text = "export const A = () => (\n  <div>\n    <h1>Title</h1>\n    <h3>Sub</h3>\n  </div>\n);";
        let issues = check(text);
        assert_eq!(kinds(&issues), vec![IssueKind::InvalidHeadingOrder]);
        assert_eq!(issues[0].line, 4);
        assert_eq!(issues[0].message, "Heading level jumps from h1 to h3");
        assert_eq!(issues[0].fix.as_deref(), Some("Use h2 instead of h3"));
    }

    #[test]
    fn test_heading_sequential_ok() {
        let text = "export const A = () => (\n  <div>\n    <h1>a</h1>\n    <h2>b</h2>\n    <h3>c</h3>\n    <h2>d</h2>\n  </div>\n);";
        assert!(check(text).is_empty());
    }

    #[test]
    fn test_color_only_information() {
        let text = "export const S = () => (\n  <div>\n    <span className=\"text-red-500\">Failed</span>\n    <span className=\"text-green-600\"><CheckIcon />Done</span>\n  </div>\n);";
        let issues = check(text);
        assert_eq!(kinds(&issues), vec![IssueKind::ColorOnlyInformation]);
        assert_eq!(issues[0].line, 3);
    }
}
