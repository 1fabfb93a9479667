//! Internationalization checks: hard-coded English, missing catalog keys,
//! stray Arabic text

use super::{CheckContext, Checker};
use crate::issue::{Category, Issue, IssueKind};
use crate::source::{Node, SourceUnit};
use once_cell::sync::Lazy;
use regex::Regex;

static ENGLISH_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s.,!?]+$").unwrap());

static CSS_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?\d*\.?\d*(?:px|em|rem|vh|vw|vmin|vmax|pt|ch|ex|fr|deg|ms|s|%)$").unwrap()
});

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#?[0-9a-fA-F]{3,8}$").unwrap());

/// Upper-case constants such as `ADMIN_ROLE`
static CONSTANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z_]+$").unwrap());

/// Dotted identifiers such as translation keys or member paths
static DOTTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+(?:\.\w+)+$").unwrap());

static ARABIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{0600}-\x{06FF}\x{0750}-\x{077F}\x{08A0}-\x{08FF}\x{FB50}-\x{FDFF}\x{FE70}-\x{FEFF}]")
        .unwrap()
});

const LITERAL_KEYWORDS: &[&str] = &["true", "false", "null", "undefined"];

pub struct I18nChecker;

/// English-looking user text that should go through the translation layer
pub fn is_hardcoded_text(value: &str) -> bool {
    let text = value.trim();
    text.len() > 2
        && ENGLISH_TEXT.is_match(text)
        && !CSS_UNIT.is_match(text)
        && !HEX_COLOR.is_match(text)
        && !CONSTANT.is_match(text)
        && !DOTTED.is_match(text)
        && !LITERAL_KEYWORDS.contains(&text)
}

pub fn has_arabic(text: &str) -> bool {
    ARABIC.is_match(text)
}

impl Checker for I18nChecker {
    fn category(&self) -> Category {
        Category::I18n
    }

    fn check(&self, unit: &SourceUnit, ctx: &CheckContext<'_>) -> Vec<Issue> {
        let path = unit.path();
        let mut issues = Vec::new();

        for node in unit.nodes() {
            match node {
                Node::StringLiteral(lit) => {
                    if !lit.inside_call("t") && is_hardcoded_text(&lit.value) {
                        issues.push(hardcoded(path, lit.line, lit.column, &lit.value));
                    }
                }
                Node::Text(text) => {
                    if is_hardcoded_text(&text.value) {
                        issues.push(hardcoded(path, text.line, text.column, &text.value));
                    }
                }
                Node::Call(call) if call.name() == "t" && (call.callee == "t" || call.callee.ends_with(".t")) => {
                    let Some(key) = call.first_arg.as_deref() else {
                        continue;
                    };
                    let missing = ctx.catalog.missing_locales(key);
                    if !missing.is_empty() {
                        let locales: Vec<String> = missing.iter().map(|l| l.to_string()).collect();
                        issues.push(
                            Issue::new(
                                path,
                                call.line,
                                IssueKind::MissingTranslation,
                                format!(
                                    "Translation key \"{}\" missing in {}",
                                    key,
                                    locales.join(", ")
                                ),
                            )
                            .with_column(call.column)
                            .with_key(key)
                            .with_fix("Add the key to the en and ar translation catalogs"),
                        );
                    }
                }
                _ => {}
            }
        }

        for (n, line) in unit.lines() {
            if !has_arabic(line) || unit.is_comment_line(n) {
                continue;
            }
            let lower = line.to_lowercase();
            if line.contains("t(") || lower.contains("translation") || lower.contains("i18n") {
                continue;
            }
            issues.push(
                Issue::new(
                    path,
                    n,
                    IssueKind::MixedLanguage,
                    "Arabic text outside a translation context",
                )
                .with_fix("Move the text into the ar translation catalog and reference it with t()"),
            );
        }

        issues.sort_by_key(|i| i.line);
        issues
    }
}

fn hardcoded(path: &std::path::Path, line: usize, column: usize, value: &str) -> Issue {
    Issue::new(
        path,
        line,
        IssueKind::HardcodedString,
        format!("Hardcoded string \"{}\" should use a translation key", value.trim()),
    )
    .with_column(column)
    .with_fix("Replace with t('namespace.key') and add the key to both catalogs")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::catalog::TranslationCatalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn check(text: &str) -> Vec<Issue> {
        Fixture::new().check(&I18nChecker, "src/components/Hero.tsx", text)
    }

    #[test]
    fn test_is_hardcoded_text() {
        assert!(is_hardcoded_text("Save changes"));
        assert!(is_hardcoded_text("Hello, world!"));
        assert!(!is_hardcoded_text("ok"));
        assert!(!is_hardcoded_text("true"));
        assert!(!is_hardcoded_text("undefined"));
        assert!(!is_hardcoded_text("rem"));
        assert!(!is_hardcoded_text("fff"));
        assert!(!is_hardcoded_text("ADMIN_ROLE"));
        assert!(!is_hardcoded_text("home.title"));
        assert!(!is_hardcoded_text("12px"));
    }

    #[test]
    fn test_jsx_text_and_literals() {
        let text = "export const H = () => (\n  <div className=\"flex gap\">\n    <h1>Welcome back</h1>\n    <input placeholder=\"Enter your name\" />\n    <Badge variant=\"Please wait\" />\n    <p>{t('home.body')}</p>\n  </div>\n);";
        let issues = check(text);
        let found: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::HardcodedString)
            .map(|i| (i.line, i.message.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                (2, "Hardcoded string \"flex gap\" should use a translation key".to_string()),
                (3, "Hardcoded string \"Welcome back\" should use a translation key".to_string()),
                (4, "Hardcoded string \"Enter your name\" should use a translation key".to_string()),
                (5, "Hardcoded string \"Please wait\" should use a translation key".to_string()),
            ]
        );
    }

    #[test]
    fn test_only_translation_calls_escape() {
        let issues = check("const label = t('Save changes');
const other = i18n.t('Close the dialog');
console.log('Loading the data');
");
        let lines: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::HardcodedString)
            .map(|i| i.line)
            .collect();
        assert_eq!(lines, vec![3]);
    }

    #[test]
    fn test_missing_translation_requires_both_locales() {
        let mut fixture = Fixture::new();
        fixture.catalog = TranslationCatalog::from_values(
            json!({"home": {"title": "Home", "body": "Body"}}),
            json!({"home": {"title": "الرئيسية"}}),
        );
        let issues = fixture.check(
            &I18nChecker,
            "src/Home.tsx",
            "const a = t('home.title');\nconst b = t('home.body');\nconst c = i18n.t('nav.menu');\n",
        );
        let missing: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::MissingTranslation)
            .map(|i| (i.line, i.key.clone().unwrap()))
            .collect();
        assert_eq!(
            missing,
            vec![(2, "home.body".to_string()), (3, "nav.menu".to_string())]
        );
        assert_eq!(issues[0].message, "Translation key \"home.body\" missing in ar");
    }

    #[test]
    fn test_mixed_language() {
        let text = "const a = 'مرحبا';\nconst b = t('greeting'); // مرحبا\n// تعليق\n";
        let issues = check(text);
        let lines: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::MixedLanguage)
            .map(|i| i.line)
            .collect();
        assert_eq!(lines, vec![1]);
    }
}
