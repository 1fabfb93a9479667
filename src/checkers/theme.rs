//! Theme compliance: contrast of declared colour pairs, literal colours in
//! declarations, and non-semantic Tailwind colour utilities

use super::{CheckContext, Checker};
use crate::color::{self, MIN_CONTRAST};
use crate::issue::{Category, ContrastInfo, Issue, IssueKind};
use crate::source::SourceUnit;
use once_cell::sync::Lazy;
use regex::Regex;

/// Non-semantic utility → semantic utility. A trailing `*` stands for a
/// numeric shade (`gray-500`). Opacity (`/50`) and variant prefixes
/// (`hover:`) carry over to the replacement.
pub const COLOR_CLASS_FIXES: &[(&str, &str)] = &[
    ("text-white", "text-primary-foreground"),
    ("bg-white", "bg-background"),
    ("text-black", "text-foreground"),
    ("bg-black", "bg-foreground"),
    ("text-gray-*", "text-muted-foreground"),
    ("bg-gray-*", "bg-muted"),
    ("border-gray-*", "border-border"),
];

/// One colour value: a function with at most one level of nested parens,
/// a hex literal, or a keyword
const COLOR_VALUE: &str = r"((?:[a-zA-Z-]+\((?:[^()]|\([^()]*\))*\))|#[0-9a-fA-F]{3,8}\b|[a-zA-Z]+)";

static FOREGROUND_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"(?:^|[^\w-])color\s*:\s*['"]?{}"#, COLOR_VALUE)).unwrap()
});

static BACKGROUND_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?:^|[^\w-])(?:background-color|backgroundColor|background)\s*:\s*['"]?{}"#,
        COLOR_VALUE
    ))
    .unwrap()
});

static COLOR_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?:^|[^\w-])(color|background-color|backgroundColor|background|border-color|borderColor|border|fill|stroke)\s*:\s*['"]?{}"#,
        COLOR_VALUE
    ))
    .unwrap()
});

/// The semantic replacement for a utility class, keeping variant prefixes
/// and opacity modifiers. `None` when the class is already semantic.
pub fn semantic_class(token: &str) -> Option<String> {
    let (variants, base) = match token.rfind(':') {
        Some(i) => token.split_at(i + 1),
        None => ("", token),
    };
    let (name, opacity) = match base.split_once('/') {
        Some((name, opacity)) if !opacity.is_empty() && opacity.bytes().all(|b| b.is_ascii_digit()) => {
            (name, Some(opacity))
        }
        Some(_) => return None,
        None => (base, None),
    };

    let replacement = COLOR_CLASS_FIXES.iter().find_map(|(pattern, semantic)| {
        let matched = match pattern.strip_suffix('*') {
            Some(prefix) => name
                .strip_prefix(prefix)
                .is_some_and(|shade| !shade.is_empty() && shade.bytes().all(|b| b.is_ascii_digit())),
            None => name == *pattern,
        };
        matched.then_some(*semantic)
    })?;

    Some(match opacity {
        Some(o) => format!("{}{}/{}", variants, replacement, o),
        None => format!("{}{}", variants, replacement),
    })
}

fn token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '/' | '_')
}

/// Semantic token suggested for a literal in the given property
fn semantic_token(property: &str) -> &'static str {
    match property {
        "color" => "hsl(var(--foreground))",
        "border" | "border-color" | "borderColor" => "hsl(var(--border))",
        "fill" | "stroke" => "currentColor",
        _ => "hsl(var(--background))",
    }
}

pub struct ThemeChecker;

impl Checker for ThemeChecker {
    fn category(&self) -> Category {
        Category::Theme
    }

    fn applies_to(&self, _unit: &SourceUnit, _ctx: &CheckContext<'_>) -> bool {
        true
    }

    fn check(&self, unit: &SourceUnit, ctx: &CheckContext<'_>) -> Vec<Issue> {
        let path = unit.path();
        let mut issues = Vec::new();

        for (n, line) in unit.lines() {
            if unit.is_comment_line(n) {
                continue;
            }

            let foreground = FOREGROUND_DECL.captures(line).map(|c| c[1].to_string());
            let background = BACKGROUND_DECL.captures(line).map(|c| c[1].to_string());
            if let (Some(fg), Some(bg)) = (foreground, background) {
                let resolved = (ctx.css_vars.resolve_color(&fg), ctx.css_vars.resolve_color(&bg));
                if let (Some(fg), Some(bg)) = resolved {
                    let ratio = color::contrast_ratio(fg, bg);
                    if ratio < MIN_CONTRAST {
                        issues.push(
                            Issue::new(
                                path,
                                n,
                                IssueKind::LowContrast,
                                format!(
                                    "Contrast ratio {:.2}:1 is below the {}:1 minimum",
                                    ratio, MIN_CONTRAST
                                ),
                            )
                            .with_fix("Use foreground/background token pairs with sufficient contrast")
                            .with_contrast(ContrastInfo {
                                foreground: fg.to_hex(),
                                background: bg.to_hex(),
                                ratio: (ratio * 100.0).round() / 100.0,
                            }),
                        );
                    }
                }
            }

            for cap in COLOR_DECL.captures_iter(line) {
                let value = &cap[2];
                if !color::is_color_literal(value) {
                    continue;
                }
                let column = cap.get(2).map_or(1, |m| m.start() + 1);
                issues.push(
                    Issue::new(
                        path,
                        n,
                        IssueKind::InvalidColor,
                        format!("Hard-coded color {} in {}", value, &cap[1]),
                    )
                    .with_column(column)
                    .with_fix(semantic_token(&cap[1])),
                );
            }

            let Some(line_start) = unit.line_start(n) else {
                continue;
            };
            let mut rest = line.char_indices().peekable();
            while let Some((start, c)) = rest.next() {
                if !token_char(c) {
                    continue;
                }
                let mut end = start + c.len_utf8();
                while let Some(&(i, c)) = rest.peek() {
                    if !token_char(c) {
                        break;
                    }
                    end = i + c.len_utf8();
                    rest.next();
                }
                let token = &line[start..end];
                let Some(fix) = semantic_class(token) else {
                    continue;
                };
                if unit.in_comment(line_start + start) {
                    continue;
                }
                issues.push(
                    Issue::new(
                        path,
                        n,
                        IssueKind::HardcodedColorClass,
                        format!("Non-semantic color class {}", token),
                    )
                    .with_column(start + 1)
                    .with_fix(fix),
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

    fn of_kind(issues: &[Issue], kind: IssueKind) -> Vec<&Issue> {
        issues.iter().filter(|i| i.kind == kind).collect()
    }

    #[test]
    fn test_semantic_class() {
        assert_eq!(semantic_class("bg-white").as_deref(), Some("bg-background"));
        assert_eq!(semantic_class("text-gray-500").as_deref(), Some("text-muted-foreground"));
        assert_eq!(
            semantic_class("hover:bg-black/50").as_deref(),
            Some("hover:bg-foreground/50")
        );
        assert_eq!(semantic_class("bg-white-smoke"), None);
        assert_eq!(semantic_class("text-gray-"), None);
        assert_eq!(semantic_class("text-foreground"), None);
    }

    #[test]
    fn test_low_contrast_literals() {
        let fixture = Fixture::new();
        let issues = fixture.check(
            &ThemeChecker,
            "src/styles/card.css",
            ".card { color: #777777; background-color: #ffffff; }\n.ok { color: #000; background: #fff; }\n",
        );
        let low = of_kind(&issues, IssueKind::LowContrast);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].line, 1);
        let contrast = low[0].contrast.as_ref().unwrap();
        assert_eq!(contrast.foreground, "#777777");
        assert_eq!(contrast.background, "#ffffff");
        assert!(contrast.ratio < 4.5 && contrast.ratio > 4.4);
        assert_eq!(of_kind(&issues, IssueKind::InvalidColor).len(), 4);
    }

    #[test]
    fn test_low_contrast_between_two_grays() {
        let issues = Fixture::new().check(
            &ThemeChecker,
            "src/styles/muted.css",
            ".muted { color: #777777; background-color: #888888; }\n.swapped { color: #888888; background: #777777; }\n",
        );
        let low = of_kind(&issues, IssueKind::LowContrast);
        assert_eq!(low.len(), 2);

        let first = low[0].contrast.as_ref().unwrap();
        let second = low[1].contrast.as_ref().unwrap();
        assert_eq!((low[0].line, low[1].line), (1, 2));
        assert_eq!(first.foreground, "#777777");
        assert_eq!(first.background, "#888888");
        assert_eq!(second.foreground, "#888888");
        assert_eq!(second.background, "#777777");
        assert!(first.ratio > 1.2 && first.ratio < 1.5);
        assert!((first.ratio - second.ratio).abs() < 1e-9);
    }

    #[test]
    fn test_low_contrast_through_variables() {
        let mut fixture = Fixture::new();
        fixture
            .css_vars
            .add_stylesheet(":root { --fg: 0 0% 98%; --bg: 0 0% 100%; --ink: 222 47% 11%; }");
        let issues = fixture.check(
            &ThemeChecker,
            "src/styles/theme.css",
            ".a { color: hsl(var(--fg)); background: hsl(var(--bg)); }\n.b { color: hsl(var(--ink)); background: hsl(var(--bg)); }\n.c { color: hsl(var(--nope)); background: hsl(var(--bg)); }\n",
        );
        let lines: Vec<_> = issues.iter().map(|i| (i.kind, i.line)).collect();
        assert_eq!(lines, vec![(IssueKind::LowContrast, 1)]);
    }

    #[test]
    fn test_custom_property_definitions_allowed() {
        let issues = Fixture::new().check(
            &ThemeChecker,
            "src/index.css",
            ":root {\n  --brand-color: #ff0000;\n  --background: #ffffff;\n}\n",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_inline_style_object() {
        let issues = Fixture::new().check(
            &ThemeChecker,
            "src/components/Badge.tsx",
            "export const B = () => <span style={{ color: '#999', backgroundColor: 'white' }}>x</span>;\n",
        );
        assert_eq!(of_kind(&issues, IssueKind::LowContrast).len(), 1);
        let invalid = of_kind(&issues, IssueKind::InvalidColor);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].fix.as_deref(), Some("hsl(var(--foreground))"));
    }

    #[test]
    fn test_hardcoded_color_classes() {
        let text = "export const C = () => (\n  // text-white in a comment\n  <div className=\"bg-white text-gray-500 hover:bg-black/50 bg-white-smoke p-4\">x</div>\n);\n";
        let issues = Fixture::new().check(&ThemeChecker, "src/components/Card.tsx", text);
        let found: Vec<_> = issues
            .iter()
            .map(|i| (i.line, i.fix.clone().unwrap()))
            .collect();
        assert_eq!(
            found,
            vec![
                (3, "bg-background".to_string()),
                (3, "text-muted-foreground".to_string()),
                (3, "hover:bg-foreground/50".to_string()),
            ]
        );
    }
}
