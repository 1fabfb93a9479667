//! Page layout checks: the layout wrapper import and `className` conflicts

use super::{CheckContext, Checker};
use crate::issue::{Category, Issue, IssueKind};
use crate::source::SourceUnit;

/// Width cap suggested for full-height containers
pub const DEFAULT_MAX_WIDTH: &str = "max-w-screen-xl";

/// Groups of mutually exclusive utility classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassFamily {
    TextAlign,
    FlexDirection,
    JustifyContent,
    AlignItems,
}

impl ClassFamily {
    pub const ALL: [ClassFamily; 4] = [
        ClassFamily::TextAlign,
        ClassFamily::FlexDirection,
        ClassFamily::JustifyContent,
        ClassFamily::AlignItems,
    ];

    pub fn matches(&self, token: &str) -> bool {
        match self {
            ClassFamily::TextAlign => {
                matches!(token, "text-left" | "text-right" | "text-center" | "text-justify")
            }
            ClassFamily::FlexDirection => matches!(
                token,
                "flex-row" | "flex-row-reverse" | "flex-col" | "flex-col-reverse"
            ),
            ClassFamily::JustifyContent => token.strip_prefix("justify-").is_some_and(|v| {
                matches!(
                    v,
                    "start" | "end" | "center" | "between" | "around" | "evenly" | "stretch" | "normal"
                )
            }),
            ClassFamily::AlignItems => token.strip_prefix("items-").is_some_and(|v| {
                matches!(v, "start" | "end" | "center" | "baseline" | "stretch")
            }),
        }
    }

    /// The centred variant every conflict resolves to
    pub fn canonical(&self) -> &'static str {
        match self {
            ClassFamily::TextAlign => "text-center",
            ClassFamily::FlexDirection => "flex-col",
            ClassFamily::JustifyContent => "justify-center",
            ClassFamily::AlignItems => "items-center",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClassFamily::TextAlign => "text alignment",
            ClassFamily::FlexDirection => "flex direction",
            ClassFamily::JustifyContent => "justify-content",
            ClassFamily::AlignItems => "align-items",
        }
    }

    pub fn from_canonical(canonical: &str) -> Option<ClassFamily> {
        Self::ALL.into_iter().find(|f| f.canonical() == canonical)
    }
}

/// Families with more than one token in a class string, with those tokens.
/// Variant-prefixed tokens (`md:text-left`) belong to other breakpoints and
/// are ignored.
pub fn conflicting_families(class: &str) -> Vec<(ClassFamily, Vec<&str>)> {
    ClassFamily::ALL
        .into_iter()
        .filter_map(|family| {
            let tokens: Vec<&str> = class
                .split_whitespace()
                .filter(|t| !t.contains(':') && family.matches(t))
                .collect();
            (tokens.len() > 1).then_some((family, tokens))
        })
        .collect()
}

/// Replace every token of `family` with its canonical class, kept once at
/// the position of the first family token
pub fn resolve_family(class: &str, family: ClassFamily) -> String {
    let mut placed = false;
    let mut out: Vec<&str> = Vec::new();
    for token in class.split_whitespace() {
        if !token.contains(':') && family.matches(token) {
            if !placed {
                out.push(family.canonical());
                placed = true;
            }
        } else {
            out.push(token);
        }
    }
    out.join(" ")
}

/// Full-viewport height without a max-width cap
pub fn lacks_width_cap(class: &str) -> bool {
    let tokens: Vec<&str> = class.split_whitespace().collect();
    tokens.iter().any(|t| *t == "h-screen" || *t == "min-h-screen")
        && !tokens.iter().any(|t| t.starts_with("max-w-"))
}

pub fn add_width_cap(class: &str) -> String {
    let trimmed = class.trim_end();
    if trimmed.is_empty() {
        DEFAULT_MAX_WIDTH.to_string()
    } else {
        format!("{} {}", trimmed, DEFAULT_MAX_WIDTH)
    }
}

pub struct LayoutChecker;

impl Checker for LayoutChecker {
    fn category(&self) -> Category {
        Category::Layout
    }

    fn applies_to(&self, unit: &SourceUnit, ctx: &CheckContext<'_>) -> bool {
        unit.language().is_script() && ctx.options.is_page(unit.path())
    }

    fn check(&self, unit: &SourceUnit, ctx: &CheckContext<'_>) -> Vec<Issue> {
        let path = unit.path();
        let options = ctx.options;
        let mut issues = Vec::new();

        let text = unit.full_text();
        let renders = text.contains("return") || text.contains("render(");
        let wrapped = unit
            .imports()
            .any(|i| options.layout_wrappers.iter().any(|w| i.binds(w)));
        if renders && !wrapped {
            issues.push(
                Issue::new(
                    path,
                    1,
                    IssueKind::MissingCenteredLayout,
                    format!("Page component does not use {}", options.wrapper_component),
                )
                .with_fix(format!(
                    "import {} from '{}';",
                    options.wrapper_component, options.wrapper_import
                )),
            );
        }

        for el in unit.elements() {
            let Some(attr) = el.class_attr() else {
                continue;
            };
            let Some(class) = attr.literal() else {
                continue;
            };

            for (family, tokens) in conflicting_families(class) {
                issues.push(
                    Issue::new(
                        path,
                        attr.line,
                        IssueKind::ConflictingClasses,
                        format!("Conflicting {} classes: {}", family.label(), tokens.join(", ")),
                    )
                    .with_column(attr.column)
                    .with_element(el.tag.as_str())
                    .with_fix(family.canonical()),
                );
            }

            if lacks_width_cap(class) {
                issues.push(
                    Issue::new(
                        path,
                        attr.line,
                        IssueKind::IncorrectWidth,
                        "Full-height container has no max-width constraint",
                    )
                    .with_column(attr.column)
                    .with_element(el.tag.as_str())
                    .with_fix(DEFAULT_MAX_WIDTH),
                );
            }
        }

        issues.sort_by_key(|i| i.line);
        issues
    }
}
