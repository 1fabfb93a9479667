//! Issue types shared by every checker, the fixer and the report

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Checker category an issue belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    I18n,
    Layout,
    Theme,
    Accessibility,
    Performance,
    Security,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Category; 6] = [
        Category::I18n,
        Category::Layout,
        Category::Theme,
        Category::Accessibility,
        Category::Performance,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::I18n => "i18n",
            Category::Layout => "layout",
            Category::Theme => "theme",
            Category::Accessibility => "accessibility",
            Category::Performance => "performance",
            Category::Security => "security",
        }
    }

    /// Human readable title used by the HTML/Markdown/text renderers
    pub fn title(&self) -> &'static str {
        match self {
            Category::I18n => "Internationalization",
            Category::Layout => "Layout",
            Category::Theme => "Theme & Contrast",
            Category::Accessibility => "Accessibility",
            Category::Performance => "Performance",
            Category::Security => "Security",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::I18n => "🌐",
            Category::Layout => "📐",
            Category::Theme => "🎨",
            Category::Accessibility => "♿",
            Category::Performance => "⚡",
            Category::Security => "🔒",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "i18n" | "internationalization" => Ok(Category::I18n),
            "layout" => Ok(Category::Layout),
            "theme" | "contrast" => Ok(Category::Theme),
            "accessibility" | "a11y" => Ok(Category::Accessibility),
            "performance" | "perf" => Ok(Category::Performance),
            "security" => Ok(Category::Security),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Closed taxonomy of issue kinds. Each kind belongs to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    // accessibility
    MissingAlt,
    MissingAriaLabel,
    MissingRole,
    MissingButtonType,
    InvalidHeadingOrder,
    ColorOnlyInformation,
    // i18n
    HardcodedString,
    MissingTranslation,
    MixedLanguage,
    // layout
    MissingCenteredLayout,
    ConflictingClasses,
    IncorrectWidth,
    // performance
    LargeImport,
    UnusedImport,
    InlineFunction,
    MissingMemo,
    LargeBundle,
    TooManyComponents,
    LargeComponent,
    InlineStyle,
    // security
    Vulnerability,
    UnsafeHtml,
    HardcodedSecret,
    UnsafeEval,
    XssRisk,
    // theme
    LowContrast,
    InvalidColor,
    HardcodedColorClass,
}

impl IssueKind {
    pub fn category(&self) -> Category {
        use IssueKind::*;
        match self {
            MissingAlt | MissingAriaLabel | MissingRole | MissingButtonType
            | InvalidHeadingOrder | ColorOnlyInformation => Category::Accessibility,
            HardcodedString | MissingTranslation | MixedLanguage => Category::I18n,
            MissingCenteredLayout | ConflictingClasses | IncorrectWidth => Category::Layout,
            LargeImport | UnusedImport | InlineFunction | MissingMemo | LargeBundle
            | TooManyComponents | LargeComponent | InlineStyle => Category::Performance,
            Vulnerability | UnsafeHtml | HardcodedSecret | UnsafeEval | XssRisk => {
                Category::Security
            }
            LowContrast | InvalidColor | HardcodedColorClass => Category::Theme,
        }
    }

    /// Kinds the fixer knows how to remediate in source
    pub fn is_fixable(&self) -> bool {
        matches!(
            self,
            IssueKind::MissingAlt
                | IssueKind::MissingAriaLabel
                | IssueKind::MissingRole
                | IssueKind::MissingTranslation
                | IssueKind::MissingCenteredLayout
                | IssueKind::ConflictingClasses
                | IssueKind::IncorrectWidth
        )
    }

    pub fn as_str(&self) -> &'static str {
        use IssueKind::*;
        match self {
            MissingAlt => "missing-alt",
            MissingAriaLabel => "missing-aria-label",
            MissingRole => "missing-role",
            MissingButtonType => "missing-button-type",
            InvalidHeadingOrder => "invalid-heading-order",
            ColorOnlyInformation => "color-only-information",
            HardcodedString => "hardcoded-string",
            MissingTranslation => "missing-translation",
            MixedLanguage => "mixed-language",
            MissingCenteredLayout => "missing-centered-layout",
            ConflictingClasses => "conflicting-classes",
            IncorrectWidth => "incorrect-width",
            LargeImport => "large-import",
            UnusedImport => "unused-import",
            InlineFunction => "inline-function",
            MissingMemo => "missing-memo",
            LargeBundle => "large-bundle",
            TooManyComponents => "too-many-components",
            LargeComponent => "large-component",
            InlineStyle => "inline-style",
            Vulnerability => "vulnerability",
            UnsafeHtml => "unsafe-html",
            HardcodedSecret => "hardcoded-secret",
            UnsafeEval => "unsafe-eval",
            XssRisk => "xss-risk",
            LowContrast => "low-contrast",
            InvalidColor => "invalid-color",
            HardcodedColorClass => "hardcoded-color-class",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_string()))
            .map_err(|_| format!("unknown issue kind '{}'", s))
    }
}

/// Grade carried by security issues (`severity`) and performance issues (`impact`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "low" => Ok(Severity::Low),
            "moderate" | "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(()),
        }
    }
}

/// Resolved colours behind a low-contrast finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastInfo {
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
}

/// A single finding produced by a checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column, when the checker knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<ContrastInfo>,
}

impl Issue {
    pub fn new(file: impl AsRef<Path>, line: usize, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            line,
            column: None,
            category: kind.category(),
            kind,
            message: message.into(),
            severity: None,
            impact: None,
            fix: None,
            element: None,
            key: None,
            contrast: None,
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Attach a grade. Security issues store it as `severity`, performance
    /// issues as `impact`; other categories carry none.
    pub fn with_grade(mut self, grade: Severity) -> Self {
        match self.category {
            Category::Security => self.severity = Some(grade),
            Category::Performance => self.impact = Some(grade),
            _ => {}
        }
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_contrast(mut self, contrast: ContrastInfo) -> Self {
        self.contrast = Some(contrast);
        self
    }

    /// Severity or impact, whichever this issue carries
    pub fn grade(&self) -> Option<Severity> {
        self.severity.or(self.impact)
    }

    /// Counts toward `criticalIssues` in the report summary
    pub fn is_critical(&self) -> bool {
        self.category == Category::Security
            && matches!(self.severity, Some(Severity::Critical | Severity::High))
    }
}

/// Per-category issue lists, in the shape of the report's `issues` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueBuckets {
    pub i18n: Vec<Issue>,
    pub layout: Vec<Issue>,
    pub theme: Vec<Issue>,
    pub accessibility: Vec<Issue>,
    pub performance: Vec<Issue>,
    pub security: Vec<Issue>,
}

impl IssueBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &[Issue] {
        match category {
            Category::I18n => &self.i18n,
            Category::Layout => &self.layout,
            Category::Theme => &self.theme,
            Category::Accessibility => &self.accessibility,
            Category::Performance => &self.performance,
            Category::Security => &self.security,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<Issue> {
        match category {
            Category::I18n => &mut self.i18n,
            Category::Layout => &mut self.layout,
            Category::Theme => &mut self.theme,
            Category::Accessibility => &mut self.accessibility,
            Category::Performance => &mut self.performance,
            Category::Security => &mut self.security,
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.get_mut(issue.category).push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        for issue in issues {
            self.push(issue);
        }
    }

    /// Merge another set of buckets into this one
    pub fn merge(&mut self, other: IssueBuckets) {
        self.extend(other.into_issues());
    }

    /// Sort each bucket by (file, line, column) so output is independent of scan order
    pub fn sort(&mut self) {
        for category in Category::ALL {
            self.get_mut(category)
                .sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
        }
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate all issues in category order
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        Category::ALL.into_iter().flat_map(move |c| self.get(c).iter())
    }

    pub fn into_issues(self) -> impl Iterator<Item = Issue> {
        self.i18n
            .into_iter()
            .chain(self.layout)
            .chain(self.theme)
            .chain(self.accessibility)
            .chain(self.performance)
            .chain(self.security)
    }

    pub fn count_kind(&self, kind: IssueKind) -> usize {
        self.get(kind.category()).iter().filter(|i| i.kind == kind).count()
    }
}
