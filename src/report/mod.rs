//! Compliance report: aggregation of every checker's issues, recommendations
//! and the JSON/HTML/Markdown/console renderers

mod html;
mod json;
mod markdown;
mod text;

pub use html::HtmlFormatter;
pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

use crate::issue::{Category, IssueBuckets, IssueKind, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base name of written report files
pub const REPORT_FILE_STEM: &str = "compliance-report";

pub const NO_ISSUES: &str = "✅ Great job! No issues found";
pub const FOLLOW_UP_FIX: &str = "📋 Run with --fix to auto-fix simple issues";
pub const FOLLOW_UP_RERUN: &str = "🔄 Re-run after fixes to track progress";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown report format '{0}' (expected json, html or markdown)")]
    UnknownFormat(String),
}

/// Issue counts per category, in the report's `byCategory` shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub i18n: usize,
    pub layout: usize,
    pub theme: usize,
    pub accessibility: usize,
    pub performance: usize,
    pub security: usize,
}

impl CategoryCounts {
    fn from_buckets(buckets: &IssueBuckets) -> Self {
        Self {
            i18n: buckets.i18n.len(),
            layout: buckets.layout.len(),
            theme: buckets.theme.len(),
            accessibility: buckets.accessibility.len(),
            performance: buckets.performance.len(),
            security: buckets.security.len(),
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::I18n => self.i18n,
            Category::Layout => self.layout,
            Category::Theme => self.theme,
            Category::Accessibility => self.accessibility,
            Category::Performance => self.performance,
            Category::Security => self.security,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_issues: usize,
    /// Security issues graded critical or high
    pub critical_issues: usize,
    pub fixed_issues: usize,
    pub by_category: CategoryCounts,
}

/// The full compliance report. Built once by [`build_report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub summary: Summary,
    pub issues: IssueBuckets,
    pub recommendations: Vec<String>,
}

/// Aggregate buckets and per-category fix counts into a report stamped now
pub fn build_report(buckets: IssueBuckets, fixed_counts: &BTreeMap<Category, usize>) -> Report {
    build_report_at(buckets, fixed_counts, Utc::now())
}

pub fn build_report_at(
    buckets: IssueBuckets,
    fixed_counts: &BTreeMap<Category, usize>,
    timestamp: DateTime<Utc>,
) -> Report {
    let summary = Summary {
        total_issues: buckets.len(),
        critical_issues: buckets.security.iter().filter(|i| i.is_critical()).count(),
        fixed_issues: fixed_counts.values().sum(),
        by_category: CategoryCounts::from_buckets(&buckets),
    };
    let recommendations = recommendations(&buckets);
    Report {
        timestamp,
        summary,
        issues: buckets,
        recommendations,
    }
}

/// Prioritised advice, most urgent first
pub fn recommendations(buckets: &IssueBuckets) -> Vec<String> {
    let critical_security = buckets
        .security
        .iter()
        .filter(|i| i.severity == Some(Severity::Critical))
        .count();

    let candidates = [
        (
            critical_security,
            format!("🚨 CRITICAL: Address {} critical security issues immediately", critical_security),
        ),
        {
            let n = buckets.count_kind(IssueKind::HardcodedString);
            (n, format!("🌐 Replace {} hardcoded strings with translation keys", n))
        },
        {
            let n = buckets.count_kind(IssueKind::MissingCenteredLayout);
            (n, format!("📐 Implement CenteredLayout in {} page components", n))
        },
        {
            let n = buckets.count_kind(IssueKind::LowContrast);
            (n, format!("🎨 Fix {} color contrast issues for accessibility", n))
        },
        {
            let n = buckets.count_kind(IssueKind::MissingAlt);
            (n, format!("♿ Add alt text to {} images for screen readers", n))
        },
        {
            let n = buckets.count_kind(IssueKind::LargeImport);
            (n, format!("⚡ Optimize {} large imports to reduce bundle size", n))
        },
    ];

    let mut recommendations: Vec<String> = candidates
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(_, text)| text)
        .collect();

    if recommendations.is_empty() {
        recommendations.push(NO_ISSUES.to_string());
    } else {
        recommendations.push(FOLLOW_UP_FIX.to_string());
        recommendations.push(FOLLOW_UP_RERUN.to_string());
    }
    recommendations
}

/// Renders a report to one output format
pub trait ReportFormatter: Send + Sync {
    fn format(&self, report: &Report) -> Result<String, ReportError>;
}

/// File formats a report can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Html,
    Markdown,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Json, ReportFormat::Html, ReportFormat::Markdown];

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }

    pub fn formatter(&self) -> Box<dyn ReportFormatter> {
        match self {
            ReportFormat::Json => Box::new(JsonFormatter),
            ReportFormat::Html => Box::new(HtmlFormatter::default()),
            ReportFormat::Markdown => Box::new(MarkdownFormatter),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Html => write!(f, "html"),
            ReportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Write `report` as `<dir>/compliance-report.<ext>`, creating `dir`
pub fn write_report(report: &Report, format: ReportFormat, dir: &Path) -> Result<PathBuf, ReportError> {
    let path = dir.join(format!("{}.{}", REPORT_FILE_STEM, format.extension()));
    let content = format.formatter().format(report)?;
    let io_err = |source: std::io::Error| ReportError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(&path, content).map_err(io_err)?;
    Ok(path)
}

/// `file:line` or `file:line:column`
pub(crate) fn location(issue: &crate::issue::Issue) -> String {
    match issue.column {
        Some(col) => format!("{}:{}:{}", issue.file.display(), issue.line, col),
        None => format!("{}:{}", issue.file.display(), issue.line),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Issue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_report() {
        let report = build_report(IssueBuckets::new(), &BTreeMap::new());
        assert_eq!(report.summary.total_issues, 0);
        assert_eq!(report.summary.critical_issues, 0);
        assert_eq!(report.summary.fixed_issues, 0);
        assert_eq!(report.summary.by_category, CategoryCounts::default());
        assert_eq!(report.recommendations, vec![NO_ISSUES.to_string()]);
        assert!(report.recommendations[0].contains("No issues found"));
    }

    #[test]
    fn test_summary_counts() {
        let report = test_support::sample_report();
        assert_eq!(report.summary.total_issues, 3);
        assert_eq!(report.summary.critical_issues, 1);
        assert_eq!(report.summary.fixed_issues, 2);
        assert_eq!(report.summary.by_category.get(Category::Security), 1);
        assert_eq!(report.summary.by_category.get(Category::Theme), 0);
    }

    #[test]
    fn test_critical_counts_high_and_critical_security() {
        let mut buckets = IssueBuckets::new();
        for severity in [Severity::Low, Severity::Medium, Severity::High, Severity::Critical] {
            buckets.push(
                Issue::new("a.ts", 1, IssueKind::HardcodedSecret, "secret").with_grade(severity),
            );
        }
        buckets.push(Issue::new("a.ts", 2, IssueKind::LargeImport, "x").with_grade(Severity::Critical));
        let report = build_report(buckets, &BTreeMap::new());
        assert_eq!(report.summary.critical_issues, 2);
    }

    #[test]
    fn test_recommendation_order() {
        let report = test_support::sample_report();
        assert_eq!(
            report.recommendations,
            vec![
                "🚨 CRITICAL: Address 1 critical security issues immediately".to_string(),
                "♿ Add alt text to 1 images for screen readers".to_string(),
                "⚡ Optimize 1 large imports to reduce bundle size".to_string(),
                FOLLOW_UP_FIX.to_string(),
                FOLLOW_UP_RERUN.to_string(),
            ]
        );
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("HTML".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert!("pdf".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_write_report_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let report = test_support::sample_report();
        for format in ReportFormat::ALL {
            let path = write_report(&report, format, &out).unwrap();
            assert!(path.exists());
        }
        assert!(out.join("compliance-report.md").exists());
    }
}
