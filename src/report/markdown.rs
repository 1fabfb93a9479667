//! Markdown report for pull request comments and wikis

use super::{location, Report, ReportError, ReportFormatter};
use crate::issue::{Category, Issue};
use std::fmt::Write;

pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &Report) -> Result<String, ReportError> {
        let summary = &report.summary;
        let mut out = String::new();

        // fmt::Write into a String cannot fail
        let _ = writeln!(out, "# 🔍 Compliance Report\n");
        let _ = writeln!(
            out,
            "**Generated:** {}\n",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let _ = writeln!(out, "## 📊 Summary\n");
        let _ = writeln!(out, "| Metric | Count |");
        let _ = writeln!(out, "|--------|-------|");
        let _ = writeln!(out, "| Total Issues | {} |", summary.total_issues);
        let _ = writeln!(out, "| Critical Issues | {} |", summary.critical_issues);
        let _ = writeln!(out, "| Fixed Issues | {} |\n", summary.fixed_issues);

        let _ = writeln!(out, "### By Category\n");
        let _ = writeln!(out, "| Category | Issues |");
        let _ = writeln!(out, "|----------|--------|");
        for category in Category::ALL {
            let _ = writeln!(
                out,
                "| {} {} | {} |",
                category.icon(),
                category.title(),
                summary.by_category.get(category)
            );
        }
        out.push('\n');

        let _ = writeln!(out, "## 📋 Recommendations\n");
        for rec in &report.recommendations {
            let _ = writeln!(out, "- {}", rec);
        }
        out.push('\n');

        for category in Category::ALL {
            write_section(&mut out, category, report.issues.get(category));
        }

        let _ = writeln!(out, "---\n*Report generated by complint v{}*", env!("CARGO_PKG_VERSION"));
        Ok(out)
    }
}

fn write_section(out: &mut String, category: Category, issues: &[Issue]) {
    if issues.is_empty() {
        let _ = writeln!(
            out,
            "## {} {} Issues\n\n✅ No issues found\n",
            category.icon(),
            category.title()
        );
        return;
    }

    let _ = writeln!(
        out,
        "## {} {} Issues ({})\n",
        category.icon(),
        category.title(),
        issues.len()
    );
    for (index, issue) in issues.iter().enumerate() {
        let _ = writeln!(out, "### {}. {}\n", index + 1, issue.message);
        let _ = writeln!(out, "**File:** `{}`\n", location(issue));
        if let Some(fix) = &issue.fix {
            let _ = writeln!(out, "**Fix:** {}\n", fix);
        }
        if let Some(grade) = issue.grade() {
            let _ = writeln!(out, "**Severity:** {}\n", grade);
        }
        let _ = writeln!(out, "---\n");
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_report;
    use super::*;
    use crate::issue::IssueBuckets;
    use std::collections::BTreeMap;

    #[test]
    fn test_markdown_tables() {
        let out = MarkdownFormatter.format(&sample_report()).unwrap();
        assert!(out.starts_with("# 🔍 Compliance Report"));
        assert!(out.contains("| Total Issues | 3 |"));
        assert!(out.contains("| Critical Issues | 1 |"));
        assert!(out.contains("| Fixed Issues | 2 |"));
        assert!(out.contains("| ♿ Accessibility | 1 |"));
        assert!(out.contains("- 🚨 CRITICAL: Address 1 critical security issues immediately"));
    }

    #[test]
    fn test_markdown_sections() {
        let out = MarkdownFormatter.format(&sample_report()).unwrap();
        assert!(out.contains("## ♿ Accessibility Issues (1)"));
        assert!(out.contains("### 1. Image missing alt attribute"));
        assert!(out.contains("**File:** `src/App.tsx:3:5`"));
        assert!(out.contains("**Fix:** Add alt=\"\""));
        assert!(out.contains("**Severity:** critical"));
        assert!(out.contains("## 🎨 Theme & Contrast Issues\n\n✅ No issues found"));
    }

    #[test]
    fn test_markdown_empty_report() {
        let report = super::super::build_report(IssueBuckets::new(), &BTreeMap::new());
        let out = MarkdownFormatter.format(&report).unwrap();
        assert_eq!(out.matches("✅ No issues found").count(), 6);
        assert!(out.contains("- ✅ Great job! No issues found"));
    }
}
