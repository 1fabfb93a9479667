//! Console summary printed at the end of every run

use super::Report;
use crate::issue::Category;
use colored::*;

const RULE_WIDTH: usize = 60;

/// Console summary with optional color support
pub struct TextFormatter {
    pub colored: bool,
    /// List every issue under its category, not just the counts
    pub show_issues: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_issues: false,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    pub fn with_issues(mut self, show: bool) -> Self {
        self.show_issues = show;
        self
    }

    fn paint(&self, text: String, style: fn(ColoredString) -> ColoredString) -> String {
        if self.colored {
            style(text.normal()).to_string()
        } else {
            text
        }
    }

    pub fn format(&self, report: &Report) -> String {
        let summary = &report.summary;
        let rule = "═".repeat(RULE_WIDTH);
        let mut out = String::new();

        out.push_str(&format!(
            "\n{}\n",
            self.paint("🔍 COMPLIANCE REPORT".to_string(), |s| s.blue().bold())
        ));
        out.push_str(&format!(
            "{}\n",
            self.paint(
                format!("Generated: {}", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
                |s| s.dimmed()
            )
        ));
        out.push_str(&rule);
        out.push('\n');

        out.push_str(&format!("\n{}\n", self.paint("📊 SUMMARY".to_string(), |s| s.bold())));
        out.push_str(&format!(
            "Total Issues: {}\n",
            self.paint(summary.total_issues.to_string(), |s| s.yellow())
        ));
        out.push_str(&format!(
            "Critical Issues: {}\n",
            self.paint(summary.critical_issues.to_string(), |s| s.red())
        ));
        out.push_str(&format!(
            "Auto-Fixed: {}\n",
            self.paint(summary.fixed_issues.to_string(), |s| s.green())
        ));

        out.push_str(&format!("\n{}\n", self.paint("📋 BY CATEGORY".to_string(), |s| s.bold())));
        for category in Category::ALL {
            let count = summary.by_category.get(category);
            let painted = if count > 0 {
                self.paint(count.to_string(), |s| s.yellow())
            } else {
                self.paint(count.to_string(), |s| s.green())
            };
            out.push_str(&format!("{} {}: {}\n", category.icon(), category, painted));

            if self.show_issues {
                for issue in report.issues.get(category) {
                    out.push_str(&format!(
                        "    {} {} {}\n",
                        self.paint(super::location(issue), |s| s.underline()),
                        self.paint(issue.kind.to_string(), |s| s.cyan()),
                        issue.message
                    ));
                }
            }
        }

        if !report.recommendations.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                self.paint("💡 RECOMMENDATIONS".to_string(), |s| s.bold())
            ));
            for rec in &report.recommendations {
                out.push_str(&format!("  {}\n", rec));
            }
        }

        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample_report;
    use super::*;

    #[test]
    fn test_text_summary_plain() {
        let out = TextFormatter::new().without_color().format(&sample_report());
        assert!(out.contains("Total Issues: 3"));
        assert!(out.contains("Critical Issues: 1"));
        assert!(out.contains("Auto-Fixed: 2"));
        assert!(out.contains("🔒 security: 1"));
        assert!(out.contains("🎨 theme: 0"));
        assert!(out.contains("💡 RECOMMENDATIONS"));
        assert!(!out.contains("src/App.tsx:3:5"));
    }

    #[test]
    fn test_text_lists_issues() {
        let out = TextFormatter::new()
            .without_color()
            .with_issues(true)
            .format(&sample_report());
        assert!(out.contains("    src/App.tsx:3:5 missing-alt Image missing alt attribute"));
    }
}
