//! Standalone HTML report with inline styling

use super::{location, Report, ReportError, ReportFormatter};
use crate::issue::{Category, Issue, Severity};

pub struct HtmlFormatter {
    title: String,
}

impl HtmlFormatter {
    pub fn new() -> Self {
        Self {
            title: "Compliance Report".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HtmlFormatter {
    fn format(&self, report: &Report) -> Result<String, ReportError> {
        let summary = &report.summary;

        let category_cards: String = Category::ALL
            .iter()
            .map(|c| {
                format!(
                    r#"<div class="stat-card"><span class="stat-value">{count}</span><span class="stat-label">{icon} {title}</span></div>"#,
                    count = summary.by_category.get(*c),
                    icon = c.icon(),
                    title = html_escape(c.title()),
                )
            })
            .collect::<Vec<_>>()
            .join("\n            ");

        let recommendations: String = report
            .recommendations
            .iter()
            .map(|r| format!("<li>{}</li>", html_escape(r)))
            .collect::<Vec<_>>()
            .join("\n            ");

        let sections: String = Category::ALL
            .iter()
            .map(|c| format_section(*c, report.issues.get(*c)))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <p class="timestamp">Generated: {timestamp}</p>
    </header>

    <section class="summary">
        <h2>Summary</h2>
        <div class="stats-grid">
            <div class="stat-card"><span class="stat-value">{total}</span><span class="stat-label">Total Issues</span></div>
            <div class="stat-card critical"><span class="stat-value">{critical}</span><span class="stat-label">Critical Issues</span></div>
            <div class="stat-card fixed"><span class="stat-value">{fixed}</span><span class="stat-label">Fixed Issues</span></div>
        </div>
        <h3>By Category</h3>
        <div class="stats-grid">
            {category_cards}
        </div>
    </section>

    <section class="recommendations">
        <h2>Recommendations</h2>
        <ul>
            {recommendations}
        </ul>
    </section>

{sections}

    <footer>
        <p>Generated by complint v{version}</p>
    </footer>
</body>
</html>"#,
            title = html_escape(&self.title),
            css = CSS,
            timestamp = report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            total = summary.total_issues,
            critical = summary.critical_issues,
            fixed = summary.fixed_issues,
            category_cards = category_cards,
            recommendations = recommendations,
            sections = sections,
            version = env!("CARGO_PKG_VERSION"),
        ))
    }
}

fn format_section(category: Category, issues: &[Issue]) -> String {
    let body = if issues.is_empty() {
        r#"<p class="empty">No issues found</p>"#.to_string()
    } else {
        issues.iter().map(format_issue).collect::<Vec<_>>().join("\n        ")
    };

    format!(
        r#"    <section class="category {id}">
        <h2>{icon} {title} ({count})</h2>
        {body}
    </section>"#,
        id = category.as_str(),
        icon = category.icon(),
        title = html_escape(category.title()),
        count = issues.len(),
        body = body,
    )
}

fn format_issue(issue: &Issue) -> String {
    let grade = issue
        .grade()
        .map(|g| {
            format!(
                r#" <span class="badge {class}">{g}</span>"#,
                class = grade_class(g),
                g = g,
            )
        })
        .unwrap_or_default();

    let fix = issue
        .fix
        .as_ref()
        .map(|f| format!(r#"<div class="fix">Fix: <code>{}</code></div>"#, html_escape(f)))
        .unwrap_or_default();

    let contrast = issue
        .contrast
        .as_ref()
        .map(|c| {
            format!(
                r#"<div class="contrast"><span class="swatch" style="background: {fg};"></span>{fg} on <span class="swatch" style="background: {bg};"></span>{bg} ({ratio:.2}:1)</div>"#,
                fg = html_escape(&c.foreground),
                bg = html_escape(&c.background),
                ratio = c.ratio,
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="issue"><div class="message"><span class="kind">{kind}</span> {message}{grade}</div><div class="file">{location}</div>{contrast}{fix}</div>"#,
        kind = issue.kind,
        message = html_escape(&issue.message),
        grade = grade,
        location = html_escape(&location(issue)),
        contrast = contrast,
        fix = fix,
    )
}

fn grade_class(grade: Severity) -> &'static str {
    match grade {
        Severity::Critical => "critical",
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS: &str = r#"
:root {
    --color-critical: #d32f2f;
    --color-high: #f44336;
    --color-medium: #ff9800;
    --color-low: #2196f3;
    --color-fixed: #388e3c;
}

* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
    line-height: 1.6;
    color: #333;
    max-width: 1200px;
    margin: 0 auto;
    padding: 20px;
    background: #f5f5f5;
}

header {
    background: linear-gradient(135deg, #3949ab 0%, #1a237e 100%);
    color: white;
    padding: 30px;
    border-radius: 8px;
    margin-bottom: 20px;
}

.timestamp {
    opacity: 0.8;
    font-size: 0.9em;
}

section {
    background: white;
    padding: 25px;
    border-radius: 8px;
    margin-bottom: 20px;
    box-shadow: 0 2px 4px rgba(0,0,0,0.1);
}

h2 {
    color: #3949ab;
    border-bottom: 2px solid #3949ab;
    padding-bottom: 10px;
    margin-bottom: 20px;
}

h3 {
    color: #555;
    margin: 20px 0 10px;
}

.stats-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
    gap: 15px;
}

.stat-card {
    background: #f8f9fa;
    padding: 20px;
    border-radius: 8px;
    text-align: center;
}

.stat-value {
    display: block;
    font-size: 2.2em;
    font-weight: bold;
    color: #3949ab;
}

.stat-card.critical .stat-value { color: var(--color-critical); }
.stat-card.fixed .stat-value { color: var(--color-fixed); }

.stat-label {
    color: #666;
}

.recommendations li {
    list-style: none;
    padding: 6px 0;
}

.issue {
    border-left: 4px solid #3949ab;
    padding: 10px 15px;
    margin-bottom: 10px;
    background: #fafafa;
}

.kind {
    font-family: monospace;
    font-size: 0.85em;
    color: #3949ab;
}

.file {
    font-family: monospace;
    font-size: 0.85em;
    color: #666;
}

.fix code {
    background: #e8f5e9;
    padding: 1px 4px;
    border-radius: 3px;
}

.swatch {
    display: inline-block;
    width: 12px;
    height: 12px;
    margin: 0 4px;
    border: 1px solid #ccc;
    vertical-align: middle;
}

.empty {
    color: var(--color-fixed);
}

.badge {
    display: inline-block;
    padding: 2px 8px;
    border-radius: 4px;
    font-size: 0.75em;
    font-weight: 500;
    color: white;
    text-transform: uppercase;
}

.badge.critical { background: var(--color-critical); }
.badge.high { background: var(--color-high); }
.badge.medium { background: var(--color-medium); }
.badge.low { background: var(--color-low); }

footer {
    text-align: center;
    color: #666;
    padding: 20px;
}
"#;
