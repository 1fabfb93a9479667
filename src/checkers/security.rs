//! Security smells: raw HTML injection, secrets in source, dynamic code
//! evaluation, XSS-prone rendering

use super::{CheckContext, Checker};
use crate::issue::{Category, Issue, IssueKind, Severity};
use crate::source::{Node, SourceUnit};
use once_cell::sync::Lazy;
use regex::Regex;

/// A credential pattern and how bad a match is
struct SecretPattern {
    label: &'static str,
    regex: Regex,
    severity: Severity,
}

/// Checked in order; the first match on a line wins
static SECRET_PATTERNS: Lazy<Vec<SecretPattern>> = Lazy::new(|| {
    let pattern = |label, re: &str, severity| SecretPattern {
        label,
        regex: Regex::new(re).unwrap(),
        severity,
    };
    vec![
        pattern(
            "AWS access key",
            r#"(?i)aws[_-]?(?:secret[_-]?)?access[_-]?key(?:[_-]?id)?["']?\s*[:=]\s*["'`][^"'`\s]{8,}["'`]"#,
            Severity::Critical,
        ),
        pattern("AWS access key", r"\bAKIA[0-9A-Z]{16}\b", Severity::Critical),
        pattern(
            "private key",
            r#"(?i)private[_-]?key["']?\s*[:=]\s*["'`][^"'`]{8,}["'`]"#,
            Severity::Critical,
        ),
        pattern(
            "private key",
            r"-----BEGIN (?:RSA |EC |DSA |OPENSSH |ENCRYPTED )?PRIVATE KEY-----",
            Severity::Critical,
        ),
        pattern(
            "API key",
            r#"(?i)api[_-]?key["']?\s*[:=]\s*["'`][^"'`\s]{8,}["'`]"#,
            Severity::High,
        ),
        pattern(
            "secret",
            r#"(?i)secret["']?\s*[:=]\s*["'`][^"'`\s]{8,}["'`]"#,
            Severity::High,
        ),
        pattern(
            "password",
            r#"(?i)passw(?:or)?d["']?\s*[:=]\s*["'`][^"'`\s]{4,}["'`]"#,
            Severity::High,
        ),
        pattern(
            "token",
            r#"(?i)token["']?\s*[:=]\s*["'`][^"'`\s]{8,}["'`]"#,
            Severity::Medium,
        ),
    ]
});

static RAW_HTML_PROPERTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:inner|outer)HTML\b").unwrap());

/// `{comment.text}`, `{props.html}` and friends rendered as a JSX child
static UNTRUSTED_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(?:\??\.[A-Za-z_$][\w$]*)*\??\.(?:input|content|html|text|message)$")
        .unwrap()
});

const ENV_SOURCES: &[&str] = &["process.env", "import.meta.env"];

pub struct SecurityChecker;

impl Checker for SecurityChecker {
    fn category(&self) -> Category {
        Category::Security
    }

    fn check(&self, unit: &SourceUnit, _ctx: &CheckContext<'_>) -> Vec<Issue> {
        let path = unit.path();
        let mut issues = Vec::new();

        for node in unit.nodes() {
            match node {
                Node::Attribute(attr) if attr.name == "dangerouslySetInnerHTML" => {
                    issues.push(
                        Issue::new(
                            path,
                            attr.line,
                            IssueKind::UnsafeHtml,
                            "dangerouslySetInnerHTML renders raw HTML",
                        )
                        .with_column(attr.column)
                        .with_element(attr.tag.as_str())
                        .with_grade(Severity::High)
                        .with_fix("Render text content or sanitize the HTML (e.g. DOMPurify) first"),
                    );
                }
                Node::Attribute(attr) if attr.name == "href" => {
                    let scripted = attr
                        .literal()
                        .is_some_and(|v| v.trim_start().to_lowercase().starts_with("javascript:"));
                    if scripted {
                        issues.push(
                            Issue::new(path, attr.line, IssueKind::XssRisk, "javascript: URL in href")
                                .with_column(attr.column)
                                .with_element(attr.tag.as_str())
                                .with_grade(Severity::High)
                                .with_fix("Use an onClick handler or a real URL"),
                        );
                    }
                }
                Node::Call(call) if !call.is_new && (call.callee == "eval" || call.callee == "window.eval") => {
                    issues.push(
                        Issue::new(path, call.line, IssueKind::UnsafeEval, "eval() executes arbitrary code")
                            .with_column(call.column)
                            .with_grade(Severity::Critical)
                            .with_fix("Remove eval; parse data with JSON.parse or use a lookup table"),
                    );
                }
                Node::Call(call) if call.is_new && call.callee == "Function" && call.has_arguments => {
                    issues.push(
                        Issue::new(
                            path,
                            call.line,
                            IssueKind::UnsafeEval,
                            "new Function() compiles code from strings",
                        )
                        .with_column(call.column)
                        .with_grade(Severity::High)
                        .with_fix("Replace the generated function with a regular function"),
                    );
                }
                Node::Expression(expr) if UNTRUSTED_MEMBER.is_match(&expr.text) => {
                    issues.push(
                        Issue::new(
                            path,
                            expr.line,
                            IssueKind::XssRisk,
                            format!("Possibly untrusted value rendered: {{{}}}", expr.text),
                        )
                        .with_column(expr.column)
                        .with_grade(Severity::Medium)
                        .with_fix("Validate or escape user-provided content before rendering"),
                    );
                }
                _ => {}
            }
        }

        for (n, line) in unit.lines() {
            if unit.is_comment_line(n) {
                continue;
            }
            if RAW_HTML_PROPERTY.is_match(line) {
                issues.push(
                    Issue::new(path, n, IssueKind::UnsafeHtml, "Direct innerHTML/outerHTML access")
                        .with_grade(Severity::High)
                        .with_fix("Use textContent or build DOM nodes explicitly"),
                );
            }
            if ENV_SOURCES.iter().any(|env| line.contains(env)) {
                continue;
            }
            if let Some(secret) = SECRET_PATTERNS.iter().find(|p| p.regex.is_match(line)) {
                issues.push(
                    Issue::new(
                        path,
                        n,
                        IssueKind::HardcodedSecret,
                        format!("Possible hardcoded {} detected", secret.label),
                    )
                    .with_grade(secret.severity)
                    .with_fix("Load the value from an environment variable (process.env or import.meta.env)"),
                );
            }
        }

        issues.sort_by_key(|i| i.line);
        issues
    }
}
