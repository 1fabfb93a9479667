//! Dependency advisory audit through the package manager.
//!
//! The audit tool is an external capability: its failure never fails a run,
//! the engine logs a warning and reports no vulnerabilities.

use crate::issue::{Issue, IssueKind, Severity};
use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: String },

    #[error("audit output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("audit output has no vulnerability data")]
    Shape,
}

/// One vulnerable package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub package: String,
    pub title: String,
    pub severity: Severity,
    pub fix_available: bool,
}

/// Source of dependency advisories for a project root
pub trait AdvisoryAudit: Send + Sync {
    fn audit(&self, root: &Path) -> Result<Vec<Advisory>, AuditError>;

    /// Apply the tool's own dependency fix
    fn fix(&self, root: &Path) -> Result<(), AuditError>;
}

/// `npm audit --json` / `npm audit fix`
#[derive(Debug, Clone)]
pub struct NpmAudit {
    command: String,
}

impl Default for NpmAudit {
    fn default() -> Self {
        Self::new("npm")
    }
}

impl NpmAudit {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn run(&self, root: &Path, args: &[&str]) -> Result<std::process::Output, AuditError> {
        let display = format!("{} {}", self.command, args.join(" "));
        debug!("running {} in {}", display, root.display());
        Command::new(&self.command)
            .args(args)
            .current_dir(root)
            .output()
            .map_err(|source| AuditError::Spawn {
                command: display,
                source,
            })
    }
}

impl AdvisoryAudit for NpmAudit {
    fn audit(&self, root: &Path) -> Result<Vec<Advisory>, AuditError> {
        // npm exits non-zero whenever vulnerabilities exist; only the JSON matters
        let output = self.run(root, &["audit", "--json"])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(AuditError::Failed {
                command: format!("{} audit --json", self.command),
                status: output.status.to_string(),
            });
        }
        parse_audit_json(&stdout)
    }

    fn fix(&self, root: &Path) -> Result<(), AuditError> {
        let output = self.run(root, &["audit", "fix"])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(AuditError::Failed {
                command: format!("{} audit fix", self.command),
                status: output.status.to_string(),
            })
        }
    }
}

/// Parse npm audit JSON, both the `vulnerabilities` (npm 7+) and the
/// legacy `advisories` layout. Sorted by package name.
pub fn parse_audit_json(json: &str) -> Result<Vec<Advisory>, AuditError> {
    let root: Value = serde_json::from_str(json)?;
    let mut advisories = Vec::new();

    if let Some(vulns) = root.get("vulnerabilities").and_then(Value::as_object) {
        for (name, entry) in vulns {
            let title = entry
                .get("via")
                .and_then(Value::as_array)
                .and_then(|via| {
                    via.iter().find_map(|v| match v {
                        Value::Object(o) => o.get("title").and_then(Value::as_str).map(str::to_string),
                        _ => None,
                    })
                    .or_else(|| {
                        via.iter()
                            .find_map(Value::as_str)
                            .map(|dep| format!("Vulnerable through {}", dep))
                    })
                })
                .unwrap_or_else(|| "Known vulnerability".to_string());
            let fix_available = match entry.get("fixAvailable") {
                Some(Value::Bool(b)) => *b,
                Some(Value::Object(_)) => true,
                _ => false,
            };
            advisories.push(Advisory {
                package: name.clone(),
                title,
                severity: severity_of(entry),
                fix_available,
            });
        }
    } else if let Some(legacy) = root.get("advisories").and_then(Value::as_object) {
        for entry in legacy.values() {
            let package = entry
                .get("module_name")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let title = entry
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Known vulnerability")
                .to_string();
            let fix_available = entry
                .get("patched_versions")
                .and_then(Value::as_str)
                .is_some_and(|p| p != "<0.0.0");
            advisories.push(Advisory {
                package,
                title,
                severity: severity_of(entry),
                fix_available,
            });
        }
    } else {
        return Err(AuditError::Shape);
    }

    advisories.sort_by(|a, b| a.package.cmp(&b.package));
    Ok(advisories)
}

fn severity_of(entry: &Value) -> Severity {
    entry
        .get("severity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(Severity::Medium)
}

/// The `vulnerability` issue for an advisory, attributed to the manifest
pub fn vulnerability_issue(advisory: &Advisory, manifest: &Path) -> Issue {
    let issue = Issue::new(
        manifest,
        1,
        IssueKind::Vulnerability,
        format!("{}: {}", advisory.package, advisory.title),
    )
    .with_grade(advisory.severity)
    .with_element(advisory.package.as_str());
    if advisory.fix_available {
        issue.with_fix("Run the dependency fix (npm audit fix)")
    } else {
        issue
    }
}

/// Manifest that vulnerability issues point at
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join("package.json")
}
