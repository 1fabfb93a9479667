//! complint - compliance linter for React/TypeScript front ends
//!
//! Scans TS/TSX/JS/JSX components and CSS stylesheets for accessibility,
//! internationalization, layout, performance, security and theme defects,
//! rewrites the mechanically fixable ones in place, and rolls every finding
//! into one compliance report.
//!
//! # Architecture
//!
//! ```text
//! CLI -> Engine -> SourceUnit -> Checkers -> IssueBuckets -> Fixer -> Report
//! ```
//!
//! Side data (translation catalogs, CSS custom properties, dependency
//! advisories) is built once before the scan and shared read-only by the
//! checkers. Files are scanned in parallel; checkers for one file run in
//! sequence.
//!
//! # Example
//!
//! ```no_run
//! use complint::{Config, Engine};
//!
//! let engine = Engine::new(".", Config::default());
//! let result = engine.run().unwrap();
//! println!("{} issue(s)", result.report.summary.total_issues);
//! ```

pub mod audit;
pub mod catalog;
pub mod checkers;
pub mod color;
pub mod config;
pub mod css_vars;
pub mod engine;
pub mod fixer;
pub mod issue;
pub mod report;
pub mod source;

// Re-export main types
pub use audit::{Advisory, AdvisoryAudit, NpmAudit};
pub use catalog::TranslationCatalog;
pub use checkers::{CheckContext, CheckOptions, Checker};
pub use config::{CliOverrides, ColorMode, Config, ConfigError};
pub use css_vars::CssVariableTable;
pub use engine::{Engine, EngineError, RunResult};
pub use fixer::{FixMode, FixOutcome, Fixer};
pub use issue::{Category, ContrastInfo, Issue, IssueBuckets, IssueKind, Severity};
pub use report::{build_report, write_report, Report, ReportFormat, Summary, TextFormatter};
pub use source::{ParseError, SourceUnit};
