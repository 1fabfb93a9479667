//! Run orchestration: discover files, build side data, scan in parallel,
//! optionally fix, then aggregate the report

use crate::audit::{manifest_path, vulnerability_issue, AdvisoryAudit, NpmAudit};
use crate::catalog::TranslationCatalog;
use crate::checkers::{self, check_unit, CheckContext, CheckOptions, Checker};
use crate::config::{Config, ConfigError};
use crate::css_vars::CssVariableTable;
use crate::fixer::{FixMode, FixOutcome, Fixer};
use crate::issue::{Category, Issue, IssueBuckets, IssueKind};
use crate::report::{build_report, Report};
use crate::source::{Language, SourceUnit};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid include pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to build thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunResult {
    pub report: Report,
    /// Files parsed and checked
    pub files_scanned: usize,
    /// Files that could not be read or parsed
    pub files_unparsed: usize,
    /// Files not started before the deadline
    pub files_timed_out: usize,
    pub fix: Option<FixOutcome>,
    /// Whether the dependency fix ran successfully
    pub audit_fixed: bool,
    pub duration: Duration,
}

enum FileScan {
    Checked(Vec<Issue>),
    Unparsed,
    TimedOut,
}

pub struct Engine {
    root: PathBuf,
    config: Config,
    audit: Box<dyn AdvisoryAudit>,
    fix_mode: Option<FixMode>,
    deadline: Option<Duration>,
}

impl Engine {
    /// Engine over the project at `root`. Relative paths in `config`
    /// resolve against it.
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        let audit = Box::new(NpmAudit::new(config.audit.command.clone()));
        let deadline = match config.engine.deadline_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self {
            root: root.into(),
            config,
            audit,
            fix_mode: None,
            deadline,
        }
    }

    /// Scan budget, overriding `engine.deadline_secs`
    pub fn with_deadline(mut self, budget: Duration) -> Self {
        self.deadline = Some(budget);
        self
    }

    pub fn with_audit(mut self, audit: Box<dyn AdvisoryAudit>) -> Self {
        self.audit = audit;
        self
    }

    /// Run the fix pass after scanning
    pub fn with_fix(mut self, mode: FixMode) -> Self {
        self.fix_mode = Some(mode);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files matched by the include globs and not excluded, sorted
    pub fn discover(&self) -> Result<Vec<PathBuf>, EngineError> {
        let exclude = checkers::build_globset(&self.config.files.exclude).map_err(ConfigError::from)?;
        let mut files = BTreeSet::new();

        for pattern in &self.config.files.include {
            let full = if Path::new(pattern).is_absolute() {
                pattern.clone()
            } else {
                self.root.join(pattern).to_string_lossy().into_owned()
            };
            let paths = glob::glob(&full).map_err(|source| EngineError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            for entry in paths.flatten() {
                if !entry.is_file() || Language::from_path(&entry).is_none() {
                    continue;
                }
                let relative = entry.strip_prefix(&self.root).unwrap_or(&entry);
                if exclude.is_match(relative) {
                    continue;
                }
                files.insert(entry);
            }
        }

        debug!("discovered {} file(s)", files.len());
        Ok(files.into_iter().collect())
    }

    pub fn run(&self) -> Result<RunResult, EngineError> {
        let start = Instant::now();
        let files = self.discover()?;
        self.run_files(&files, start)
    }

    fn run_files(&self, files: &[PathBuf], start: Instant) -> Result<RunResult, EngineError> {
        let options = self.config.check_options()?;
        let categories = self.config.categories.enabled();
        let checkers = checkers::checkers_for(&categories);

        let mut catalog = TranslationCatalog::load(
            &self.root.join(&self.config.translations.en),
            &self.root.join(&self.config.translations.ar),
        );
        let stylesheets: Vec<PathBuf> = self
            .config
            .theme
            .stylesheets
            .iter()
            .map(|p| self.root.join(p))
            .collect();
        let css_vars = CssVariableTable::load(&stylesheets);
        let vulnerabilities = if categories.contains(&Category::Security) {
            self.audit_issues()
        } else {
            Vec::new()
        };
        let manifest_issues = if categories.contains(&Category::Performance) {
            self.manifest_issues(&options)
        } else {
            Vec::new()
        };

        let ctx = CheckContext {
            catalog: &catalog,
            css_vars: &css_vars,
            options: &options,
        };
        let scans = self.scan(files, &ctx, &checkers)?;

        let mut buckets = IssueBuckets::new();
        let (mut scanned, mut unparsed, mut timed_out) = (0, 0, 0);
        for scan in scans {
            match scan {
                FileScan::Checked(issues) => {
                    scanned += 1;
                    buckets.extend(issues);
                }
                FileScan::Unparsed => unparsed += 1,
                FileScan::TimedOut => timed_out += 1,
            }
        }
        buckets.extend(vulnerabilities);
        buckets.extend(manifest_issues);
        buckets.sort();

        if timed_out > 0 {
            warn!("scan deadline reached; {} file(s) were not scanned", timed_out);
        }
        info!(
            "scanned {} file(s), {} issue(s), {} unparsed",
            scanned,
            buckets.len(),
            unparsed
        );

        let mut fixed_counts: BTreeMap<Category, usize> = BTreeMap::new();
        let mut fix = None;
        let mut audit_fixed = false;
        if let Some(mode) = self.fix_mode {
            let issues: Vec<Issue> = buckets.iter().cloned().collect();
            let outcome = Fixer::new(&options)
                .with_mode(mode)
                .with_parallel(self.config.engine.parallel)
                .apply(&issues, &mut catalog);
            fixed_counts.extend(outcome.fixed_by_category.iter().map(|(c, n)| (*c, *n)));

            let dependency_fixes = issues
                .iter()
                .filter(|i| i.kind == IssueKind::Vulnerability && i.fix.is_some())
                .count();
            if mode == FixMode::Write && dependency_fixes > 0 {
                match self.audit.fix(&self.root) {
                    Ok(()) => {
                        audit_fixed = true;
                        *fixed_counts.entry(Category::Security).or_default() += dependency_fixes;
                    }
                    Err(e) => warn!("dependency fix failed: {}", e),
                }
            }
            fix = Some(outcome);
        }

        Ok(RunResult {
            report: build_report(buckets, &fixed_counts),
            files_scanned: scanned,
            files_unparsed: unparsed,
            files_timed_out: timed_out,
            fix,
            audit_fixed,
            duration: start.elapsed(),
        })
    }

    fn scan(
        &self,
        files: &[PathBuf],
        ctx: &CheckContext<'_>,
        checkers: &[Box<dyn Checker>],
    ) -> Result<Vec<FileScan>, EngineError> {
        let deadline = self.deadline.map(|budget| Instant::now() + budget);

        let scan_one = |path: &PathBuf| -> FileScan {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return FileScan::TimedOut;
            }
            match SourceUnit::parse(path) {
                Ok(unit) => FileScan::Checked(check_unit(&unit, ctx, checkers)),
                Err(e) => {
                    debug!("skipping {}: {}", path.display(), e);
                    FileScan::Unparsed
                }
            }
        };

        if self.config.engine.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs())
                .build()?;
            Ok(pool.install(|| files.par_iter().map(scan_one).collect()))
        } else {
            Ok(files.iter().map(scan_one).collect())
        }
    }

    /// Bundle findings from the project's `package.json`. A missing or
    /// malformed manifest yields none.
    fn manifest_issues(&self, options: &CheckOptions) -> Vec<Issue> {
        let manifest = manifest_path(&self.root);
        if !manifest.is_file() {
            return Vec::new();
        }
        let parsed = fs::read_to_string(&manifest).map_err(|e| e.to_string()).and_then(|text| {
            serde_json::from_str::<serde_json::Value>(&text).map_err(|e| e.to_string())
        });
        let package = match parsed {
            Ok(package) => package,
            Err(e) => {
                warn!("cannot read {}: {}", manifest.display(), e);
                return Vec::new();
            }
        };
        checkers::dependency_issues(&manifest, &package, options)
    }

    /// Vulnerability issues from the advisory audit. A missing manifest or
    /// a failing audit tool yields none.
    fn audit_issues(&self) -> Vec<Issue> {
        if !self.config.audit.enabled {
            return Vec::new();
        }
        let manifest = manifest_path(&self.root);
        if !manifest.is_file() {
            debug!("no {} found; skipping dependency audit", manifest.display());
            return Vec::new();
        }
        match self.audit.audit(&self.root) {
            Ok(advisories) => advisories
                .iter()
                .map(|a| vulnerability_issue(a, &manifest))
                .collect(),
            Err(e) => {
                warn!("dependency audit unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Advisory, AuditError};
    use crate::issue::Severity;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubAudit {
        advisories: Vec<Advisory>,
        fail: bool,
        fix_calls: Arc<AtomicUsize>,
    }

    impl AdvisoryAudit for StubAudit {
        fn audit(&self, _root: &Path) -> Result<Vec<Advisory>, AuditError> {
            if self.fail {
                Err(AuditError::Shape)
            } else {
                Ok(self.advisories.clone())
            }
        }

        fn fix(&self, _root: &Path) -> Result<(), AuditError> {
            self.fix_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn stub(fail: bool) -> (Box<StubAudit>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let audit = StubAudit {
            advisories: vec![Advisory {
                package: "minimist".to_string(),
                title: "Prototype Pollution".to_string(),
                severity: Severity::Critical,
                fix_available: true,
            }],
            fail,
            fix_calls: Arc::clone(&calls),
        };
        (Box::new(audit), calls)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/components/Logo.tsx", "export const Logo = () => <img src=\"logo.png\" />;\n");
        write(root, "src/components/Logo.test.tsx", "export const T = () => <img src=\"t.png\" />;\n");
        write(root, "src/api.ts", "export const run = (code: string) => eval(code);\n");
        write(root, "src/notes.md", "<img src=\"x.png\">\n");
        dir
    }

    fn quiet_config() -> Config {
        let mut config = Config::new();
        config.audit.enabled = false;
        config.engine.jobs = 2;
        config
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = project();
        let engine = Engine::new(dir.path(), quiet_config());
        let files = engine.discover().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/api.ts", "src/components/Logo.tsx"]);
    }

    #[test]
    fn test_run_collects_issues() {
        let dir = project();
        let result = Engine::new(dir.path(), quiet_config()).run().unwrap();
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.files_unparsed, 0);
        assert_eq!(result.report.issues.count_kind(IssueKind::MissingAlt), 1);
        assert_eq!(result.report.issues.count_kind(IssueKind::UnsafeEval), 1);
        assert_eq!(result.report.summary.critical_issues, 1);
        assert!(result.fix.is_none());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let dir = project();
        let parallel = Engine::new(dir.path(), quiet_config()).run().unwrap();
        let mut config = quiet_config();
        config.engine.parallel = false;
        let sequential = Engine::new(dir.path(), config).run().unwrap();
        assert_eq!(parallel.report.issues, sequential.report.issues);
    }

    #[test]
    fn test_disabled_categories_not_checked() {
        let dir = project();
        let mut config = quiet_config();
        config.categories.security = false;
        let result = Engine::new(dir.path(), config).run().unwrap();
        assert!(result.report.issues.security.is_empty());
        assert_eq!(result.report.issues.count_kind(IssueKind::MissingAlt), 1);
    }

    #[test]
    fn test_unreadable_file_skipped() {
        let dir = project();
        fs::write(dir.path().join("src/broken.tsx"), [0xff, 0xfe, 0x00]).unwrap();
        let result = Engine::new(dir.path(), quiet_config()).run().unwrap();
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.files_unparsed, 1);
    }

    #[test]
    fn test_audit_issues_and_fix() {
        let dir = project();
        write(dir.path(), "package.json", "{}\n");
        let mut config = quiet_config();
        config.audit.enabled = true;
        let (audit, calls) = stub(false);

        let result = Engine::new(dir.path(), config)
            .with_audit(audit)
            .with_fix(FixMode::Write)
            .run()
            .unwrap();

        assert_eq!(result.report.issues.count_kind(IssueKind::Vulnerability), 1);
        assert_eq!(result.report.summary.critical_issues, 2);
        assert!(result.audit_fixed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // missing-alt plus the dependency fix
        assert_eq!(result.report.summary.fixed_issues, 2);
        let logo = fs::read_to_string(dir.path().join("src/components/Logo.tsx")).unwrap();
        assert!(logo.contains("alt=\"\""));
    }

    #[test]
    fn test_manifest_bundle_issues() {
        let dir = project();
        write(
            dir.path(),
            "package.json",
            "{\"dependencies\": {\"react\": \"^18.2.0\", \"moment\": \"^2.29.4\"}}\n",
        );
        let result = Engine::new(dir.path(), quiet_config()).run().unwrap();
        let bundle: Vec<_> = result
            .report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::LargeBundle)
            .collect();
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle[0].file, dir.path().join("package.json"));
        assert_eq!(bundle[0].message, "Heavy dependency detected: moment");

        let mut config = quiet_config();
        config.categories.performance = false;
        let result = Engine::new(dir.path(), config).run().unwrap();
        assert_eq!(result.report.issues.count_kind(IssueKind::LargeBundle), 0);
    }

    #[test]
    fn test_malformed_manifest_ignored() {
        let dir = project();
        write(dir.path(), "package.json", "{ not json");
        let result = Engine::new(dir.path(), quiet_config()).run().unwrap();
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.report.issues.count_kind(IssueKind::LargeBundle), 0);
    }

    #[test]
    fn test_audit_failure_degrades() {
        let dir = project();
        write(dir.path(), "package.json", "{}\n");
        let mut config = quiet_config();
        config.audit.enabled = true;
        let (audit, calls) = stub(true);

        let result = Engine::new(dir.path(), config)
            .with_audit(audit)
            .with_fix(FixMode::DryRun)
            .run()
            .unwrap();

        assert_eq!(result.report.issues.count_kind(IssueKind::Vulnerability), 0);
        assert!(!result.audit_fixed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let logo = fs::read_to_string(dir.path().join("src/components/Logo.tsx")).unwrap();
        assert!(!logo.contains("alt="));
    }

    #[test]
    fn test_expired_deadline_skips_files() {
        let dir = project();
        let result = Engine::new(dir.path(), quiet_config())
            .with_deadline(Duration::ZERO)
            .run()
            .unwrap();
        assert_eq!(result.files_scanned, 0);
        assert_eq!(result.files_timed_out, 2);
        assert!(result.report.issues.is_empty());
    }

    #[test]
    fn test_generous_deadline_scans_everything() {
        let dir = project();
        let mut config = quiet_config();
        config.engine.deadline_secs = 600;
        let result = Engine::new(dir.path(), config).run().unwrap();
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.files_timed_out, 0);
    }

    #[test]
    fn test_bad_include_pattern() {
        let mut config = quiet_config();
        config.files.include = vec!["src/[".to_string()];
        let engine = Engine::new(".", config);
        assert!(matches!(engine.discover(), Err(EngineError::Pattern { .. })));
    }
}
