//! complint CLI - compliance linter for React/TypeScript front ends

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use complint::fixer::format_diffs;
use complint::{
    write_report, Category, CliOverrides, ColorMode, Config, ConfigError, Engine, EngineError,
    FixMode, ReportFormat, TextFormatter,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "complint",
    version,
    about = "Compliance linter for React/TypeScript front ends",
    long_about = "Checks components and stylesheets for accessibility, i18n, layout, performance, security and theme issues, fixes the simple ones, and writes a compliance report."
)]
struct Cli {
    /// Files, directories or glob patterns to scan (default: configured include globs)
    paths: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Apply automatic fixes
    #[arg(long)]
    fix: bool,

    /// Count fixes without writing them
    #[arg(long, requires = "fix")]
    dry_run: bool,

    /// Print fixes as unified diffs without writing them
    #[arg(long, requires = "fix", conflicts_with = "dry_run")]
    diff: bool,

    /// Report formats to write (comma-separated: json,html,markdown)
    #[arg(short, long, value_delimiter = ',')]
    format: Option<Vec<ReportFormat>>,

    /// Directory for report files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only run these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    only: Option<Vec<Category>>,

    /// Skip these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    skip: Vec<Category>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Do not run the dependency audit
    #[arg(long)]
    no_audit: bool,

    /// List every issue in the console summary and log progress
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with 0 even when critical issues are found
    #[arg(long)]
    exit_zero: bool,
}

impl Cli {
    fn fix_mode(&self) -> Option<FixMode> {
        match (self.fix, self.diff, self.dry_run) {
            (false, _, _) => None,
            (true, true, _) => Some(FixMode::Diff),
            (true, false, true) => Some(FixMode::DryRun),
            (true, false, false) => Some(FixMode::Write),
        }
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            include: self.paths.iter().map(|p| include_pattern(p)).collect(),
            only: self.only.clone(),
            skip: self.skip.clone(),
            jobs: self.jobs,
            formats: self.format.clone(),
            output_dir: self.output_dir.clone(),
            no_audit: self.no_audit,
            no_color: self.no_color,
        }
    }
}

/// A directory argument scans everything below it
fn include_pattern(arg: &str) -> String {
    if Path::new(arg).is_dir() {
        format!("{}/**/*", arg.trim_end_matches('/'))
    } else {
        arg.to_string()
    }
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default(Path::new("."))?,
    };
    config.merge_cli(cli.overrides());
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).context("failed to load configuration")?;
    match config.output.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let formats = config.output.formats.clone();
    let output_dir = config.output.directory.clone();
    let mut engine = Engine::new(".", config);
    if let Some(mode) = cli.fix_mode() {
        engine = engine.with_fix(mode);
    }

    let result = engine.run()?;

    if let Some(outcome) = &result.fix {
        if !outcome.diffs.is_empty() {
            print!("{}", format_diffs(outcome));
        }
        let verb = match cli.fix_mode() {
            Some(FixMode::Write) => "Fixed",
            _ => "Would fix",
        };
        eprintln!(
            "{} {} issue(s) in {} file(s), {} skipped",
            verb.green().bold(),
            outcome.fixed,
            outcome.files_modified,
            outcome.skipped
        );
        for err in &outcome.errors {
            eprintln!("{}: {}", "warning".yellow(), err);
        }
    }
    if result.audit_fixed {
        eprintln!("{} dependency fix applied", "Fixed".green().bold());
    }

    for format in &formats {
        let path = write_report(&result.report, *format, &output_dir)
            .with_context(|| format!("failed to write {} report", format))?;
        eprintln!("📄 {} report saved to {}", format, path.display());
    }

    let mut formatter = TextFormatter::new().with_issues(cli.verbose);
    if matches!(engine.config().output.color, ColorMode::Never) {
        formatter = formatter.without_color();
    }
    print!("{}", formatter.format(&result.report));

    if cli.verbose {
        eprintln!(
            "{} file(s) scanned in {:.2}s ({} unparsed, {} past deadline)",
            result.files_scanned,
            result.duration.as_secs_f64(),
            result.files_unparsed,
            result.files_timed_out
        );
    }

    if result.report.summary.critical_issues > 0 && !cli.exit_zero {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn is_config_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ConfigError>().is_some()
        || matches!(err.downcast_ref::<EngineError>(), Some(EngineError::Config(_)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}: {:#}", "error".red().bold(), err);
            if is_config_error(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}
