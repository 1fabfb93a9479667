//! Run configuration
//!
//! Reads configuration from:
//! - `--config <file>` (YAML or JSON)
//! - `.complintrc.yaml` / `.complintrc.yml` / `.complintrc.json` (project-level)
//! - the same names in the home directory (user-level)

use crate::checkers::{self, CheckOptions};
use crate::issue::Category;
use crate::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_NAMES: &[&str] = &[".complintrc.yaml", ".complintrc.yml", ".complintrc.json"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub parallel: bool,

    /// Number of parallel jobs (0 = number of CPUs)
    pub jobs: usize,

    /// Wall-clock budget for scanning in seconds (0 = none)
    pub deadline_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
            deadline_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Glob patterns, relative to the project root
    pub include: Vec<String>,

    /// Globset patterns matched against root-relative paths
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: ["tsx", "ts", "jsx", "js", "css"]
                .iter()
                .map(|ext| format!("src/**/*.{}", ext))
                .collect(),
            exclude: vec![
                "**/*.test.*".to_string(),
                "**/*.d.ts".to_string(),
                "**/node_modules/**".to_string(),
            ],
        }
    }
}

/// One switch per checker category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    pub i18n: bool,
    pub layout: bool,
    pub theme: bool,
    pub accessibility: bool,
    pub performance: bool,
    pub security: bool,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            i18n: true,
            layout: true,
            theme: true,
            accessibility: true,
            performance: true,
            security: true,
        }
    }
}

impl CategoriesConfig {
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::I18n => self.i18n,
            Category::Layout => self.layout,
            Category::Theme => self.theme,
            Category::Accessibility => self.accessibility,
            Category::Performance => self.performance,
            Category::Security => self.security,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        let slot = match category {
            Category::I18n => &mut self.i18n,
            Category::Layout => &mut self.layout,
            Category::Theme => &mut self.theme,
            Category::Accessibility => &mut self.accessibility,
            Category::Performance => &mut self.performance,
            Category::Security => &mut self.security,
        };
        *slot = enabled;
    }

    pub fn enabled(&self) -> Vec<Category> {
        Category::ALL.into_iter().filter(|c| self.is_enabled(*c)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationsConfig {
    pub en: PathBuf,
    pub ar: PathBuf,
}

impl Default for TranslationsConfig {
    fn default() -> Self {
        Self {
            en: PathBuf::from("public/api/translations/en.json"),
            ar: PathBuf::from("public/api/translations/ar.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Stylesheets whose custom properties seed the variable table
    pub stylesheets: Vec<PathBuf>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            stylesheets: vec![PathBuf::from("src/index.css")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Files treated as page components
    pub pages: Vec<String>,

    /// Wrapper inserted by the layout fix
    pub wrapper: String,
    pub wrapper_import: String,

    /// Components accepted as page wrappers
    pub wrappers: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let options = CheckOptions::default();
        Self {
            pages: checkers::DEFAULT_PAGE_GLOBS.iter().map(|s| s.to_string()).collect(),
            wrapper: options.wrapper_component,
            wrapper_import: options.wrapper_import,
            wrappers: options.layout_wrappers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub max_file_bytes: usize,
    pub max_components: usize,
    pub max_component_lines: usize,
    pub max_dependencies: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        let options = CheckOptions::default();
        Self {
            max_file_bytes: options.max_file_bytes,
            max_components: options.max_components,
            max_component_lines: options.max_component_lines,
            max_dependencies: options.max_dependencies,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,

    /// Package manager executable
    pub command: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "npm".to_string(),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub formats: Vec<ReportFormat>,

    /// Directory the report files are written to
    pub directory: PathBuf,

    pub color: ColorMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: ReportFormat::ALL.to_vec(),
            directory: PathBuf::from("compliance-reports"),
            color: ColorMode::Auto,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub files: FilesConfig,
    pub categories: CategoriesConfig,
    pub translations: TranslationsConfig,
    pub theme: ThemeConfig,
    pub layout: LayoutConfig,
    pub performance: PerformanceConfig,
    pub audit: AuditConfig,
    pub output: OutputConfig,
}

/// Command-line values that override the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Replaces `files.include` when non-empty
    pub include: Vec<String>,
    pub only: Option<Vec<Category>>,
    pub skip: Vec<Category>,
    pub jobs: Option<usize>,
    pub formats: Option<Vec<ReportFormat>>,
    pub output_dir: Option<PathBuf>,
    pub no_audit: bool,
    pub no_color: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML or JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the first config found in `dir`, then in the home directory,
    /// falling back to defaults
    pub fn load_default(dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = Self::find_in(dir) {
            return Self::load(&path);
        }
        if let Some(path) = dirs::home_dir().and_then(|home| Self::find_in(&home)) {
            return Self::load(&path);
        }
        Ok(Self::default())
    }

    fn find_in(dir: &Path) -> Option<PathBuf> {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Reject values no run can use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files.include.is_empty() {
            return Err(ConfigError::Invalid("files.include is empty".to_string()));
        }
        if self.categories.enabled().is_empty() {
            return Err(ConfigError::Invalid("every category is disabled".to_string()));
        }
        if self.layout.wrapper.trim().is_empty() {
            return Err(ConfigError::Invalid("layout.wrapper is empty".to_string()));
        }
        checkers::build_globset(&self.files.exclude)?;
        checkers::build_globset(&self.layout.pages)?;
        Ok(())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(&mut self, cli: CliOverrides) {
        if !cli.include.is_empty() {
            self.files.include = cli.include;
        }
        if let Some(only) = cli.only {
            for category in Category::ALL {
                self.categories.set(category, only.contains(&category));
            }
        }
        for category in cli.skip {
            self.categories.set(category, false);
        }
        if let Some(jobs) = cli.jobs {
            self.engine.jobs = jobs;
        }
        if let Some(formats) = cli.formats {
            self.output.formats = formats;
        }
        if let Some(dir) = cli.output_dir {
            self.output.directory = dir;
        }
        if cli.no_audit {
            self.audit.enabled = false;
        }
        if cli.no_color {
            self.output.color = ColorMode::Never;
        }
    }

    /// Checker tunables derived from the `layout` and `performance` sections
    pub fn check_options(&self) -> Result<CheckOptions, ConfigError> {
        Ok(CheckOptions {
            layout_pages: checkers::build_globset(&self.layout.pages)?,
            layout_wrappers: self.layout.wrappers.clone(),
            wrapper_component: self.layout.wrapper.clone(),
            wrapper_import: self.layout.wrapper_import.clone(),
            max_file_bytes: self.performance.max_file_bytes,
            max_components: self.performance.max_components,
            max_component_lines: self.performance.max_component_lines,
            max_dependencies: self.performance.max_dependencies,
        })
    }

    /// Thread count for the scan pool
    pub fn jobs(&self) -> usize {
        if self.engine.jobs > 0 {
            self.engine.jobs
        } else {
            num_cpus::get()
        }
    }
}
