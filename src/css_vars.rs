//! CSS custom property table built from the global stylesheets

use crate::color::{self, Rgb};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Maximum `var()` indirection followed before a value counts as unknown
pub const MAX_VAR_DEPTH: usize = 8;

static DECLARATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"--([\w-]+)\s*:\s*([^;}]+)").unwrap());

static VAR_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"var\(\s*--([\w-]+)\s*(?:,\s*([^()]*(?:\([^()]*\))?[^()]*))?\)").unwrap()
});

/// Flat map of custom property name (without `--`) to raw declared value
#[derive(Debug, Clone, Default)]
pub struct CssVariableTable {
    vars: HashMap<String, String>,
}

impl CssVariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stylesheet paths. Unreadable files are logged and skipped.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut table = Self::new();
        for path in paths {
            let path = path.as_ref();
            match fs::read_to_string(path) {
                Ok(css) => {
                    let before = table.len();
                    table.add_stylesheet(&css);
                    debug!("{}: {} custom properties", path.display(), table.len() - before);
                }
                Err(e) => warn!("Cannot read stylesheet {}: {}", path.display(), e),
            }
        }
        table
    }

    /// Add every `--name: value` declaration. The first definition of a
    /// name wins, so `:root` values beat later theme overrides.
    pub fn add_stylesheet(&mut self, css: &str) {
        for cap in DECLARATION.captures_iter(css) {
            let value = cap[2].trim().trim_end_matches("!important").trim();
            self.vars
                .entry(cap[1].to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.vars
            .insert(name.trim_start_matches("--").to_string(), value.trim().to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name.trim_start_matches("--")).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Substitute `var()` references transitively. Returns `None` when a
    /// reference is undefined without fallback, cyclic, or deeper than
    /// [`MAX_VAR_DEPTH`].
    pub fn substitute(&self, value: &str) -> Option<String> {
        self.substitute_at(value, 0)
    }

    fn substitute_at(&self, value: &str, depth: usize) -> Option<String> {
        if !value.contains("var(") {
            return Some(value.trim().to_string());
        }
        if depth >= MAX_VAR_DEPTH {
            return None;
        }

        let mut out = String::new();
        let mut last = 0;
        for cap in VAR_REF.captures_iter(value) {
            let whole = cap.get(0)?;
            out.push_str(&value[last..whole.start()]);
            let replacement = match self.vars.get(&cap[1]) {
                Some(raw) => self.substitute_at(raw, depth + 1),
                None => None,
            };
            let replacement = match (replacement, cap.get(2)) {
                (Some(r), _) => r,
                (None, Some(fallback)) => self.substitute_at(fallback.as_str(), depth + 1)?,
                (None, None) => return None,
            };
            out.push_str(&replacement);
            last = whole.end();
        }
        out.push_str(&value[last..]);

        if out.contains("var(") {
            self.substitute_at(&out, depth + 1)
        } else {
            Some(out.trim().to_string())
        }
    }

    /// Resolve a colour value through the table. `None` means unknown.
    pub fn resolve_color(&self, value: &str) -> Option<Rgb> {
        let substituted = self.substitute(value)?;
        color::parse_color(&substituted)
    }
}
