//! English/Arabic translation catalogs
//!
//! Each locale is a nested JSON object addressed by dotted keys
//! (`"home.hero.title"`). A key counts as translated only when it resolves
//! to a non-object value in both locales.

use log::{debug, warn};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} does not contain a JSON object")]
    NotAnObject { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Ar => write!(f, "ar"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslationCatalog {
    en: Value,
    ar: Value,
    en_path: Option<PathBuf>,
    ar_path: Option<PathBuf>,
    dirty: bool,
}

impl Default for TranslationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationCatalog {
    /// Empty in-memory catalog
    pub fn new() -> Self {
        Self {
            en: Value::Object(Map::new()),
            ar: Value::Object(Map::new()),
            en_path: None,
            ar_path: None,
            dirty: false,
        }
    }

    pub fn from_values(en: Value, ar: Value) -> Self {
        let object = |v: Value| if v.is_object() { v } else { Value::Object(Map::new()) };
        Self {
            en: object(en),
            ar: object(ar),
            ..Self::new()
        }
    }

    /// Load both locales. A missing or malformed file degrades to an empty
    /// locale; the paths are kept so additions can still be saved.
    pub fn load(en_path: &Path, ar_path: &Path) -> Self {
        let read = |path: &Path| match Self::read_locale(path) {
            Ok(value) => value,
            Err(e) => {
                warn!("{}; using an empty catalog", e);
                Value::Object(Map::new())
            }
        };
        let catalog = Self {
            en: read(en_path),
            ar: read(ar_path),
            en_path: Some(en_path.to_path_buf()),
            ar_path: Some(ar_path.to_path_buf()),
            dirty: false,
        };
        debug!(
            "Loaded translations: {} en keys, {} ar keys",
            catalog.keys(Locale::En).len(),
            catalog.keys(Locale::Ar).len()
        );
        catalog
    }

    pub fn read_locale(path: &Path) -> Result<Value, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if !value.is_object() {
            return Err(CatalogError::NotAnObject {
                path: path.to_path_buf(),
            });
        }
        Ok(value)
    }

    fn locale(&self, locale: Locale) -> &Value {
        match locale {
            Locale::En => &self.en,
            Locale::Ar => &self.ar,
        }
    }

    fn locale_mut(&mut self, locale: Locale) -> &mut Value {
        match locale {
            Locale::En => &mut self.en,
            Locale::Ar => &mut self.ar,
        }
    }

    pub fn get(&self, locale: Locale, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(self.locale(locale), |node, part| node.as_object()?.get(part))
    }

    pub fn has_key(&self, locale: Locale, key: &str) -> bool {
        self.get(locale, key).is_some_and(|v| !v.is_object())
    }

    /// Present in both locales
    pub fn has_translation(&self, key: &str) -> bool {
        Locale::ALL.iter().all(|l| self.has_key(*l, key))
    }

    pub fn missing_locales(&self, key: &str) -> Vec<Locale> {
        Locale::ALL
            .into_iter()
            .filter(|l| !self.has_key(*l, key))
            .collect()
    }

    /// Add `key` to each locale where it is missing. Existing leaves are
    /// never overwritten, and a key whose path runs through an existing
    /// non-object value is left alone. Returns whether anything changed.
    pub fn add_missing(&mut self, key: &str, en_value: &str, ar_value: &str) -> bool {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return false;
        }
        let mut changed = false;
        for (locale, value) in [(Locale::En, en_value), (Locale::Ar, ar_value)] {
            if insert_leaf(self.locale_mut(locale), &parts, value) {
                changed = true;
            }
        }
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Add a key with generated values: the humanised last segment in
    /// English and an `[AR: ...]` placeholder in Arabic
    pub fn add_missing_key(&mut self, key: &str) -> bool {
        let english = humanize_key(key);
        let arabic = format!("[AR: {}]", english);
        self.add_missing(key, &english, &arabic)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// All dotted leaf keys of a locale, sorted
    pub fn keys(&self, locale: Locale) -> Vec<String> {
        let mut keys = Vec::new();
        flatten(self.locale(locale), String::new(), &mut keys);
        keys.sort();
        keys
    }

    /// Write both locales back to their source paths when there are pending
    /// additions. Returns whether anything was written.
    pub fn save(&mut self) -> Result<bool, CatalogError> {
        if !self.dirty {
            return Ok(false);
        }
        let (Some(en_path), Some(ar_path)) = (self.en_path.clone(), self.ar_path.clone()) else {
            return Ok(false);
        };
        write_locale(&en_path, &self.en)?;
        write_locale(&ar_path, &self.ar)?;
        self.dirty = false;
        Ok(true)
    }

    pub fn values(&self) -> (&Value, &Value) {
        (&self.en, &self.ar)
    }
}

fn insert_leaf(root: &mut Value, parts: &[&str], value: &str) -> bool {
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };
    let mut node = root;
    for part in parents {
        let Some(map) = node.as_object_mut() else {
            return false;
        };
        node = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    if map.contains_key(*last) {
        return false;
    }
    map.insert(last.to_string(), Value::String(value.to_string()));
    true
}

fn flatten(value: &Value, prefix: String, out: &mut Vec<String>) {
    match value.as_object() {
        Some(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(v, key, out);
            }
        }
        None if !prefix.is_empty() => out.push(prefix),
        None => {}
    }
}

fn write_locale(path: &Path, value: &Value) -> Result<(), CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut json = serde_json::to_string_pretty(value).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');
    fs::write(path, json).map_err(io_err)
}

/// `"home.welcomeMessage"` -> `"Welcome message"`
pub fn humanize_key(key: &str) -> String {
    let leaf = key.rsplit('.').next().unwrap_or(key);
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in leaf.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    let sentence = words.join(" ");
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => leaf.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_has_translation_requires_both() {
        let catalog = TranslationCatalog::from_values(
            json!({"home": {"title": "Home"}}),
            json!({"home": {}}),
        );
        assert!(catalog.has_key(Locale::En, "home.title"));
        assert!(!catalog.has_translation("home.title"));
        assert_eq!(catalog.missing_locales("home.title"), vec![Locale::Ar]);
        assert!(!catalog.has_key(Locale::En, "home"));
    }

    #[test]
    fn test_add_missing_never_overwrites() {
        let mut catalog = TranslationCatalog::from_values(
            json!({"home": {"title": "Home"}, "other": "x"}),
            json!({"home": {"title": "الرئيسية"}}),
        );
        assert!(!catalog.add_missing("home.title", "New", "[AR: New]"));
        assert_eq!(catalog.get(Locale::En, "home.title"), Some(&json!("Home")));

        assert!(catalog.add_missing("home.subtitle", "Subtitle", "[AR: Subtitle]"));
        assert_eq!(catalog.get(Locale::Ar, "home.subtitle"), Some(&json!("[AR: Subtitle]")));
        assert_eq!(catalog.get(Locale::En, "other"), Some(&json!("x")));
    }

    #[test]
    fn test_add_missing_through_leaf_is_skipped() {
        let mut catalog = TranslationCatalog::from_values(json!({"a": "leaf"}), json!({}));
        catalog.add_missing("a.b", "B", "[AR: B]");
        assert_eq!(catalog.get(Locale::En, "a"), Some(&json!("leaf")));
        assert!(catalog.has_key(Locale::Ar, "a.b"));
    }

    #[test]
    fn test_add_missing_idempotent() {
        let mut once = TranslationCatalog::from_values(json!({"x": {"y": "1"}}), json!({}));
        once.add_missing_key("nav.settings.title");
        let mut twice = once.clone();
        assert!(!twice.add_missing_key("nav.settings.title"));
        assert_eq!(once.values(), twice.values());
        assert!(!twice.has_translation("x.y"));
        assert!(twice.has_key(Locale::En, "x.y"));
    }

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("home.welcomeMessage"), "Welcome message");
        assert_eq!(humanize_key("settings.save_button"), "Save button");
        assert_eq!(humanize_key("title"), "Title");
    }

    #[test]
    fn test_keys_flattened() {
        let catalog = TranslationCatalog::from_values(
            json!({"b": {"c": "1", "d": {"e": "2"}}, "a": "0"}),
            json!({}),
        );
        assert_eq!(catalog.keys(Locale::En), vec!["a", "b.c", "b.d.e"]);
    }

    #[test]
    fn test_load_missing_degrades_and_save_creates() {
        let dir = TempDir::new().unwrap();
        let en = dir.path().join("translations/en.json");
        let ar = dir.path().join("translations/ar.json");

        let mut catalog = TranslationCatalog::load(&en, &ar);
        assert!(catalog.keys(Locale::En).is_empty());
        assert!(!catalog.save().unwrap());

        catalog.add_missing_key("home.title");
        assert!(catalog.save().unwrap());

        let reloaded = TranslationCatalog::load(&en, &ar);
        assert!(reloaded.has_translation("home.title"));
        assert_eq!(reloaded.get(Locale::Ar, "home.title"), Some(&json!("[AR: Title]")));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = TempDir::new().unwrap();
        let en = dir.path().join("en.json");
        fs::write(&en, "{ not json").unwrap();
        assert!(matches!(
            TranslationCatalog::read_locale(&en),
            Err(CatalogError::Json { .. })
        ));
    }
}
