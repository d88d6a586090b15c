//! Existing-project context: per-environment configuration, package
//! manifest, and caller-supplied options merged into one read-only lookup.
//!
//! Loads are tolerant by contract. A missing or malformed source file
//! degrades to an empty mapping with a debug log; callers never see the
//! difference.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// JSON object shorthand used throughout the crate.
pub type JsonMap = Map<String, Value>;

/// Per-environment configuration read from an existing project root.
#[derive(Debug, Clone, Default)]
pub struct ConfigBundle {
    pub default: JsonMap,
    pub staging: JsonMap,
    pub production: JsonMap,
}

impl ConfigBundle {
    /// Environment slot names, in the order they are loaded and written.
    pub const SLOTS: [&'static str; 3] = ["default", "staging", "production"];

    /// Read `<root>/config/{default,staging,production}.json`. Never fails.
    pub fn load(root: &Path) -> Self {
        let mut bundle = ConfigBundle::default();
        for slot in Self::SLOTS {
            let path = root.join("config").join(format!("{slot}.json"));
            *bundle.slot_mut(slot) = load_or_default(&path);
        }
        bundle
    }

    pub fn slot(&self, name: &str) -> Option<&JsonMap> {
        match name {
            "default" => Some(&self.default),
            "staging" => Some(&self.staging),
            "production" => Some(&self.production),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> &mut JsonMap {
        match name {
            "default" => &mut self.default,
            "staging" => &mut self.staging,
            "production" => &mut self.production,
            _ => unreachable!("unknown config slot"),
        }
    }
}

/// Merged evaluation context exposed under fixed top-level keys
/// `options`, `config`, and `pkg`.
#[derive(Debug, Clone)]
pub struct ContextStore {
    options: JsonMap,
    config: ConfigBundle,
    pkg: JsonMap,
}

impl ContextStore {
    /// Assemble the context for a project root. Construction never fails;
    /// absent or malformed sources become empty mappings.
    pub fn assemble(root: &Path, options: JsonMap) -> Self {
        let config = ConfigBundle::load(root);
        let pkg = load_or_default(&root.join("package.json"));

        ContextStore {
            options,
            config,
            pkg,
        }
    }

    pub fn options(&self) -> &JsonMap {
        &self.options
    }

    pub fn config(&self) -> &ConfigBundle {
        &self.config
    }

    pub fn pkg(&self) -> &JsonMap {
        &self.pkg
    }

    /// Expression bindings for question evaluation: the fixed keys plus the
    /// answers accumulated so far.
    pub fn bindings(&self, answers: &JsonMap) -> Value {
        let mut root = JsonMap::new();
        root.insert("options".into(), Value::Object(self.options.clone()));
        root.insert("config".into(), self.config_value());
        root.insert("pkg".into(), Value::Object(self.pkg.clone()));
        root.insert("answers".into(), Value::Object(answers.clone()));
        Value::Object(root)
    }

    /// Same as [`bindings`](Self::bindings) with the raw `input` value bound
    /// as well, for `filter`/`validate` expressions.
    pub fn bindings_with_input(&self, answers: &JsonMap, input: &Value) -> Value {
        let mut root = self.bindings(answers);
        if let Some(map) = root.as_object_mut() {
            map.insert("input".into(), input.clone());
        }
        root
    }

    fn config_value(&self) -> Value {
        let mut map = JsonMap::new();
        map.insert("default".into(), Value::Object(self.config.default.clone()));
        map.insert("staging".into(), Value::Object(self.config.staging.clone()));
        map.insert(
            "production".into(),
            Value::Object(self.config.production.clone()),
        );
        Value::Object(map)
    }
}

/// Read a JSON object from disk. Surfaces a [`Error::ConfigLoad`] for the
/// caller to absorb.
pub fn read_json_object(path: &Path) -> Result<JsonMap> {
    let text = std::fs::read_to_string(path).map_err(|err| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(err),
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|err| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(err),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::ConfigLoad {
            path: path.to_path_buf(),
            source: format!("expected a JSON object, got {}", type_name(&other)).into(),
        }),
    }
}

/// Tolerant read: absent or malformed sources yield an empty mapping.
pub fn load_or_default(path: &Path) -> JsonMap {
    if !path.exists() {
        debug!(path = %path.display(), "source does not exist, using empty default");
        return JsonMap::new();
    }

    match read_json_object(path) {
        Ok(map) => map,
        Err(err) => {
            debug!(path = %path.display(), %err, "unreadable source, using empty default");
            JsonMap::new()
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_sources_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContextStore::assemble(dir.path(), JsonMap::new());

        assert!(store.pkg().is_empty());
        assert!(store.config().default.is_empty());
        assert!(store.config().production.is_empty());
    }

    #[test]
    fn test_invalid_json_defaults_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/default.json", "{ not json !");
        write(dir.path(), "package.json", "[1, 2, 3]");

        let store = ContextStore::assemble(dir.path(), JsonMap::new());
        assert!(store.config().default.is_empty());
        assert!(store.pkg().is_empty());
    }

    #[test]
    fn test_existing_sources_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/staging.json", r#"{"host": "example.org"}"#);
        write(dir.path(), "package.json", r#"{"name": "existing-app"}"#);

        let store = ContextStore::assemble(dir.path(), JsonMap::new());
        assert_eq!(store.config().staging["host"], json!("example.org"));
        assert_eq!(store.pkg()["name"], json!("existing-app"));
    }

    #[test]
    fn test_bindings_expose_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = JsonMap::new();
        options.insert("name".into(), json!("my-app"));

        let store = ContextStore::assemble(dir.path(), options);
        let mut answers = JsonMap::new();
        answers.insert("database".into(), json!("postgres"));

        let bindings = store.bindings(&answers);
        assert_eq!(bindings["options"]["name"], json!("my-app"));
        assert_eq!(bindings["answers"]["database"], json!("postgres"));
        assert!(bindings["config"]["default"].is_object());
        assert!(bindings["pkg"].is_object());

        let with_input = store.bindings_with_input(&answers, &json!("raw"));
        assert_eq!(with_input["input"], json!("raw"));
    }
}
