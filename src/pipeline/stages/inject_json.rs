//! Surface existing on-disk JSON state to the rest of the pipeline.
//!
//! Each named source file is parsed tolerantly (absent or malformed means
//! skipped with a debug log) and stored under the shared metadata's
//! `sources` key, so the manifest/config stages can merge against what the
//! project already has.

use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::context::{load_or_default, JsonMap};
use crate::error::Result;
use crate::pipeline::{FileMap, Metadata, Stage};

/// Metadata key the fragments land under.
pub const SOURCES_KEY: &str = "sources";

pub struct InjectJson {
    sources: Vec<(String, PathBuf)>,
}

impl InjectJson {
    pub fn new(sources: Vec<(String, PathBuf)>) -> Self {
        InjectJson { sources }
    }
}

impl Stage for InjectJson {
    fn name(&self) -> &'static str {
        "inject-json"
    }

    fn transform(&self, _files: &mut FileMap, metadata: &mut Metadata) -> Result<()> {
        let mut fragments = JsonMap::new();

        for (name, path) in &self.sources {
            let value = load_or_default(path);
            debug!(source = %name, path = %path.display(), keys = value.len(), "injected json source");
            fragments.insert(name.clone(), Value::Object(value));
        }

        metadata.insert(SOURCES_KEY.to_string(), Value::Object(fragments));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_existing_and_defaults_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"name": "existing"}"#).unwrap();

        let stage = InjectJson::new(vec![
            ("pkg".to_string(), dir.path().join("package.json")),
            ("descriptor".to_string(), dir.path().join("sprout.json")),
        ]);

        let mut metadata = Metadata::new();
        stage.transform(&mut FileMap::new(), &mut metadata).unwrap();

        let sources = &metadata[SOURCES_KEY];
        assert_eq!(sources["pkg"]["name"], json!("existing"));
        assert_eq!(sources["descriptor"], json!({}));
    }

    #[test]
    fn test_malformed_source_defaults_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "no json here").unwrap();

        let stage = InjectJson::new(vec![(
            "pkg".to_string(),
            dir.path().join("package.json"),
        )]);

        let mut metadata = Metadata::new();
        stage.transform(&mut FileMap::new(), &mut metadata).unwrap();
        assert_eq!(metadata[SOURCES_KEY]["pkg"], json!({}));
    }
}
