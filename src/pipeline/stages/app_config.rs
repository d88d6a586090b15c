//! Derive per-environment configuration files.
//!
//! For every `config/<env>.json` the template ships, the existing on-disk
//! configuration of the same environment is deep-merged on top, so user
//! edits to an already-generated project survive a re-run.

use serde_json::Value;

use crate::context::ConfigBundle;
use crate::error::Result;
use crate::pipeline::merge::deep_merge;
use crate::pipeline::{FileMap, Metadata, Stage};

use super::{parse_template_json, pretty_json_bytes, source_object};

pub struct AppConfig;

impl Stage for AppConfig {
    fn name(&self) -> &'static str {
        "app-config"
    }

    fn transform(&self, files: &mut FileMap, metadata: &mut Metadata) -> Result<()> {
        for slot in ConfigBundle::SLOTS {
            let path = format!("config/{slot}.json");
            let Some(record) = files.get_mut(&path) else {
                continue;
            };

            let mut config = parse_template_json(&path, &record.contents)?;
            let existing = source_object(metadata, slot);
            deep_merge(&mut config, &Value::Object(existing));

            record.contents = pretty_json_bytes(&config);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::inject_json::SOURCES_KEY;
    use crate::pipeline::FileRecord;
    use serde_json::json;

    #[test]
    fn test_existing_config_wins_over_template() {
        let mut files = FileMap::new();
        files.insert(
            "config/default.json".into(),
            FileRecord::new(r#"{"host": "localhost", "port": 3030}"#),
        );

        let mut metadata = Metadata::new();
        metadata.insert(
            SOURCES_KEY.into(),
            json!({"default": {"port": 8080}}),
        );

        AppConfig.transform(&mut files, &mut metadata).unwrap();

        let config: Value =
            serde_json::from_slice(&files["config/default.json"].contents).unwrap();
        assert_eq!(config["host"], json!("localhost"));
        assert_eq!(config["port"], json!(8080));
    }

    #[test]
    fn test_slots_without_template_file_are_skipped() {
        let mut files = FileMap::new();
        files.insert(
            "config/production.json".into(),
            FileRecord::new(r#"{"host": "example.com"}"#),
        );

        let mut metadata = Metadata::new();
        AppConfig.transform(&mut files, &mut metadata).unwrap();

        assert!(!files.contains_key("config/default.json"));
        assert!(!files.contains_key("config/staging.json"));
        let config: Value =
            serde_json::from_slice(&files["config/production.json"].contents).unwrap();
        assert_eq!(config["host"], json!("example.com"));
    }

    #[test]
    fn test_malformed_template_config_is_fatal() {
        let mut files = FileMap::new();
        files.insert("config/default.json".into(), FileRecord::new("oops"));

        let mut metadata = Metadata::new();
        assert!(AppConfig.transform(&mut files, &mut metadata).is_err());
    }
}
