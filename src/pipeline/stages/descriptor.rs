//! Record the generation options in the project descriptor.
//!
//! `sprout.json` is what a later run reads back to pre-fill its defaults,
//! so the merged options land here minus the volatile per-invocation keys.

use serde_json::Value;

use crate::error::Result;
use crate::pipeline::merge::deep_merge;
use crate::pipeline::{FileMap, FileRecord, Metadata, Stage};

use super::{options_object, parse_template_json, pretty_json_bytes, source_object};

/// Descriptor file written at the destination root.
pub const DESCRIPTOR_FILE: &str = "sprout.json";

/// Keys that only make sense for the invocation that produced them.
const VOLATILE_KEYS: [&str; 3] = ["root", "template", "skipInstall"];

pub struct ProjectDescriptor;

impl Stage for ProjectDescriptor {
    fn name(&self) -> &'static str {
        "project-descriptor"
    }

    fn transform(&self, files: &mut FileMap, metadata: &mut Metadata) -> Result<()> {
        let mut descriptor = Value::Object(source_object(metadata, "descriptor"));

        if let Some(record) = files.get(DESCRIPTOR_FILE) {
            let template = parse_template_json(DESCRIPTOR_FILE, &record.contents)?;
            deep_merge(&mut descriptor, &template);
        }

        let mut options = options_object(metadata);
        for key in VOLATILE_KEYS {
            options.remove(key);
        }
        deep_merge(&mut descriptor, &Value::Object(options));

        let record = files
            .entry(DESCRIPTOR_FILE.to_string())
            .or_insert_with(FileRecord::default);
        record.contents = pretty_json_bytes(&descriptor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stages::inject_json::SOURCES_KEY;
    use serde_json::json;

    #[test]
    fn test_records_options_minus_volatile_keys() {
        let mut files = FileMap::new();
        let mut metadata = Metadata::new();
        metadata.insert(
            "options".into(),
            json!({
                "name": "my-app",
                "database": "postgres",
                "root": "/tmp/my-app",
                "template": "/templates/app",
                "skipInstall": true
            }),
        );

        ProjectDescriptor.transform(&mut files, &mut metadata).unwrap();

        let descriptor: Value = serde_json::from_slice(&files[DESCRIPTOR_FILE].contents).unwrap();
        assert_eq!(descriptor["name"], json!("my-app"));
        assert_eq!(descriptor["database"], json!("postgres"));
        assert!(descriptor.get("root").is_none());
        assert!(descriptor.get("template").is_none());
        assert!(descriptor.get("skipInstall").is_none());
    }

    #[test]
    fn test_existing_descriptor_keys_survive() {
        let mut files = FileMap::new();
        let mut metadata = Metadata::new();
        metadata.insert("options".into(), json!({"name": "my-app"}));
        metadata.insert(
            SOURCES_KEY.into(),
            json!({"descriptor": {"createdWith": "0.2.0"}}),
        );

        ProjectDescriptor.transform(&mut files, &mut metadata).unwrap();

        let descriptor: Value = serde_json::from_slice(&files[DESCRIPTOR_FILE].contents).unwrap();
        assert_eq!(descriptor["createdWith"], json!("0.2.0"));
        assert_eq!(descriptor["name"], json!("my-app"));
    }
}
