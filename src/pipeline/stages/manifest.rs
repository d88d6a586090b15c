//! Derive the final package manifest.
//!
//! The template's `package.json` is deep-merged over whatever manifest the
//! project already has on disk, then scaffold fields derived from the
//! generation options fill any remaining gaps. Runs only when the template
//! ships a manifest or the project already has one; a template tree with
//! no manifest stays manifest-free.

use serde_json::Value;

use crate::error::Result;
use crate::pipeline::merge::deep_merge;
use crate::pipeline::{FileMap, FileRecord, Metadata, Stage};

use super::{options_object, parse_template_json, pretty_json_bytes, source_object};

const MANIFEST_FILE: &str = "package.json";
const DEFAULT_VERSION: &str = "0.1.0";

pub struct PackageManifest;

impl Stage for PackageManifest {
    fn name(&self) -> &'static str {
        "package-manifest"
    }

    fn transform(&self, files: &mut FileMap, metadata: &mut Metadata) -> Result<()> {
        let existing = source_object(metadata, "pkg");
        let template = match files.get(MANIFEST_FILE) {
            Some(record) => Some(parse_template_json(MANIFEST_FILE, &record.contents)?),
            None => None,
        };

        if template.is_none() && existing.is_empty() {
            return Ok(());
        }

        let mut manifest = Value::Object(existing);
        if let Some(template) = template {
            deep_merge(&mut manifest, &template);
        }

        let options = options_object(metadata);
        if let Some(map) = manifest.as_object_mut() {
            for key in ["name", "description"] {
                if !map.contains_key(key) {
                    if let Some(value) = options.get(key).filter(|v| !v.is_null()) {
                        map.insert(key.to_string(), value.clone());
                    }
                }
            }
            map.entry("version")
                .or_insert_with(|| Value::String(DEFAULT_VERSION.to_string()));
        }

        let record = files.entry(MANIFEST_FILE.to_string()).or_insert_with(FileRecord::default);
        record.contents = pretty_json_bytes(&manifest);
        Ok(())
    }
}
