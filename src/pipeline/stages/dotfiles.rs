//! Dotfile content normalization.
//!
//! After the move-up stage, top-level files named like well-known dotfiles
//! but missing the leading dot gain one (`npmrc` → `.npmrc`), and every
//! dotfile's text content is normalized to end with a single newline.

use serde_json::Value;

use crate::error::Result;
use crate::pipeline::{FileMap, Metadata, Stage};

/// Stems that are dotfiles by convention when they land at the tree root.
const DOTFILE_STEMS: [&str; 6] = [
    "gitignore",
    "npmrc",
    "editorconfig",
    "env",
    "eslintrc",
    "babelrc",
];

pub struct Dotfiles;

impl Stage for Dotfiles {
    fn name(&self) -> &'static str {
        "dotfiles"
    }

    fn transform(&self, files: &mut FileMap, _metadata: &mut Metadata) -> Result<()> {
        let renames: Vec<String> = files
            .keys()
            .filter(|path| !path.contains('/') && DOTFILE_STEMS.contains(&path.as_str()))
            .cloned()
            .collect();

        for path in renames {
            if let Some(mut record) = files.remove(&path) {
                record
                    .metadata
                    .insert("renamedFrom".to_string(), Value::String(path.clone()));
                files.insert(format!(".{path}"), record);
            }
        }

        for (path, record) in files.iter_mut() {
            let basename = path.rsplit('/').next().unwrap_or(path.as_str());
            if !basename.starts_with('.') {
                continue;
            }
            if let Some(text) = record.text() {
                if !text.is_empty() {
                    let normalized = format!("{}\n", text.trim_end_matches('\n'));
                    record.contents = normalized.into_bytes();
                }
            }
        }

        Ok(())
    }
}
