//! Rename the template placeholder file to its real dotfile name.
//!
//! `gitignore.template` exists because a literal `.gitignore` inside a
//! distributable template tree tends to get picked up by packaging tools.

use serde_json::Value;

use crate::error::Result;
use crate::pipeline::{FileMap, Metadata, Stage};

pub struct RenameTemplate {
    from: String,
    to: String,
}

impl RenameTemplate {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        RenameTemplate {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Default for RenameTemplate {
    fn default() -> Self {
        RenameTemplate::new("gitignore.template", ".gitignore")
    }
}

impl Stage for RenameTemplate {
    fn name(&self) -> &'static str {
        "rename-template"
    }

    fn transform(&self, files: &mut FileMap, _metadata: &mut Metadata) -> Result<()> {
        if let Some(mut record) = files.remove(&self.from) {
            record
                .metadata
                .insert("renamedFrom".to_string(), Value::String(self.from.clone()));
            files.insert(self.to.clone(), record);
        }
        Ok(())
    }
}
