//! The built-in transform stages, one unit per stage.
//!
//! Stages interact only through file paths/contents and metadata keys.
//! Later stages depend on earlier relocations and renames having happened,
//! which is why the generator runs them in a fixed declared order.

mod app_config;
mod descriptor;
mod dotfiles;
mod inject_json;
mod manifest;
mod move_up;
mod rename;
mod render;

pub use app_config::AppConfig;
pub use descriptor::ProjectDescriptor;
pub use dotfiles::Dotfiles;
pub use inject_json::InjectJson;
pub use manifest::PackageManifest;
pub use move_up::MoveUp;
pub use rename::RenameTemplate;
pub use render::Render;

use serde_json::Value;

use crate::context::JsonMap;
use crate::error::{Error, Result};
use crate::pipeline::Metadata;

/// The generation options stored in the shared metadata, or empty.
fn options_object(metadata: &Metadata) -> JsonMap {
    metadata
        .get("options")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// A named fragment captured by the inject-json stage, or empty.
fn source_object(metadata: &Metadata, name: &str) -> JsonMap {
    metadata
        .get(inject_json::SOURCES_KEY)
        .and_then(|sources| sources.get(name))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Parse a template-authored record as a JSON object. Author content is
/// trusted but not assumed well-formed.
fn parse_template_json(path: &str, contents: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(contents).map_err(|_| Error::TemplateData {
        file: path.to_string(),
        reason: "not valid UTF-8".to_string(),
    })?;
    let value: Value = serde_json::from_str(text).map_err(|err| Error::TemplateData {
        file: path.to_string(),
        reason: err.to_string(),
    })?;
    if !value.is_object() {
        return Err(Error::TemplateData {
            file: path.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    }
    Ok(value)
}

/// Pretty-printed JSON with a trailing newline, as written to disk.
fn pretty_json_bytes(value: &Value) -> Vec<u8> {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    text.push('\n');
    text.into_bytes()
}
