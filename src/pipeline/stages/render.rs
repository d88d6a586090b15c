//! Render template expressions in every file's content.
//!
//! Runs last so all prior stages' content is available to the renderer.
//! Files are independent, so the work fans out across the rayon pool; the
//! first failure aborts the stage. Binary (non-UTF-8) records pass through
//! untouched, and content without an opening `{{` is left as-is, which
//! makes the stage the identity on expression-free input.

use handlebars::Handlebars;
use serde_json::Value;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::pipeline::{FileMap, Metadata, Stage};

pub struct Render;

impl Stage for Render {
    fn name(&self) -> &'static str {
        "render"
    }

    fn transform(&self, files: &mut FileMap, metadata: &mut Metadata) -> Result<()> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        let bindings = Value::Object(metadata.clone());

        files.par_iter_mut().try_for_each(|(path, record)| {
            let Some(text) = record.text() else {
                return Ok(());
            };
            if !text.contains("{{") {
                return Ok(());
            }

            let rendered = registry
                .render_template(text, &bindings)
                .map_err(|err| Error::Render {
                    file: path.clone(),
                    source: Box::new(err),
                })?;

            record.contents = rendered.into_bytes();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FileRecord;
    use serde_json::json;

    fn metadata_with_options(options: Value) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("options".into(), options);
        metadata
    }

    #[test]
    fn test_renders_option_references() {
        let mut files = FileMap::new();
        files.insert(
            "README.md".into(),
            FileRecord::new("# {{options.name}}\n\n{{options.description}}\n"),
        );
        let mut metadata =
            metadata_with_options(json!({"name": "my-app", "description": "demo"}));

        Render.transform(&mut files, &mut metadata).unwrap();

        let text = files["README.md"].text().unwrap();
        assert_eq!(text, "# my-app\n\ndemo\n");
    }

    #[test]
    fn test_expression_free_content_unchanged() {
        let mut files = FileMap::new();
        files.insert("plain.txt".into(), FileRecord::new("nothing to render"));
        let before = files["plain.txt"].contents.clone();

        let mut metadata = metadata_with_options(json!({"name": "x"}));
        Render.transform(&mut files, &mut metadata).unwrap();

        assert_eq!(files["plain.txt"].contents, before);
    }

    #[test]
    fn test_binary_content_passes_through() {
        let mut files = FileMap::new();
        files.insert("logo.png".into(), FileRecord::new(vec![0xff, 0xfe, 0x7b, 0x7b]));
        let before = files["logo.png"].contents.clone();

        let mut metadata = metadata_with_options(json!({}));
        Render.transform(&mut files, &mut metadata).unwrap();

        assert_eq!(files["logo.png"].contents, before);
    }

    #[test]
    fn test_missing_keys_render_empty() {
        let mut files = FileMap::new();
        files.insert("a.txt".into(), FileRecord::new("[{{options.absent}}]"));

        let mut metadata = metadata_with_options(json!({}));
        Render.transform(&mut files, &mut metadata).unwrap();

        assert_eq!(files["a.txt"].text().unwrap(), "[]");
    }

    #[test]
    fn test_render_error_names_the_file() {
        let mut files = FileMap::new();
        files.insert("broken.txt".into(), FileRecord::new("{{#if}}dangling"));

        let mut metadata = metadata_with_options(json!({}));
        let err = Render.transform(&mut files, &mut metadata).unwrap_err();

        match err {
            Error::Render { file, .. } => assert_eq!(file, "broken.txt"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_values_are_not_html_escaped() {
        let mut files = FileMap::new();
        files.insert("cmd.sh".into(), FileRecord::new("echo {{options.pipe}}"));

        let mut metadata = metadata_with_options(json!({"pipe": "a && b"}));
        Render.transform(&mut files, &mut metadata).unwrap();

        assert_eq!(files["cmd.sh"].text().unwrap(), "echo a && b");
    }
}
