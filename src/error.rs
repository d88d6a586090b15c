//! Error taxonomy for scaffolding runs.
//!
//! Configuration loads are the one soft spot: `ConfigLoad` is constructed by
//! the context store, logged, and absorbed into empty defaults. Everything
//! else aborts the operation and surfaces to the caller unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A config/manifest source could not be read or parsed. Never surfaced
    /// past the context store; callers continue with empty defaults.
    #[error("failed to load {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A prompt spec is missing a required field. Aborts question
    /// construction with no partial list.
    #[error("invalid prompt: {reason}")]
    InvalidPrompt {
        name: Option<String>,
        reason: String,
    },

    /// An expression could not be parsed or evaluated.
    #[error("failed to evaluate '{expr}': {reason}")]
    Evaluation { expr: String, reason: String },

    /// The template tree could not be loaded.
    #[error("failed to load template tree at {path}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline stage failed. Aborts the run before anything touches disk.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// A file's content failed to render as a template.
    #[error("failed to render {file}: {source}")]
    Render {
        file: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// Persisting a generated file failed. Remaining writes are abandoned.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The post-generation install step failed. The generated files are
    /// already on disk at this point.
    #[error("install command '{command}' failed: {reason}")]
    Install { command: String, reason: String },

    /// Malformed template-authored data (e.g. invalid JSON in a template's
    /// config file). Author content is trusted but not assumed well-formed.
    #[error("invalid template data in {file}: {reason}")]
    TemplateData { file: String, reason: String },
}

impl Error {
    /// Wrap a stage failure with the stage's identity, leaving render and
    /// write failures untouched so they keep their more specific context.
    pub(crate) fn in_stage(self, stage: &'static str) -> Error {
        match self {
            err @ (Error::Render { .. } | Error::Write { .. }) => err,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }
}
