//! The file pipeline: load a template tree into memory, run an ordered list
//! of transform stages over it, write the result to the destination root.
//!
//! Stages interact only through the [`FileMap`] and the shared metadata
//! mapping, never through each other, so individual stages can be tested,
//! added, or reordered in isolation. Any stage failure aborts the run
//! before the write phase begins; nothing touches disk on failure.

pub mod merge;
pub mod stages;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::context::JsonMap;
use crate::error::{Error, Result};

/// In-memory mapping of relative output path to file record. BTreeMap keeps
/// stage iteration deterministic.
pub type FileMap = BTreeMap<String, FileRecord>;

/// Shared context mapping visible to every stage and the renderer.
pub type Metadata = JsonMap;

/// One file flowing through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    pub contents: Vec<u8>,
    pub metadata: JsonMap,
}

impl FileRecord {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        FileRecord {
            contents: contents.into(),
            metadata: JsonMap::new(),
        }
    }

    /// Content as text, when it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// One named transform step.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn transform(&self, files: &mut FileMap, metadata: &mut Metadata) -> Result<()>;
}

/// Executes the fixed stage list over a template tree.
pub struct Pipeline {
    template_root: PathBuf,
    dest_root: PathBuf,
}

impl Pipeline {
    pub fn new(template_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Pipeline {
            template_root: template_root.into(),
            dest_root: dest_root.into(),
        }
    }

    /// Load, transform, persist. Stage failures surface with the stage's
    /// identity; render and write failures keep their file/path context.
    pub fn run(&self, pipeline_stages: &[Box<dyn Stage>], metadata: &mut Metadata) -> Result<()> {
        let mut files = self.load()?;
        debug!(count = files.len(), root = %self.template_root.display(), "loaded template tree");

        for stage in pipeline_stages {
            stage
                .transform(&mut files, metadata)
                .map_err(|err| err.in_stage(stage.name()))?;
            debug!(stage = stage.name(), files = files.len(), "applied stage");
        }

        self.write(&files)
    }

    /// Read the template tree into a [`FileMap`] keyed by forward-slash
    /// relative paths.
    pub fn load(&self) -> Result<FileMap> {
        let mut files = FileMap::new();

        for entry in WalkDir::new(&self.template_root).follow_links(true) {
            let entry = entry.map_err(|err| Error::TemplateLoad {
                path: self.template_root.clone(),
                source: err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk error")),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&self.template_root)
                .expect("walked path is under the template root");
            let key = normalize_path(rel);

            let contents = std::fs::read(entry.path()).map_err(|err| Error::TemplateLoad {
                path: entry.path().to_path_buf(),
                source: err,
            })?;

            files.insert(key, FileRecord::new(contents));
        }

        Ok(files)
    }

    /// Persist every record under the destination root. The first I/O
    /// failure aborts the remaining writes.
    fn write(&self, files: &FileMap) -> Result<()> {
        for (rel, record) in files {
            let path = self.dest_root.join(Path::new(rel));

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|err| Error::Write {
                    path: path.clone(),
                    source: err,
                })?;
            }

            std::fs::write(&path, &record.contents).map_err(|err| Error::Write {
                path: path.clone(),
                source: err,
            })?;
        }

        debug!(count = files.len(), root = %self.dest_root.display(), "wrote generated files");
        Ok(())
    }
}

fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
