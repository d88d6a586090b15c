//! Orchestrates a scaffolding run: context assembly, question building,
//! and the generate pass over the template tree.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::context::{ContextStore, JsonMap};
use crate::error::Result;
use crate::expr;
use crate::install;
use crate::pipeline::stages::{
    AppConfig, Dotfiles, InjectJson, MoveUp, PackageManifest, ProjectDescriptor, RenameTemplate,
    Render,
};
use crate::pipeline::{Metadata, Pipeline, Stage};
use crate::prompts::{self, Question};

/// Descriptor file consulted at the destination root.
const DESCRIPTOR_SOURCE: &str = "sprout.json";

pub struct Generator {
    options: JsonMap,
    context: ContextStore,
    template_root: PathBuf,
    dest_root: PathBuf,
}

impl Generator {
    /// Assemble a generator for one destination root. Reads the existing
    /// project's config/manifest sources once; never fails, since absent or
    /// malformed sources degrade to empty defaults.
    pub fn new(
        template_root: impl Into<PathBuf>,
        dest_root: impl Into<PathBuf>,
        options: JsonMap,
    ) -> Self {
        let dest_root = dest_root.into();
        let context = ContextStore::assemble(&dest_root, options.clone());

        Generator {
            options,
            context,
            template_root: template_root.into(),
            dest_root,
        }
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Build the runtime question list from the template's prompt schema
    /// (or the built-in one).
    pub fn questions(&self) -> Result<Vec<Question>> {
        let specs = prompts::load_prompt_specs(&self.template_root)?;
        prompts::build_questions(&specs, &self.context)
    }

    /// Run the pipeline with the collected answers merged into the options,
    /// write the result, and install dependencies. Returns the completion
    /// message on success.
    pub fn generate(&self, answers: JsonMap) -> Result<String> {
        let mut options = self.options.clone();
        options.extend(answers);
        debug!(?options, "options after questions");

        let mut metadata = Metadata::new();
        metadata.insert("options".to_string(), Value::Object(options.clone()));

        let pipeline = Pipeline::new(&self.template_root, &self.dest_root);
        pipeline.run(&self.stages(), &mut metadata)?;

        let name = options
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("project");
        let package_manager = options
            .get("packageManager")
            .and_then(Value::as_str)
            .unwrap_or("npm")
            .to_string();

        let skip_install = options
            .get("skipInstall")
            .map(expr::truthy)
            .unwrap_or(false);
        if skip_install {
            debug!("skipping dependency installation");
        } else {
            install::run(&self.dest_root, &package_manager)?;
        }

        Ok(format!(
            "Your new project \"{name}\" has been created.\n\
             Change into '{root}' and start it with '{package_manager} start'.",
            root = self.dest_root.display(),
        ))
    }

    /// The fixed stage list. Later stages depend on earlier relocations and
    /// renames, so the order is part of the contract.
    fn stages(&self) -> Vec<Box<dyn Stage>> {
        vec![
            Box::new(MoveUp::default()),
            Box::new(RenameTemplate::default()),
            Box::new(InjectJson::new(self.json_sources())),
            Box::new(Dotfiles),
            Box::new(PackageManifest),
            Box::new(ProjectDescriptor),
            Box::new(AppConfig),
            Box::new(Render),
        ]
    }

    fn json_sources(&self) -> Vec<(String, PathBuf)> {
        let root = &self.dest_root;
        let mut sources = vec![
            ("default".to_string(), root.join("config/default.json")),
            ("staging".to_string(), root.join("config/staging.json")),
            (
                "production".to_string(),
                root.join("config/production.json"),
            ),
            ("pkg".to_string(), root.join("package.json")),
            ("descriptor".to_string(), root.join(DESCRIPTOR_SOURCE)),
        ];

        let meta = self.template_root.join(prompts::PROMPTS_FILE);
        if meta.exists() {
            sources.push(("meta".to_string(), meta));
        }

        sources
    }
}
