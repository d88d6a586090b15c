#![forbid(unsafe_code)]

//! # Sprout
//!
//! Template-driven project scaffolding: read any existing project
//! configuration, ask schema-driven questions, run a fixed pipeline of
//! transforms over a template tree, write the result, install dependencies.
//!
//! ## Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sprout::{Generator, JsonMap};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut options = JsonMap::new();
//!     options.insert("name".into(), json!("my-app"));
//!     options.insert("skipInstall".into(), json!(true));
//!
//!     let generator = Generator::new("templates/app", "my-app", options);
//!     let message = generator.generate(JsonMap::new())?;
//!     println!("{message}");
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod context;
pub mod error;
pub mod expr;
pub mod generator;
pub mod install;
pub mod pipeline;
pub mod prompts;

// Re-exports
pub use context::{ConfigBundle, ContextStore, JsonMap};
pub use error::{Error, Result};
pub use generator::Generator;
pub use pipeline::{FileMap, FileRecord, Metadata, Pipeline, Stage};
pub use prompts::{build_questions, load_prompt_specs, PromptSpec, Question, Validation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
