//! Declarative prompt schema and its runtime-evaluatable form.
//!
//! A [`PromptSpec`] is pure data out of a JSON schema file; a [`Question`]
//! is the same prompt with its `default`/`when`/`filter`/`validate` fields
//! ready to evaluate against the context store and accumulated answers.
//! Evaluation goes through one explicit evaluator call per field; there are
//! no closures capturing shared state.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::context::{ContextStore, JsonMap};
use crate::error::{Error, Result};
use crate::expr;

/// File name of a per-template prompt schema override.
pub const PROMPTS_FILE: &str = "sprout.prompts.json";

/// Built-in prompt schema, compiled into the binary.
const DEFAULT_SCHEMA: &str = include_str!("../schema/prompts.defaults.json");

/// One declarative prompt out of a schema file. `name` and `message` are
/// required; the expression fields and any extra UI fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    pub default: Option<String>,
    pub when: Option<String>,
    pub filter: Option<String>,
    pub validate: Option<String>,
    /// Passthrough UI fields (`type`, `choices`, ...), untouched by the
    /// builder.
    #[serde(flatten)]
    pub extra: JsonMap,
}

#[derive(Debug, Deserialize)]
struct PromptSchema {
    prompts: Vec<PromptSpec>,
}

/// How a question's default is produced.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    /// Fixed value taken from `options[name]` at build time.
    Static(Value),
    /// Expression evaluated against the accumulated answers at ask time.
    Expr(String),
}

/// Outcome of a `validate` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

/// Runtime form of a [`PromptSpec`]. Absent `when`/`filter`/`validate`
/// mean "always ask", "store input unmodified", and "accept anything".
#[derive(Debug, Clone)]
pub struct Question {
    pub name: String,
    pub message: String,
    pub default: Option<DefaultValue>,
    pub when: Option<String>,
    pub filter: Option<String>,
    pub validate: Option<String>,
    pub extra: JsonMap,
}

impl Question {
    /// Compute the default shown for this question, if any.
    pub fn default_value(&self, ctx: &ContextStore, answers: &JsonMap) -> Result<Option<Value>> {
        match &self.default {
            None => Ok(None),
            Some(DefaultValue::Static(value)) => Ok(Some(value.clone())),
            Some(DefaultValue::Expr(source)) => {
                let value = expr::evaluate(source, &ctx.bindings(answers))?;
                Ok(Some(value))
            }
        }
    }

    /// Whether this question should be asked given the answers so far.
    pub fn should_ask(&self, ctx: &ContextStore, answers: &JsonMap) -> Result<bool> {
        match &self.when {
            None => Ok(true),
            Some(source) => {
                let value = expr::evaluate(source, &ctx.bindings(answers))?;
                Ok(expr::truthy(&value))
            }
        }
    }

    /// Transform raw input into the stored answer value.
    pub fn apply_filter(
        &self,
        ctx: &ContextStore,
        answers: &JsonMap,
        input: &Value,
    ) -> Result<Value> {
        match &self.filter {
            None => Ok(input.clone()),
            Some(source) => expr::evaluate(source, &ctx.bindings_with_input(answers, input)),
        }
    }

    /// Check raw input. `true` (or any truthy non-string value) accepts; a
    /// string result is the rejection message; falsy rejects generically.
    pub fn check(&self, ctx: &ContextStore, answers: &JsonMap, input: &Value) -> Result<Validation> {
        let Some(source) = &self.validate else {
            return Ok(Validation::Valid);
        };

        let value = expr::evaluate(source, &ctx.bindings_with_input(answers, input))?;
        Ok(match value {
            Value::Bool(true) => Validation::Valid,
            Value::String(message) => Validation::Invalid(message),
            other if expr::truthy(&other) => Validation::Valid,
            _ => Validation::Invalid("Invalid input".to_string()),
        })
    }
}

/// Build runtime questions from prompt specs, preserving order. Fails as a
/// whole on the first spec missing `name` or `message`, with no partial list.
pub fn build_questions(specs: &[PromptSpec], ctx: &ContextStore) -> Result<Vec<Question>> {
    specs
        .iter()
        .map(|spec| {
            if spec.name.is_empty() {
                return Err(Error::InvalidPrompt {
                    name: None,
                    reason: "a prompt must provide a 'name'".to_string(),
                });
            }
            if spec.message.is_empty() {
                return Err(Error::InvalidPrompt {
                    name: Some(spec.name.clone()),
                    reason: format!("prompt '{}' must provide a 'message'", spec.name),
                });
            }

            // An explicit default expression wins; otherwise fall back to a
            // previously saved option of the same name.
            let default = match &spec.default {
                Some(source) => Some(DefaultValue::Expr(source.clone())),
                None => ctx
                    .options()
                    .get(&spec.name)
                    .cloned()
                    .map(DefaultValue::Static),
            };

            Ok(Question {
                name: spec.name.clone(),
                message: spec.message.clone(),
                default,
                when: spec.when.clone(),
                filter: spec.filter.clone(),
                validate: spec.validate.clone(),
                extra: spec.extra.clone(),
            })
        })
        .collect()
}

/// Load prompt specs: the template's `sprout.prompts.json` when present,
/// the built-in schema otherwise. An unreadable override is an author
/// error and fails loudly, unlike ambient config.
pub fn load_prompt_specs(template_root: &Path) -> Result<Vec<PromptSpec>> {
    let override_path = template_root.join(PROMPTS_FILE);
    let text = if override_path.exists() {
        std::fs::read_to_string(&override_path).map_err(|err| Error::InvalidPrompt {
            name: None,
            reason: format!("cannot read {}: {err}", override_path.display()),
        })?
    } else {
        DEFAULT_SCHEMA.to_string()
    };

    let schema: PromptSchema = serde_json::from_str(&text).map_err(|err| Error::InvalidPrompt {
        name: None,
        reason: format!("malformed prompt schema: {err}"),
    })?;

    Ok(schema.prompts)
}
