//! Implements `sprout new`: collect answers interactively, generate, report.

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use serde_json::Value;

use crate::context::JsonMap;
use crate::expr;
use crate::generator::Generator;
use crate::prompts::{Question, Validation};

/// Options for the new command
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    /// Project name
    pub name: Option<String>,
    /// Destination root
    pub root: PathBuf,
    /// Template tree to scaffold from
    pub template: PathBuf,
    /// Short project description
    pub description: Option<String>,
    /// Package manager for the install step
    pub package_manager: Option<String>,
    /// Accept every default without prompting
    pub yes: bool,
    /// Skip the dependency install step
    pub no_install: bool,
}

/// Execute the new command
pub fn execute_new(options: NewOptions) -> Result<()> {
    if !options.template.is_dir() {
        bail!(
            "template directory {} does not exist",
            options.template.display()
        );
    }

    let generator = Generator::new(
        &options.template,
        &options.root,
        build_options(&options),
    );

    let questions = generator.questions()?;
    let answers = collect_answers(&generator, &questions, options.yes)?;

    println!("{} Generating project...", style("→").dim());
    let message = generator.generate(answers)?;

    println!("\n{} {}", style("✓").green(), message);
    Ok(())
}

fn build_options(options: &NewOptions) -> JsonMap {
    let mut map = JsonMap::new();
    if let Some(name) = &options.name {
        map.insert("name".to_string(), Value::String(name.clone()));
    }
    if let Some(description) = &options.description {
        map.insert("description".to_string(), Value::String(description.clone()));
    }
    if let Some(pm) = &options.package_manager {
        map.insert("packageManager".to_string(), Value::String(pm.clone()));
    }
    map.insert(
        "root".to_string(),
        Value::String(options.root.display().to_string()),
    );
    map.insert(
        "template".to_string(),
        Value::String(options.template.display().to_string()),
    );
    map.insert("skipInstall".to_string(), Value::Bool(options.no_install));
    map
}

/// Walk the questions in order, accumulating answers. With `accept_defaults`
/// no prompt is shown; each question's default is validated and stored.
fn collect_answers(
    generator: &Generator,
    questions: &[Question],
    accept_defaults: bool,
) -> Result<JsonMap> {
    let ctx = generator.context();
    let mut answers = JsonMap::new();

    for question in questions {
        if !question.should_ask(ctx, &answers)? {
            continue;
        }

        let default = question.default_value(ctx, &answers)?;

        let raw = if accept_defaults {
            let value = default.unwrap_or(Value::Null);
            match question.check(ctx, &answers, &value)? {
                Validation::Valid => value,
                Validation::Invalid(message) => {
                    bail!("default for '{}' is not usable: {message}", question.name)
                }
            }
        } else {
            ask(question, ctx, &answers, default)?
        };

        let stored = question.apply_filter(ctx, &answers, &raw)?;
        answers.insert(question.name.clone(), stored);
    }

    Ok(answers)
}

/// Show one prompt, re-asking until its `validate` expression accepts.
fn ask(
    question: &Question,
    ctx: &crate::context::ContextStore,
    answers: &JsonMap,
    default: Option<Value>,
) -> Result<Value> {
    let theme = ColorfulTheme::default();
    let kind = question
        .extra
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("input");

    match kind {
        "confirm" => {
            let initial = default.as_ref().map(expr::truthy).unwrap_or(false);
            let value = Confirm::with_theme(&theme)
                .with_prompt(question.message.clone())
                .default(initial)
                .interact()?;
            Ok(Value::Bool(value))
        }
        "list" => {
            let choices: Vec<String> = question
                .extra
                .get("choices")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            if choices.is_empty() {
                bail!("prompt '{}' is a list without choices", question.name);
            }

            let initial = default
                .as_ref()
                .and_then(Value::as_str)
                .and_then(|d| choices.iter().position(|c| c == d))
                .unwrap_or(0);

            let index = Select::with_theme(&theme)
                .with_prompt(question.message.clone())
                .items(&choices)
                .default(initial)
                .interact()?;
            Ok(Value::String(choices[index].clone()))
        }
        _ => loop {
            let mut input =
                Input::<String>::with_theme(&theme).with_prompt(question.message.clone());
            if let Some(default) = &default {
                input = input.default(display_value(default)).show_default(true);
            }
            let text = input.allow_empty(true).interact_text()?;
            let value = Value::String(text);

            match question.check(ctx, answers, &value)? {
                Validation::Valid => return Ok(value),
                Validation::Invalid(message) => {
                    eprintln!("{} {message}", style("✗").red());
                }
            }
        },
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
