//! Question construction against real template trees and project roots.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use sprout::{Error, Generator, JsonMap, Validation};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn options(pairs: &[(&str, Value)]) -> JsonMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_builtin_schema_builds_questions() {
    let template = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();

    let generator = Generator::new(template.path(), dest.path(), JsonMap::new());
    let questions = generator.questions().unwrap();

    assert!(!questions.is_empty());
    assert_eq!(questions[0].name, "name");
}

#[test]
fn test_template_override_replaces_builtin_schema() {
    let template = tempfile::tempdir().unwrap();
    write(
        template.path(),
        "sprout.prompts.json",
        r#"{
            "prompts": [
                {"name": "flavor", "message": "Flavor?"},
                {"name": "topping", "message": "Topping?",
                 "when": "answers.flavor == 'vanilla'"}
            ]
        }"#,
    );
    let dest = tempfile::tempdir().unwrap();

    let generator = Generator::new(template.path(), dest.path(), JsonMap::new());
    let questions = generator.questions().unwrap();

    let names: Vec<_> = questions.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, ["flavor", "topping"]);
}

#[test]
fn test_conditional_question_follows_accumulated_answers() {
    let template = tempfile::tempdir().unwrap();
    write(
        template.path(),
        "sprout.prompts.json",
        r#"{
            "prompts": [
                {"name": "database", "message": "Database?"},
                {"name": "connection", "message": "Connection string?",
                 "when": "answers.database != 'memory'",
                 "default": "answers.database + '://localhost/app'"}
            ]
        }"#,
    );
    let dest = tempfile::tempdir().unwrap();

    let generator = Generator::new(template.path(), dest.path(), JsonMap::new());
    let questions = generator.questions().unwrap();
    let ctx = generator.context();

    let mut answers = options(&[("database", json!("memory"))]);
    assert!(!questions[1].should_ask(ctx, &answers).unwrap());

    answers.insert("database".into(), json!("postgres"));
    assert!(questions[1].should_ask(ctx, &answers).unwrap());
    assert_eq!(
        questions[1].default_value(ctx, &answers).unwrap(),
        Some(json!("postgres://localhost/app"))
    );
}

#[test]
fn test_defaults_read_saved_options_and_existing_manifest() {
    let template = tempfile::tempdir().unwrap();
    write(
        template.path(),
        "sprout.prompts.json",
        r#"{
            "prompts": [
                {"name": "name", "message": "Name?"},
                {"name": "version", "message": "Version?", "default": "pkg.version"}
            ]
        }"#,
    );

    let dest = tempfile::tempdir().unwrap();
    write(dest.path(), "package.json", r#"{"version": "2.3.4"}"#);

    let generator = Generator::new(
        template.path(),
        dest.path(),
        options(&[("name", json!("saved-name"))]),
    );
    let questions = generator.questions().unwrap();
    let ctx = generator.context();

    // no declared default: falls back to the saved option of the same name
    assert_eq!(
        questions[0].default_value(ctx, &JsonMap::new()).unwrap(),
        Some(json!("saved-name"))
    );
    // declared default: evaluated against the existing manifest
    assert_eq!(
        questions[1].default_value(ctx, &JsonMap::new()).unwrap(),
        Some(json!("2.3.4"))
    );
}

#[test]
fn test_invalid_prompt_schema_fails_whole_build() {
    let template = tempfile::tempdir().unwrap();
    write(
        template.path(),
        "sprout.prompts.json",
        r#"{
            "prompts": [
                {"name": "good", "message": "Fine?"},
                {"message": "No name here"}
            ]
        }"#,
    );
    let dest = tempfile::tempdir().unwrap();

    let generator = Generator::new(template.path(), dest.path(), JsonMap::new());
    let err = generator.questions().unwrap_err();
    assert!(matches!(err, Error::InvalidPrompt { .. }));
}

#[test]
fn test_validate_and_filter_round_trip() {
    let template = tempfile::tempdir().unwrap();
    write(
        template.path(),
        "sprout.prompts.json",
        r#"{
            "prompts": [
                {"name": "name", "message": "Name?",
                 "validate": "input != '' || 'A name is required'",
                 "filter": "'app-' + input"}
            ]
        }"#,
    );
    let dest = tempfile::tempdir().unwrap();

    let generator = Generator::new(template.path(), dest.path(), JsonMap::new());
    let questions = generator.questions().unwrap();
    let ctx = generator.context();
    let answers = JsonMap::new();

    assert_eq!(
        questions[0].check(ctx, &answers, &json!("")).unwrap(),
        Validation::Invalid("A name is required".to_string())
    );
    assert_eq!(
        questions[0].check(ctx, &answers, &json!("shop")).unwrap(),
        Validation::Valid
    );
    assert_eq!(
        questions[0]
            .apply_filter(ctx, &answers, &json!("shop"))
            .unwrap(),
        json!("app-shop")
    );
}
