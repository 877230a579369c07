//! Tests for DocumentService against the real filesystem

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use pathtree::application::services::{Document, DocumentFormat, DocumentService};
use pathtree::application::ApplicationError;
use pathtree::domain::{Tree, Value};
use pathtree::infrastructure::traits::RealFileSystem;

fn service(json_pretty: bool) -> DocumentService {
    DocumentService::new(Arc::new(RealFileSystem), json_pretty)
}

fn tree(value: serde_json::Value) -> Tree {
    Value::from(value).into_tree().expect("mapping")
}

#[test]
fn given_yaml_with_header_when_save_then_load_preserves_header_and_tree() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("app.yml");
    fs::write(
        &path,
        "# Generated by deploy\n# edit with care\n---\nserver:\n  host: example.org\n  port: 443\n",
    )
    .unwrap();
    let service = service(true);

    // Act
    let document = service.load(&path).unwrap();
    let copy = temp.path().join("copy.yaml");
    service.save(&document, &copy).unwrap();
    let reloaded = service.load(&copy).unwrap();

    // Assert
    assert_eq!(
        document.header.as_deref(),
        Some("# Generated by deploy\n# edit with care")
    );
    assert_eq!(
        document.tree,
        tree(json!({"server": {"host": "example.org", "port": 443}}))
    );
    assert_eq!(reloaded, document);
    assert!(fs::read_to_string(&copy)
        .unwrap()
        .starts_with("# Generated by deploy\n# edit with care\n---\n"));
}

#[test]
fn given_nested_output_path_when_saving_then_creates_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out/nested/result.json");
    let document = Document::new(tree(json!({"a": [1, 2]})));

    service(false).save(&document, &path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":[1,2]}\n");
}

#[test]
fn given_header_when_saving_json_then_header_dropped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.json");
    let document = Document::new(tree(json!({"a": 1}))).with_header(Some("# note".to_string()));

    let service = service(true);
    service.save(&document, &path).unwrap();
    let reloaded = service.load(&path).unwrap();

    assert_eq!(reloaded.header, None);
    assert_eq!(reloaded.tree, document.tree);
}

#[test]
fn given_missing_file_when_loading_then_document_not_found() {
    let temp = TempDir::new().unwrap();
    let result = service(true).load(&temp.path().join("missing.yml"));
    assert!(matches!(result, Err(ApplicationError::DocumentNotFound(_))));
}

#[test]
fn given_malformed_json_when_loading_then_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.json");
    fs::write(&path, "{\"a\": ").unwrap();

    let result = service(true).load(&path);

    assert!(matches!(result, Err(ApplicationError::Parse { .. })));
}

#[test]
fn given_missing_file_when_load_or_create_then_template_written_once() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state/settings.yml");
    let template = tree(json!({"retries": 3}));
    let service = service(true);

    let created = service.load_or_create(&path, &template).unwrap();
    fs::write(&path, "retries: 5\n").unwrap();
    let existing = service.load_or_create(&path, &template).unwrap();

    assert_eq!(created.tree, template);
    assert_eq!(existing.tree, tree(json!({"retries": 5})));
}

#[test]
fn given_value_when_rendering_then_honours_format() {
    let service = service(true);
    let value = Value::from(json!({"a": {"b": 1}}));

    let yaml = service.render(&value, DocumentFormat::Yaml).unwrap();
    let json = service.render(&value, DocumentFormat::Json).unwrap();

    assert_eq!(yaml, "a:\n  b: 1\n");
    assert_eq!(json, "{\n  \"a\": {\n    \"b\": 1\n  }\n}\n");
}
