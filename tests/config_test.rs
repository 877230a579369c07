//! Integration tests for Settings layered loading.
//!
//! These tests use temp directories as project dirs. They do not touch
//! `PATHTREE_*` environment variables, which would leak across parallel tests.

use std::fs;

use tempfile::TempDir;

use pathtree::application::services::DocumentFormat;
use pathtree::application::ApplicationError;
use pathtree::config::{project_config_path, Settings};
use pathtree::domain::{ConflictPolicy, FoldOrder};

#[test]
fn given_project_config_when_load_then_overrides_defaults() {
    // Arrange
    let project = TempDir::new().unwrap();
    fs::write(
        project_config_path(project.path()),
        "delimiter = \".\"\npolicy = \"append\"\norder = \"left-to-right\"\nformat = \"json\"\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings.delimiter, ".");
    assert_eq!(settings.policy, ConflictPolicy::Append);
    assert_eq!(settings.order, FoldOrder::LeftToRight);
    assert_eq!(settings.format, DocumentFormat::Json);
}

#[test]
fn given_partial_project_config_when_load_then_other_fields_keep_defaults() {
    let project = TempDir::new().unwrap();
    fs::write(project_config_path(project.path()), "json_pretty = false\n").unwrap();

    let settings = Settings::load(Some(project.path())).unwrap();

    assert!(!settings.json_pretty);
    assert_eq!(settings.policy, Settings::default().policy);
}

#[test]
fn given_boolean_policy_name_in_project_config_when_load_then_same_as_cli() {
    let project = TempDir::new().unwrap();
    fs::write(project_config_path(project.path()), "policy = \"true\"\n").unwrap();

    let settings = Settings::load(Some(project.path())).unwrap();

    assert_eq!(settings.policy, ConflictPolicy::Overwrite);
    assert_eq!("true".parse::<ConflictPolicy>(), Ok(settings.policy));
}

#[test]
fn given_invalid_policy_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(project_config_path(project.path()), "policy = \"sometimes\"\n").unwrap();

    let result = Settings::load(Some(project.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_empty_delimiter_in_config_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(project_config_path(project.path()), "delimiter = \"\"\n").unwrap();

    let result = Settings::load(Some(project.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_project_dir_when_project_config_path_then_dotfile_in_dir() {
    let project = TempDir::new().unwrap();
    assert_eq!(
        project_config_path(project.path()),
        project.path().join(".pathtree.toml")
    );
}
