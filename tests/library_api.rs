//! Integration tests for the semvercheck library API.

use semvercheck::{CheckOptions, Context, Level, SemverError, check};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn api_class(methods: &str) -> String {
    format!(
        r#"{{
            "name": "Vendor\\Module\\Api\\OrderRepository",
            "kind": "class",
            "is_api": true,
            "methods": [{}]
        }}"#,
        methods
    )
}

fn snapshots(before: &[(&str, &str)], after: &[(&str, &str)]) -> (TempDir, TempDir) {
    let old = TempDir::new().unwrap();
    let new = TempDir::new().unwrap();
    for (path, content) in before {
        write(old.path(), path, content);
    }
    for (path, content) in after {
        write(new.path(), path, content);
    }
    (old, new)
}

const REPOSITORY: &str = "Vendor/Module/Api/OrderRepository.php.json";

#[test]
fn test_identical_snapshots_need_no_release() {
    let manifest = api_class(r#"{"name": "get", "params": [{"name": "id"}]}"#);
    let (old, new) = snapshots(&[(REPOSITORY, &manifest)], &[(REPOSITORY, &manifest)]);

    let result = check(old.path(), new.path(), CheckOptions::default()).unwrap();

    assert_eq!(result.level(), Level::None);
    assert!(result.report().is_empty());
    assert!(result.is_allowed());
}

#[test]
fn test_required_parameter_is_major() {
    let (old, new) = snapshots(
        &[(
            REPOSITORY,
            &api_class(r#"{"name": "save", "params": [{"name": "a", "type": {"name": "int"}}]}"#),
        )],
        &[(
            REPOSITORY,
            &api_class(
                r#"{"name": "save", "params": [
                    {"name": "a", "type": {"name": "int"}},
                    {"name": "b", "type": {"name": "string"}}
                ]}"#,
            ),
        )],
    );

    let result = check(old.path(), new.path(), CheckOptions::default()).unwrap();

    assert_eq!(result.level(), Level::Major);
    let op = &result.report().operations(&Context::Class, Level::Major)[0];
    assert_eq!(op.target, "Vendor\\Module\\Api\\OrderRepository::save($b)");
    assert_eq!(op.location, Path::new(REPOSITORY));
}

#[test]
fn test_optional_parameter_on_extendable_api_class_is_minor() {
    let (old, new) = snapshots(
        &[(
            REPOSITORY,
            &api_class(r#"{"name": "save", "params": [{"name": "a", "type": {"name": "int"}}]}"#),
        )],
        &[(
            REPOSITORY,
            &api_class(
                r#"{"name": "save", "params": [
                    {"name": "a", "type": {"name": "int"}},
                    {"name": "b", "type": {"name": "string"}, "default": "'x'"}
                ]}"#,
            ),
        )],
    );

    let result = check(old.path(), new.path(), CheckOptions::default()).unwrap();

    assert_eq!(result.level(), Level::Minor);
}

#[test]
fn test_removed_column() {
    let schema = |columns: &str| {
        format!(
            r#"{{"module": "Magento_Sales", "tables": [{{"name": "sales_order", "columns": [{}]}}]}}"#,
            columns
        )
    };
    let (old, new) = snapshots(
        &[(
            "Magento/Sales/etc/db_schema.json",
            &schema(
                r#"{"name": "entity_id", "type": "int"}, {"name": "discount_amount", "type": "decimal"}"#,
            ),
        )],
        &[(
            "Magento/Sales/etc/db_schema.json",
            &schema(r#"{"name": "entity_id", "type": "int"}"#),
        )],
    );

    let result = check(old.path(), new.path(), CheckOptions::default()).unwrap();

    assert_eq!(result.level(), Level::Major);
    assert_eq!(result.report().len(), 1);
    let op = &result.report().operations(&Context::Database, Level::Major)[0];
    assert_eq!(op.code, "DB107");
    assert_eq!(op.target, "sales_order/discount_amount");
}

#[test]
fn test_unrelated_file_change_is_patch() {
    let manifest = api_class("");
    let (old, new) = snapshots(
        &[(REPOSITORY, &manifest), ("README.md", "v1")],
        &[(REPOSITORY, &manifest), ("README.md", "v2")],
    );

    let result = check(old.path(), new.path(), CheckOptions::default()).unwrap();

    assert_eq!(result.level(), Level::Patch);
    assert!(result.analysis().changed_files.modified.contains("README.md"));
}

#[test]
fn test_allowed_level_from_config() {
    let before = api_class(r#"{"name": "get"}, {"name": "delete"}"#);
    let after = api_class(r#"{"name": "get"}"#);
    let (old, new) = snapshots(
        &[(REPOSITORY, &before)],
        &[(REPOSITORY, &after), (".semvercheck.toml", "allowed_level = \"minor\"\n")],
    );

    let result = check(old.path(), new.path(), CheckOptions::default()).unwrap();

    assert_eq!(result.level(), Level::Major);
    assert_eq!(result.allowed_level(), Level::Minor);
    assert!(!result.is_allowed());
}

#[test]
fn test_level_override_option() {
    let before = api_class(r#"{"name": "get"}, {"name": "delete"}"#);
    let after = api_class(r#"{"name": "get"}"#);
    let (old, new) = snapshots(&[(REPOSITORY, &before)], &[(REPOSITORY, &after)]);

    let options = CheckOptions {
        level_overrides: BTreeMap::from([("C021".to_string(), Level::Patch)]),
        ..Default::default()
    };
    let result = check(old.path(), new.path(), options).unwrap();

    assert_eq!(result.level(), Level::Patch);
}

#[test]
fn test_json_report() {
    let before = api_class(r#"{"name": "get"}, {"name": "delete"}"#);
    let after = api_class(r#"{"name": "get"}"#);
    let (old, new) = snapshots(&[(REPOSITORY, &before)], &[(REPOSITORY, &after)]);

    let result = check(old.path(), new.path(), CheckOptions::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(value["level"], "MAJOR");
    assert_eq!(value["contexts"][0]["operations"][0]["code"], "C021");
    assert!(result.to_markdown().unwrap().contains("**Suggested bump:** MAJOR"));
}

#[test]
fn test_invalid_path() {
    let new = TempDir::new().unwrap();
    let result = check(
        Path::new("/nonexistent/path"),
        new.path(),
        CheckOptions::default(),
    );

    match result {
        Err(SemverError::PathNotFound(_)) => {}
        other => panic!("Expected PathNotFound error, got: {:?}", other),
    }
}

#[test]
fn test_invalid_manifest_is_fatal() {
    let (old, new) = snapshots(&[], &[("Vendor/Broken.php.json", "{not json")]);

    let result = check(old.path(), new.path(), CheckOptions::default());

    assert!(matches!(result, Err(SemverError::Scan(_))));
}
