use serde_json::json;
use std::fs;
use std::path::Path;
use stencil::config::{
    context_key_of, find_context_file, parse_context, resolve_defaults, CONTEXT_FILES,
};
use tempfile::TempDir;

#[test]
fn test_parse_json_context() {
    let parsed = parse_context(r#"{ "repo_name": "demo", "count": 2 }"#).unwrap();
    assert_eq!(parsed["repo_name"], json!("demo"));
    assert_eq!(parsed["count"], json!(2));
}

#[test]
fn test_parse_yaml_context() {
    let parsed = parse_context("repo_name: demo\nlicenses:\n  - MIT\n  - BSD\n").unwrap();
    assert_eq!(parsed["repo_name"], json!("demo"));
    assert_eq!(parsed["licenses"], json!(["MIT", "BSD"]));
}

#[test]
fn test_parse_preserves_key_order() {
    let parsed = parse_context(r#"{ "zebra": 1, "apple": 2, "mango": 3 }"#).unwrap();
    let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zebra", "apple", "mango"]);
}

#[test]
fn test_parse_invalid_content() {
    assert!(parse_context("{ not json\n\t- nor: yaml: [").is_err());
}

#[test]
fn test_find_context_file_probe_order() {
    let repo = TempDir::new().unwrap();
    fs::write(repo.path().join("stencil.yaml"), "a: 1\n").unwrap();
    fs::write(repo.path().join("stencil.json"), "{}").unwrap();

    // stencil.json wins over stencil.yaml
    let found = find_context_file(repo.path()).unwrap();
    assert_eq!(found, repo.path().join(CONTEXT_FILES[0]));
}

#[test]
fn test_find_context_file_missing() {
    let repo = TempDir::new().unwrap();
    assert!(find_context_file(repo.path()).is_none());
}

#[test]
fn test_context_key_of() {
    assert_eq!(context_key_of(Path::new("stencil.yaml")), "stencil");
    assert_eq!(context_key_of(Path::new("some/dir/blueprint.json")), "blueprint");
}

#[test]
fn test_resolve_defaults_takes_first_list_element() {
    let raw = parse_context(r#"{ "license": ["MIT", "BSD", "GPL"], "name": "demo" }"#).unwrap();
    let resolved = resolve_defaults(raw, &serde_json::Value::Null);
    assert_eq!(resolved["license"], json!("MIT"));
    assert_eq!(resolved["name"], json!("demo"));
}

#[test]
fn test_resolve_defaults_keeps_private_lists() {
    let raw = parse_context(r#"{ "_copy_without_render": ["*.txt", "*.bin"] }"#).unwrap();
    let resolved = resolve_defaults(raw, &serde_json::Value::Null);
    assert_eq!(resolved["_copy_without_render"], json!(["*.txt", "*.bin"]));
}

#[test]
fn test_resolve_defaults_answers_override() {
    let raw = parse_context(r#"{ "license": ["MIT", "BSD"], "name": "demo" }"#).unwrap();
    let answers = json!({ "name": "other" });
    let resolved = resolve_defaults(raw, &answers);
    assert_eq!(resolved["name"], json!("other"));
    assert_eq!(resolved["license"], json!("MIT"));
}
