use indexmap::IndexMap;
use serde_json::{json, Value};
use std::fs;
use stencil::operators::OperatorRegistry;
use tempfile::TempDir;

fn apply(raw: IndexMap<String, Value>) -> IndexMap<String, Value> {
    OperatorRegistry::builtin().apply(raw).unwrap()
}

#[test]
fn test_untagged_values_pass_through() {
    let mut raw = IndexMap::new();
    raw.insert("name".to_string(), json!("demo"));
    raw.insert("nested".to_string(), json!({ "key": "value" }));
    raw.insert("list".to_string(), json!([1, 2, 3]));

    let resolved = apply(raw);
    assert_eq!(resolved["name"], json!("demo"));
    assert_eq!(resolved["nested"], json!({ "key": "value" }));
    assert_eq!(resolved["list"], json!([1, 2, 3]));
}

#[test]
fn test_unknown_operator_type_is_an_error() {
    let mut raw = IndexMap::new();
    raw.insert("value".to_string(), json!({ "type": "nope" }));

    assert!(OperatorRegistry::builtin().apply(raw).is_err());
}

#[test]
fn test_registry_lookup() {
    let registry = OperatorRegistry::builtin();
    assert!(registry.get("command").is_some());
    assert!(registry.get("listdir").is_some());
    assert!(registry.get("json").is_some());
    assert!(registry.get("nope").is_none());
}

#[cfg(unix)]
#[test]
fn test_command_operator_captures_stdout() {
    let mut raw = IndexMap::new();
    raw.insert("greeting".to_string(), json!({ "type": "command", "command": "printf hello" }));

    let resolved = apply(raw);
    assert_eq!(resolved["greeting"], json!("hello"));
}

#[cfg(unix)]
#[test]
fn test_command_operator_failure() {
    let mut raw = IndexMap::new();
    raw.insert("oops".to_string(), json!({ "type": "command", "command": "exit 7" }));

    assert!(OperatorRegistry::builtin().apply(raw).is_err());
}

#[test]
fn test_listdir_operator() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.txt"), "").unwrap();
    fs::write(dir.path().join("a.txt"), "").unwrap();
    fs::write(dir.path().join(".hidden"), "").unwrap();

    let mut raw = IndexMap::new();
    raw.insert(
        "files".to_string(),
        json!({
            "type": "listdir",
            "path": dir.path().to_str().unwrap(),
            "sort": true,
            "ignore_hidden_files": true
        }),
    );

    let resolved = apply(raw);
    assert_eq!(resolved["files"], json!(["a.txt", "b.txt"]));
}

#[test]
fn test_json_operator_writes_contents() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.json");

    let mut raw = IndexMap::new();
    raw.insert(
        "written".to_string(),
        json!({
            "type": "json",
            "path": target.to_str().unwrap(),
            "contents": { "answer": 42 }
        }),
    );

    let resolved = apply(raw);
    assert_eq!(resolved["written"], json!({ "answer": 42 }));
    let on_disk: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(on_disk, json!({ "answer": 42 }));
}

#[test]
fn test_json_operator_reads_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in.json");
    fs::write(&source, r#"{ "loaded": true }"#).unwrap();

    let mut raw = IndexMap::new();
    raw.insert(
        "settings".to_string(),
        json!({ "type": "json", "path": source.to_str().unwrap() }),
    );

    let resolved = apply(raw);
    assert_eq!(resolved["settings"], json!({ "loaded": true }));
}

#[test]
fn test_operators_run_in_document_order() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("only.txt"), "").unwrap();

    let mut raw = IndexMap::new();
    raw.insert("first".to_string(), json!("plain"));
    raw.insert(
        "second".to_string(),
        json!({ "type": "listdir", "path": dir.path().to_str().unwrap() }),
    );
    raw.insert("third".to_string(), json!("also plain"));

    let resolved = apply(raw);
    let keys: Vec<&str> = resolved.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["first", "second", "third"]);
    assert_eq!(resolved["second"], json!(["only.txt"]));
}
