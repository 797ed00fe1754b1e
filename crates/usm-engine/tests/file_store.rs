use std::{fs, path::Path, sync::Arc};

use schema::{Value, load_from_str};
use usm_engine::{FileBackend, Manager, ManagerConfig};

const PREFS: &str = r#"{
    "id": "prefs",
    "name": "Preferences",
    "version": "1",
    "settings": [
        { "key": "dark", "type": "boolean", "label": "Dark", "default": false },
        { "key": "sites", "type": "array-string", "label": "Sites", "default": [] },
        { "key": "zoom", "type": "number", "label": "Zoom", "default": 1 }
    ]
}"#;

fn open(path: &Path) -> Manager {
    let backend = FileBackend::open(path).unwrap();
    let m = Manager::new(ManagerConfig::default(), Arc::new(backend));
    assert!(m.register(load_from_str(PREFS, None).unwrap()));
    m
}

#[test]
fn committed_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("store.json");

    let first = open(&path);
    first.select("prefs").unwrap();
    first.edit_input("dark", "on").unwrap();
    first.edit_input("sites", "a.com, b.org").unwrap();
    first.edit_input("zoom", "1.5").unwrap();
    let saved = first.commit().unwrap();
    drop(first);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("usm_5_prefs_dark"));

    let second = open(&path);
    let loaded = second.get_settings("prefs").unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded["dark"], Value::Bool(true));
    assert_eq!(loaded["sites"], Value::from(vec!["a.com", "b.org"]));
    assert_eq!(loaded["zoom"], Value::Number(1.5));
}

#[test]
fn reset_removes_entries_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let m = open(&path);
    m.select("prefs").unwrap();
    m.edit_input("zoom", "2").unwrap();
    m.commit().unwrap();
    m.discard().unwrap();

    let reopened = open(&path);
    assert_eq!(
        reopened.get_settings("prefs").unwrap()["zoom"],
        Value::from(1)
    );
    assert!(!fs::read_to_string(&path).unwrap().contains("prefs"));
}
