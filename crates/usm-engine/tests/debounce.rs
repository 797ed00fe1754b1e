use std::time::Duration;

use schema::{Value, load_from_str};
use tokio::time;
use usm_engine::{Error, Manager, Status};

const FORM: &str = r#"{
    "id": "form",
    "name": "Form",
    "version": "1",
    "settings": [
        { "key": "apiUrl", "type": "string", "label": "API URL", "default": "https://example.com",
          "validation": { "minLength": 10, "pattern": "^https://" } },
        { "key": "count", "type": "number", "label": "Count", "default": 5,
          "validation": { "min": 1, "max": 10 } },
        { "key": "enabled", "type": "boolean", "label": "Enabled", "default": true }
    ]
}"#;

fn manager() -> Manager {
    let m = Manager::in_memory();
    assert!(m.register(load_from_str(FORM, None).unwrap()));
    m.select("form").unwrap();
    m
}

fn field_errors(m: &Manager, key: &str) -> Vec<String> {
    m.snapshot()
        .unwrap()
        .errors
        .get(key)
        .cloned()
        .unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn text_errors_appear_after_idle_window() {
    let m = manager();
    m.edit_input("apiUrl", "ftp").unwrap();

    // The value itself is updated at once.
    assert_eq!(m.snapshot().unwrap().values["apiUrl"], Value::from("ftp"));
    assert!(m.is_pending("apiUrl"));
    assert_eq!(m.status(), Some(Status::Unsaved));

    time::sleep(Duration::from_millis(299)).await;
    assert!(field_errors(&m, "apiUrl").is_empty());

    time::sleep(Duration::from_millis(2)).await;
    assert!(!m.is_pending("apiUrl"));
    assert_eq!(
        field_errors(&m, "apiUrl"),
        vec!["Min 10 chars".to_string(), "Invalid format".to_string()]
    );
    assert_eq!(m.status(), Some(Status::Error));
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_validates_latest_value_once() {
    let m = manager();
    for input in ["h", "ht", "htt", "http"] {
        m.edit_input("apiUrl", input).unwrap();
        time::sleep(Duration::from_millis(100)).await;
    }
    assert!(field_errors(&m, "apiUrl").is_empty());
    m.edit_input("apiUrl", "https://valid.example").unwrap();
    time::sleep(Duration::from_millis(301)).await;
    assert!(field_errors(&m, "apiUrl").is_empty());
    assert_eq!(m.status(), Some(Status::Unsaved));
}

#[tokio::test(start_paused = true)]
async fn commit_validates_current_value_despite_pending_timer() {
    let m = manager();
    m.edit_input("count", "15").unwrap();
    assert!(m.is_pending("count"));

    match m.commit() {
        Err(Error::ValidationFailed { errors }) => {
            assert_eq!(errors["count"], vec!["Max: 10".to_string()]);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    assert!(!m.is_pending("count"));

    m.edit_input("count", "7").unwrap();
    let saved = m.commit().unwrap();
    assert_eq!(saved["count"], Value::from(7));
    time::sleep(Duration::from_millis(400)).await;
    assert_eq!(m.status(), Some(Status::Saved));
}

#[tokio::test(start_paused = true)]
async fn toggles_validate_immediately() {
    let m = manager();
    m.edit("enabled", Value::from("maybe")).unwrap();
    assert!(!m.is_pending("enabled"));
    assert_eq!(
        field_errors(&m, "enabled"),
        vec!["Must be true or false".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn reselect_drops_pending_validation() {
    let m = manager();
    m.edit_input("count", "abc").unwrap();
    m.select("form").unwrap();
    assert!(!m.is_pending("count"));
    time::sleep(Duration::from_millis(400)).await;
    assert!(field_errors(&m, "count").is_empty());
    assert_eq!(m.status(), Some(Status::Saved));
}
