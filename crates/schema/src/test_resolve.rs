#[cfg(test)]
mod tests {
    use std::fs;

    use crate::*;

    fn parse(json: &str) -> RawSchema {
        load_from_str(json, None).unwrap()
    }

    fn rejection(json: &str) -> SchemaError {
        parse(json).resolve().unwrap_err()
    }

    const FULL: &str = r#"{
        "id": "test.script",
        "name": "Test Script",
        "version": "1.0.0",
        "description": "Covers every control type",
        "settings": [
            { "key": "enabled", "type": "boolean", "label": "Enable", "default": true },
            { "key": "apiUrl", "type": "string", "label": "API URL", "default": "",
              "validation": { "required": true, "pattern": "^https://", "minLength": 10 } },
            { "key": "notes", "type": "text", "label": "Notes", "default": "",
              "validation": { "maxLength": 500 } },
            { "key": "count", "type": "number", "label": "Count", "default": 5,
              "validation": { "min": 1, "max": 10 } },
            { "key": "theme", "type": "enum", "label": "Theme", "default": "dark",
              "options": [ { "value": "light", "label": "Light" },
                           { "value": "dark", "label": "Dark" } ] },
            { "key": "tags", "type": "array-string", "label": "Tags", "default": ["a"],
              "validation": { "maxLength": 5 } }
        ]
    }"#;

    #[test]
    fn full_schema_resolves() {
        let schema = parse(FULL).resolve().unwrap();
        assert_eq!(schema.id, "test.script");
        assert_eq!(
            schema.keys().collect::<Vec<_>>(),
            vec!["enabled", "apiUrl", "notes", "count", "theme", "tags"]
        );
        let api = schema.field("apiUrl").unwrap();
        assert_eq!(api.kind, FieldKind::ShortText);
        assert!(api.rules.required);
        assert_eq!(api.rules.min_length, Some(10));
        assert_eq!(api.rules.pattern.as_ref().unwrap().as_str(), "^https://");
        assert_eq!(schema.field("count").unwrap().default, Value::Number(5.0));
        assert_eq!(schema.field("theme").unwrap().kind.options().len(), 2);

        let defaults = schema.defaults();
        assert_eq!(defaults.len(), 6);
        assert_eq!(defaults["tags"], Value::from(vec!["a"]));
    }

    #[test]
    fn empty_object_is_rejected() {
        assert_eq!(
            rejection("{}"),
            SchemaError::MissingAttribute { attribute: "id" }
        );
    }

    #[test]
    fn blank_name_counts_as_missing() {
        assert_eq!(
            rejection(r#"{"id": "a", "name": "  ", "version": "1", "settings": []}"#),
            SchemaError::MissingAttribute { attribute: "name" }
        );
    }

    #[test]
    fn empty_settings_are_rejected() {
        assert_eq!(
            rejection(r#"{"id": "a", "name": "A", "version": "1", "settings": []}"#),
            SchemaError::EmptySettings { id: "a".into() }
        );
    }

    #[test]
    fn field_missing_attributes_are_rejected() {
        let cases = [
            (r#"{"type": "boolean", "label": "L", "default": true}"#, "key"),
            (r#"{"key": "k", "label": "L", "default": true}"#, "type"),
            (r#"{"key": "k", "type": "boolean", "default": true}"#, "label"),
            (r#"{"key": "k", "type": "boolean", "label": "L"}"#, "default"),
            (
                r#"{"key": "k", "type": "boolean", "label": "L", "default": null}"#,
                "default",
            ),
        ];
        for (field, attribute) in cases {
            let json = format!(
                r#"{{"id": "a", "name": "A", "version": "1", "settings": [
                    {{"key": "ok", "type": "number", "label": "Ok", "default": 1}},
                    {}
                ]}}"#,
                field
            );
            assert_eq!(
                rejection(&json),
                SchemaError::MissingFieldAttribute {
                    index: 1,
                    attribute
                },
                "{}",
                field
            );
        }
    }

    #[test]
    fn structural_field_problems_are_rejected() {
        let wrap = |fields: &str| {
            format!(
                r#"{{"id": "a", "name": "A", "version": "1", "settings": [{}]}}"#,
                fields
            )
        };
        assert!(matches!(
            rejection(&wrap(r#"{"key": "k", "type": "color", "label": "L", "default": "x"}"#)),
            SchemaError::UnknownFieldType { .. }
        ));
        assert!(matches!(
            rejection(&wrap(
                r#"{"key": "k", "type": "boolean", "label": "L", "default": true},
                   {"key": "k", "type": "boolean", "label": "L2", "default": false}"#
            )),
            SchemaError::DuplicateKey { .. }
        ));
        assert!(matches!(
            rejection(&wrap(r#"{"key": "k", "type": "enum", "label": "L", "default": "x"}"#)),
            SchemaError::MissingOptions { .. }
        ));
        assert!(matches!(
            rejection(&wrap(
                r#"{"key": "k", "type": "enum", "label": "L", "default": "x",
                    "options": [{"value": "y", "label": "Y"}]}"#
            )),
            SchemaError::DefaultNotAnOption { .. }
        ));
        assert!(matches!(
            rejection(&wrap(
                r#"{"key": "k", "type": "string", "label": "L", "default": "",
                    "validation": {"pattern": "(unclosed"}}"#
            )),
            SchemaError::InvalidPattern { .. }
        ));
        assert_eq!(
            rejection(&wrap(r#"{"key": "k", "type": "number", "label": "L", "default": "5"}"#)),
            SchemaError::DefaultMismatch {
                key: "k".into(),
                kind: "number",
                found: "text",
            }
        );
    }

    #[test]
    fn parse_errors_carry_location() {
        let err = load_from_str("{\n  \"id\": \"a\",\n  \"name\" 1\n}", None).unwrap_err();
        match err {
            Error::Parse { line, excerpt, .. } => {
                assert_eq!(line, 3);
                assert!(excerpt.contains('^'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn load_dir_reads_json_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), FULL).unwrap();
        fs::write(dir.path().join("a.json"), "{ broken").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_dir(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded[0].0.ends_with("a.json"));
        assert!(loaded[0].1.is_err());
        assert!(loaded[1].1.is_ok());

        let checked = check_path(&dir.path().join("b.json")).unwrap();
        assert_eq!(checked.name, "Test Script");
    }

    #[test]
    fn missing_dir_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dir(&dir.path().join("nope")).unwrap().is_empty());
    }
}
