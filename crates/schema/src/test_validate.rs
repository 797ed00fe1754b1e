#[cfg(test)]
mod tests {
    use crate::*;

    fn rules() -> Rules {
        Rules::default()
    }

    fn choice() -> FieldKind {
        FieldKind::Choice {
            options: vec![
                ChoiceOption {
                    value: "light".into(),
                    label: "Light".into(),
                },
                ChoiceOption {
                    value: "dark".into(),
                    label: "Dark".into(),
                },
            ],
        }
    }

    fn all_kinds() -> Vec<FieldKind> {
        vec![
            FieldKind::Boolean,
            FieldKind::ShortText,
            FieldKind::LongText,
            FieldKind::Number,
            choice(),
            FieldKind::StringList,
        ]
    }

    fn empties() -> Vec<Value> {
        vec![Value::Null, Value::from(""), Value::List(vec![])]
    }

    #[test]
    fn required_empty_short_circuits() {
        let strict = Rules {
            required: true,
            min_length: Some(3),
            max_length: Some(1),
            pattern: Some(Pattern::new("^x").unwrap()),
            min: Some(1.0),
            max: Some(0.0),
        };
        for kind in all_kinds() {
            for empty in empties() {
                assert_eq!(
                    validate(&empty, &strict, &kind),
                    vec![REQUIRED.to_string()],
                    "kind {} value {:?}",
                    kind,
                    empty
                );
            }
        }
    }

    #[test]
    fn optional_empty_is_valid() {
        let loose = Rules {
            min_length: Some(3),
            min: Some(1.0),
            ..rules()
        };
        for kind in all_kinds() {
            for empty in empties() {
                assert!(validate(&empty, &loose, &kind).is_empty());
            }
        }
    }

    #[test]
    fn number_range_is_inclusive() {
        let r = Rules {
            min: Some(1.0),
            max: Some(10.0),
            ..rules()
        };
        for n in [-5.0, 0.0, 0.99, 1.0, 5.5, 10.0, 10.01, 15.0] {
            let errs = validate(&Value::from(n), &r, &FieldKind::Number);
            assert_eq!(errs.is_empty(), (1.0..=10.0).contains(&n), "n = {}", n);
        }
        assert_eq!(
            validate(&Value::from(15), &r, &FieldKind::Number),
            vec!["Max: 10"]
        );
        assert_eq!(
            validate(&Value::from(0), &r, &FieldKind::Number),
            vec!["Min: 1"]
        );
    }

    #[test]
    fn unparsable_number_skips_range() {
        let r = Rules {
            min: Some(1.0),
            max: Some(10.0),
            ..rules()
        };
        assert_eq!(
            validate(&Value::from("abc"), &r, &FieldKind::Number),
            vec![NOT_A_NUMBER]
        );
        assert_eq!(
            validate(&Value::from("7"), &r, &FieldKind::Number),
            Vec::<String>::new()
        );
    }

    #[test]
    fn non_finite_numbers_are_not_numbers() {
        let bounded = Rules {
            min: Some(1.0),
            max: Some(10.0),
            ..rules()
        };
        for r in [rules(), bounded] {
            for v in [
                Value::Number(f64::NAN),
                Value::Number(f64::INFINITY),
                Value::Number(f64::NEG_INFINITY),
                Value::from("inf"),
                Value::from("-infinity"),
                Value::from("NaN"),
                Value::from("1e400"),
            ] {
                assert_eq!(
                    validate(&v, &r, &FieldKind::Number),
                    vec![NOT_A_NUMBER],
                    "v = {:?}",
                    v
                );
            }
        }
    }

    #[test]
    fn text_checks_accumulate_in_order() {
        let r = Rules {
            min_length: Some(10),
            max_length: Some(3),
            pattern: Some(Pattern::new("^https://").unwrap()),
            ..rules()
        };
        assert_eq!(
            validate(&Value::from("http://x"), &r, &FieldKind::ShortText),
            vec!["Min 10 chars", "Max 3 chars", INVALID_FORMAT]
        );
    }

    #[test]
    fn pattern_applies_to_short_text_only() {
        let r = Rules {
            pattern: Some(Pattern::new("^[a-z]+$").unwrap()),
            ..rules()
        };
        assert_eq!(
            validate(&Value::from("ABC"), &r, &FieldKind::ShortText),
            vec![INVALID_FORMAT]
        );
        assert!(validate(&Value::from("ABC"), &r, &FieldKind::LongText).is_empty());
    }

    #[test]
    fn text_length_counts_characters() {
        let r = Rules {
            max_length: Some(3),
            ..rules()
        };
        assert!(validate(&Value::from("äöü"), &r, &FieldKind::LongText).is_empty());
    }

    #[test]
    fn list_checks_use_item_count() {
        let r = Rules {
            min_length: Some(2),
            max_length: Some(3),
            ..rules()
        };
        assert_eq!(
            validate(&Value::from(vec!["a"]), &r, &FieldKind::StringList),
            vec!["Min 2 items"]
        );
        assert_eq!(
            validate(&Value::from(vec!["a", "b", "c", "d"]), &r, &FieldKind::StringList),
            vec!["Max 3 items"]
        );
        // A single long entry is one item, not many characters.
        assert!(
            validate(
                &Value::from(vec!["abcdefgh", "ijk"]),
                &r,
                &FieldKind::StringList
            )
            .is_empty()
        );
    }

    #[test]
    fn choice_value_must_be_an_option() {
        assert!(validate(&Value::from("dark"), &rules(), &choice()).is_empty());
        assert_eq!(
            validate(&Value::from("Dark"), &rules(), &choice()),
            vec![INVALID_OPTION]
        );
    }

    #[test]
    fn shape_mismatches_are_reported() {
        assert_eq!(
            validate(&Value::from("yes"), &rules(), &FieldKind::Boolean),
            vec![NOT_A_BOOLEAN]
        );
        assert_eq!(
            validate(&Value::from(3), &rules(), &FieldKind::ShortText),
            vec![NOT_TEXT]
        );
        assert_eq!(
            validate(&Value::from("a,b"), &rules(), &FieldKind::StringList),
            vec![NOT_A_LIST]
        );
    }

    #[test]
    fn false_is_not_empty() {
        let r = Rules {
            required: true,
            ..rules()
        };
        assert!(validate(&Value::from(false), &r, &FieldKind::Boolean).is_empty());
    }
}
