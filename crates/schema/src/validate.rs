//! The validation engine: a pure mapping from a value, its rules, and its
//! field kind to an ordered list of violation messages.

use crate::{FieldKind, Rules, Value};

/// Message emitted when a required value is empty.
pub const REQUIRED: &str = "Required";
/// Message emitted when a short-text value does not match its pattern.
pub const INVALID_FORMAT: &str = "Invalid format";
/// Message emitted when a number field holds something that is not a number.
pub const NOT_A_NUMBER: &str = "Must be a number";
/// Message emitted when a choice value is not one of the options.
pub const INVALID_OPTION: &str = "Invalid option";
/// Message emitted when a boolean field holds a non-boolean.
pub const NOT_A_BOOLEAN: &str = "Must be true or false";
/// Message emitted when a text field holds a non-text value.
pub const NOT_TEXT: &str = "Must be text";
/// Message emitted when a list field holds a non-list value.
pub const NOT_A_LIST: &str = "Must be a list";

/// Validate `value` against `rules` for a field of type `kind`.
///
/// - A required empty value yields exactly `["Required"]`.
/// - Any other empty value is valid.
/// - Otherwise every applicable check runs and violations accumulate in a
///   fixed order: length, then pattern for text; parse, then `min`, then
///   `max` for numbers; item counts for lists.
pub fn validate(value: &Value, rules: &Rules, kind: &FieldKind) -> Vec<String> {
    let mut errors = Vec::new();
    if value.is_empty() {
        if rules.required {
            errors.push(REQUIRED.to_string());
        }
        return errors;
    }

    match kind {
        FieldKind::Boolean => {
            if value.as_bool().is_none() {
                errors.push(NOT_A_BOOLEAN.to_string());
            }
        }
        FieldKind::ShortText | FieldKind::LongText => {
            let Some(text) = value.as_str() else {
                errors.push(NOT_TEXT.to_string());
                return errors;
            };
            let len = text.chars().count();
            if let Some(min) = rules.min_length
                && len < min
            {
                errors.push(format!("Min {} chars", min));
            }
            if let Some(max) = rules.max_length
                && len > max
            {
                errors.push(format!("Max {} chars", max));
            }
            if matches!(kind, FieldKind::ShortText)
                && let Some(pattern) = &rules.pattern
                && !pattern.is_match(text)
            {
                errors.push(INVALID_FORMAT.to_string());
            }
        }
        FieldKind::Number => match value.as_f64() {
            None => errors.push(NOT_A_NUMBER.to_string()),
            Some(n) => {
                if let Some(min) = rules.min
                    && n < min
                {
                    errors.push(format!("Min: {}", min));
                }
                if let Some(max) = rules.max
                    && n > max
                {
                    errors.push(format!("Max: {}", max));
                }
            }
        },
        FieldKind::Choice { options } => match value.as_str() {
            Some(v) if options.iter().any(|o| o.value == v) => {}
            _ => errors.push(INVALID_OPTION.to_string()),
        },
        FieldKind::StringList => {
            let Some(items) = value.as_list() else {
                errors.push(NOT_A_LIST.to_string());
                return errors;
            };
            if let Some(min) = rules.min_length
                && items.len() < min
            {
                errors.push(format!("Min {} items", min));
            }
            if let Some(max) = rules.max_length
                && items.len() > max
            {
                errors.push(format!("Max {} items", max));
            }
        }
    }
    errors
}
