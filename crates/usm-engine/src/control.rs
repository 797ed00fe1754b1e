//! Edit controls, one per field kind.
//!
//! A [`Control`] knows how to show a value as text and how to turn raw user
//! input back into a [`Value`] of the field's native shape. Editor surfaces
//! pick a control with [`Control::for_field`] and never switch on type names.

use schema::{ChoiceOption, Field, FieldKind, Value};

/// Input spellings accepted as `true` by a toggle.
const TRUE_WORDS: [&str; 4] = ["true", "yes", "on", "1"];
/// Input spellings accepted as `false` by a toggle.
const FALSE_WORDS: [&str; 4] = ["false", "no", "off", "0"];

/// The edit control of one field.
#[derive(Debug, Clone, Copy)]
pub enum Control<'a> {
    /// Checkbox for a boolean.
    Toggle {
        /// Edited field.
        field: &'a Field,
    },
    /// Single-line text box.
    TextInput {
        /// Edited field.
        field: &'a Field,
    },
    /// Multi-line text box, with a character counter when a maximum is set.
    TextArea {
        /// Edited field.
        field: &'a Field,
        /// Maximum length shown by the counter.
        max_length: Option<usize>,
    },
    /// Number box, with a slider when both bounds are set.
    NumberInput {
        /// Edited field.
        field: &'a Field,
        /// Slider range.
        range: Option<(f64, f64)>,
    },
    /// Drop-down of options.
    Select {
        /// Edited field.
        field: &'a Field,
        /// Options in display order.
        options: &'a [ChoiceOption],
    },
    /// Tag list editor.
    Tags {
        /// Edited field.
        field: &'a Field,
    },
}

impl<'a> Control<'a> {
    /// Control matching the kind of `field`.
    pub fn for_field(field: &'a Field) -> Self {
        match &field.kind {
            FieldKind::Boolean => Self::Toggle { field },
            FieldKind::ShortText => Self::TextInput { field },
            FieldKind::LongText => Self::TextArea {
                field,
                max_length: field.rules.max_length,
            },
            FieldKind::Number => Self::NumberInput {
                field,
                range: field.rules.min.zip(field.rules.max),
            },
            FieldKind::Choice { options } => Self::Select { field, options },
            FieldKind::StringList => Self::Tags { field },
        }
    }

    /// Field this control edits.
    pub fn field(&self) -> &'a Field {
        match *self {
            Self::Toggle { field }
            | Self::TextInput { field }
            | Self::TextArea { field, .. }
            | Self::NumberInput { field, .. }
            | Self::Select { field, .. }
            | Self::Tags { field } => field,
        }
    }

    /// Short name of the control.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toggle { .. } => "toggle",
            Self::TextInput { .. } => "text",
            Self::TextArea { .. } => "textarea",
            Self::NumberInput { .. } => "number",
            Self::Select { .. } => "select",
            Self::Tags { .. } => "tags",
        }
    }

    /// Whether edits through this control re-validate after the idle window
    /// rather than immediately.
    pub fn debounced(&self) -> bool {
        matches!(
            self,
            Self::TextInput { .. } | Self::TextArea { .. } | Self::NumberInput { .. }
        )
    }

    /// Turn raw user input into a value.
    ///
    /// Input that does not fit the field's shape is kept as text so that
    /// validation can report it.
    pub fn read(&self, input: &str) -> Value {
        match self {
            Self::Toggle { .. } => {
                let word = input.trim().to_lowercase();
                if TRUE_WORDS.contains(&word.as_str()) {
                    Value::Bool(true)
                } else if FALSE_WORDS.contains(&word.as_str()) {
                    Value::Bool(false)
                } else {
                    Value::Text(input.to_string())
                }
            }
            Self::TextInput { .. } | Self::TextArea { .. } => Value::Text(input.to_string()),
            Self::NumberInput { .. } => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Value::Null;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Value::Number(n),
                    _ => Value::Text(input.to_string()),
                }
            }
            Self::Select { options, .. } => {
                let trimmed = input.trim();
                options
                    .iter()
                    .find(|o| o.value == trimmed)
                    .or_else(|| {
                        options
                            .iter()
                            .find(|o| o.label.eq_ignore_ascii_case(trimmed))
                    })
                    .map_or_else(
                        || Value::Text(trimmed.to_string()),
                        |o| Value::Text(o.value.clone()),
                    )
            }
            Self::Tags { .. } => {
                let mut tags = Vec::new();
                for tag in input.split(',') {
                    push_tag(&mut tags, tag);
                }
                Value::List(tags)
            }
        }
    }

    /// Display text of `value`.
    pub fn render(&self, value: &Value) -> String {
        match self {
            Self::Toggle { .. } => match value.as_bool() {
                Some(true) => "[x]".to_string(),
                Some(false) => "[ ]".to_string(),
                None => value.to_string(),
            },
            Self::TextInput { .. } | Self::TextArea { .. } => value.to_string(),
            Self::NumberInput { range, .. } => match (range, value.as_f64()) {
                (Some((min, max)), Some(n)) => format!("{} ({}..={})", n, min, max),
                _ => value.to_string(),
            },
            Self::Select { options, .. } => {
                let current = value.as_str().unwrap_or_default();
                options
                    .iter()
                    .map(|o| {
                        if o.value == current {
                            format!("({})", o.label)
                        } else {
                            o.label.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            Self::Tags { .. } => match value.as_list() {
                Some(items) => items
                    .iter()
                    .map(|t| format!("[{}]", t))
                    .collect::<Vec<_>>()
                    .join(" "),
                None => value.to_string(),
            },
        }
    }

    /// Character counter of a text area, e.g. `"12 / 500"`.
    pub fn counter(&self, value: &Value) -> Option<String> {
        match self {
            Self::TextArea {
                max_length: Some(max),
                ..
            } => {
                let len = value.as_str().map_or(0, |s| s.chars().count());
                Some(format!("{} / {}", len, max))
            }
            _ => None,
        }
    }
}

/// Append `tag` unless it is blank or already present.
fn push_tag(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

/// `list` with `tag` appended. Blank and duplicate tags leave it unchanged.
pub fn add_tag(list: &Value, tag: &str) -> Value {
    let mut tags = list.as_list().map(<[String]>::to_vec).unwrap_or_default();
    push_tag(&mut tags, tag);
    Value::List(tags)
}

/// `list` without `tag`.
pub fn remove_tag(list: &Value, tag: &str) -> Value {
    let tag = tag.trim();
    let tags = list
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter(|t| t.as_str() != tag)
        .cloned()
        .collect();
    Value::List(tags)
}
