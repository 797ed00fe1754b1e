//! Resolved schema types.
//!
//! These are produced from the wire shape in [`crate::RawSchema`] once every
//! structural check has passed, so code holding a [`Schema`] can rely on its
//! invariants: non-empty settings, unique keys, type-matching defaults, and
//! compiled patterns.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Value, Values};

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stored value.
    pub value: String,
    /// Human-readable label.
    pub label: String,
}

/// Field type together with any type-specific configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// On/off flag.
    Boolean,
    /// Single-line string.
    ShortText,
    /// Multi-line text.
    LongText,
    /// Floating-point number.
    Number,
    /// Exactly one value out of a closed option list.
    Choice {
        /// Available options, in display order.
        options: Vec<ChoiceOption>,
    },
    /// List of strings.
    StringList,
}

impl FieldKind {
    /// Type names accepted in the wire shape.
    pub const WIRE_NAMES: [&'static str; 6] =
        ["boolean", "string", "text", "number", "enum", "array-string"];

    /// Wire name of this kind.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::ShortText => "string",
            Self::LongText => "text",
            Self::Number => "number",
            Self::Choice { .. } => "enum",
            Self::StringList => "array-string",
        }
    }

    /// Whether `value` has the native shape this kind stores.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::ShortText | Self::LongText | Self::Choice { .. } => {
                matches!(value, Value::Text(_))
            }
            Self::Number => matches!(value, Value::Number(_)),
            Self::StringList => matches!(value, Value::List(_)),
        }
    }

    /// Options of a choice field; empty for every other kind.
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            Self::Choice { options } => options,
            _ => &[],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A compiled regular expression that remembers its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile `source`.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Validation rules for a field. Which rules apply depends on the field kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    /// An empty value is a violation.
    pub required: bool,
    /// Minimum string length (text kinds) or item count (lists).
    pub min_length: Option<usize>,
    /// Maximum string length (text kinds) or item count (lists).
    pub max_length: Option<usize>,
    /// Pattern the value must match (short text only).
    pub pattern: Option<Pattern>,
    /// Inclusive lower bound (numbers).
    pub min: Option<f64>,
    /// Inclusive upper bound (numbers).
    pub max: Option<f64>,
}

/// One configurable setting within a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Key, unique within the schema.
    pub key: String,
    /// Type and type-specific configuration.
    pub kind: FieldKind,
    /// Display label.
    pub label: String,
    /// Optional help text.
    pub description: Option<String>,
    /// Default value; always matches `kind`.
    pub default: Value,
    /// Validation rules.
    pub rules: Rules,
}

impl Field {
    /// Validate `value` against this field's rules and kind.
    pub fn validate(&self, value: &Value) -> Vec<String> {
        crate::validate(value, &self.rules, &self.kind)
    }
}

/// The declarative settings description of one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Globally unique owner id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display version string.
    pub version: String,
    /// Optional description.
    pub description: Option<String>,
    /// Fields in declaration order; never empty.
    pub settings: Vec<Field>,
}

impl Schema {
    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.settings.iter().find(|f| f.key == key)
    }

    /// Field keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.settings.iter().map(|f| f.key.as_str())
    }

    /// The mapping of every field to its default.
    pub fn defaults(&self) -> Values {
        self.settings
            .iter()
            .map(|f| (f.key.clone(), f.default.clone()))
            .collect()
    }
}
