//! Wire shape of a schema as declared by an owner, and its resolution.
//!
//! Every attribute is optional at this layer so that an incomplete declaration
//! still deserializes; [`RawSchema::resolve`] then decides whether it is
//! acceptable. Blank strings count as missing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ChoiceOption, Field, FieldKind, Pattern, Rules, Schema, SchemaError, Value};

/// Schema as declared by an owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSchema {
    /// Owner id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Display version.
    #[serde(default)]
    pub version: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared fields.
    #[serde(default)]
    pub settings: Option<Vec<RawField>>,
}

/// One field as declared by an owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    /// Field key.
    #[serde(default)]
    pub key: Option<String>,
    /// Type name, one of [`FieldKind::WIRE_NAMES`].
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value. JSON `null` counts as missing.
    #[serde(default)]
    pub default: Option<Value>,
    /// Validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<RawRules>,
    /// Options of an `enum` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ChoiceOption>>,
}

/// Validation rules as declared by an owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRules {
    /// `required`
    #[serde(default)]
    pub required: bool,
    /// `minLength`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// `maxLength`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// `pattern`, a regular expression source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// `min`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// `max`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Return the trimmed-nonblank string or `None`.
fn present(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl RawSchema {
    /// Check the declaration and produce a resolved [`Schema`].
    ///
    /// Checks run in declaration order and the first problem wins; nothing is
    /// partially accepted.
    pub fn resolve(self) -> Result<Schema, SchemaError> {
        let id = present(self.id).ok_or(SchemaError::MissingAttribute { attribute: "id" })?;
        let name = present(self.name).ok_or(SchemaError::MissingAttribute { attribute: "name" })?;
        let version = present(self.version).ok_or(SchemaError::MissingAttribute {
            attribute: "version",
        })?;
        let raw_settings = self.settings.ok_or(SchemaError::MissingAttribute {
            attribute: "settings",
        })?;
        if raw_settings.is_empty() {
            return Err(SchemaError::EmptySettings { id });
        }

        let mut seen = HashSet::new();
        let mut settings = Vec::with_capacity(raw_settings.len());
        for (index, raw) in raw_settings.into_iter().enumerate() {
            let field = raw.resolve(index)?;
            if !seen.insert(field.key.clone()) {
                return Err(SchemaError::DuplicateKey { key: field.key });
            }
            settings.push(field);
        }

        Ok(Schema {
            id,
            name,
            version,
            description: present(self.description),
            settings,
        })
    }
}

impl RawField {
    /// Resolve the field at position `index` of its schema.
    fn resolve(self, index: usize) -> Result<Field, SchemaError> {
        let missing = |attribute| SchemaError::MissingFieldAttribute { index, attribute };
        let key = present(self.key).ok_or_else(|| missing("key"))?;
        let kind_name = present(self.kind).ok_or_else(|| missing("type"))?;
        let label = present(self.label).ok_or_else(|| missing("label"))?;
        let default = self
            .default
            .filter(|v| *v != Value::Null)
            .ok_or_else(|| missing("default"))?;

        let kind = match kind_name.as_str() {
            "boolean" => FieldKind::Boolean,
            "string" => FieldKind::ShortText,
            "text" => FieldKind::LongText,
            "number" => FieldKind::Number,
            "array-string" => FieldKind::StringList,
            "enum" => {
                let options = self.options.unwrap_or_default();
                if options.is_empty() {
                    return Err(SchemaError::MissingOptions { key });
                }
                FieldKind::Choice { options }
            }
            _ => {
                return Err(SchemaError::UnknownFieldType {
                    key,
                    kind: kind_name,
                });
            }
        };

        if !kind.accepts(&default) {
            return Err(SchemaError::DefaultMismatch {
                key,
                kind: kind.wire_name(),
                found: default.shape(),
            });
        }

        if let (FieldKind::Choice { options }, Value::Text(v)) = (&kind, &default)
            && !options.iter().any(|o| o.value == *v)
        {
            return Err(SchemaError::DefaultNotAnOption {
                value: v.clone(),
                key,
            });
        }

        let raw_rules = self.validation.unwrap_or_default();
        let pattern = match raw_rules.pattern.as_deref() {
            Some(src) => Some(Pattern::new(src).map_err(|e| SchemaError::InvalidPattern {
                key: key.clone(),
                message: e.to_string(),
            })?),
            None => None,
        };
        let rules = Rules {
            required: raw_rules.required,
            min_length: raw_rules.min_length,
            max_length: raw_rules.max_length,
            pattern,
            min: raw_rules.min,
            max: raw_rules.max,
        };

        Ok(Field {
            key,
            kind,
            label,
            description: present(self.description),
            default,
            rules,
        })
    }
}
