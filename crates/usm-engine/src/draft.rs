//! In-memory edit state for the selected owner.

use std::{collections::BTreeMap, sync::Arc};

use schema::{FieldKind, Schema, Value, Values};

use crate::{Error, Result, Status};

/// Per-field violation lists. Fields without violations have no entry.
pub type Errors = BTreeMap<String, Vec<String>>;

/// Edit state of one owner: draft values, their violations, and whether
/// anything changed since the last load or save.
#[derive(Debug, Clone)]
pub struct Draft {
    /// Distinguishes this draft from earlier and later ones.
    generation: u64,
    /// Schema the draft edits.
    schema: Arc<Schema>,
    /// Current draft value of every field.
    values: Values,
    /// Current violations.
    errors: Errors,
    /// Edited since the last load or save.
    dirty: bool,
}

impl Draft {
    /// Start a clean draft seeded with `values`.
    pub fn new(generation: u64, schema: Arc<Schema>, values: Values) -> Self {
        Self {
            generation,
            schema,
            values,
            errors: Errors::new(),
            dirty: false,
        }
    }

    /// Generation number assigned at creation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Owner id being edited.
    pub fn owner(&self) -> &str {
        &self.schema.id
    }

    /// Schema being edited.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Current draft values.
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Draft value of one field.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Current violations of every failing field.
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Current violations of one field; empty when it passes.
    pub fn field_errors(&self, key: &str) -> &[String] {
        self.errors.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether anything changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Derived editor status.
    pub fn status(&self) -> Status {
        Status::derive(!self.errors.is_empty(), self.dirty)
    }

    /// Replace the draft value of `key` and mark the draft dirty. Does not
    /// validate.
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
        if self.schema.field(key).is_none() {
            return Err(Error::UnknownField {
                owner: self.schema.id.clone(),
                key: key.to_string(),
            });
        }
        self.values.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// Recompute the violations of `key` from its current draft value and
    /// return them.
    pub fn revalidate(&mut self, key: &str) -> &[String] {
        let Some(field) = self.schema.field(key) else {
            return &[];
        };
        let value = self.values.get(key).cloned().unwrap_or_default();
        let found = field.validate(&value);
        if found.is_empty() {
            self.errors.remove(key);
        } else {
            self.errors.insert(key.to_string(), found);
        }
        self.field_errors(key)
    }

    /// Recompute violations of every field. Returns true when all pass.
    pub fn revalidate_all(&mut self) -> bool {
        let schema = self.schema.clone();
        for key in schema.keys() {
            self.revalidate(key);
        }
        self.errors.is_empty()
    }

    /// Values in their stored shape: numeric text becomes a number.
    pub fn finalized(&self) -> Values {
        let mut out = self.values.clone();
        for field in &self.schema.settings {
            if field.kind != FieldKind::Number {
                continue;
            }
            if let Some(v) = out.get_mut(&field.key)
                && let Value::Text(_) = v
                && let Some(n) = v.as_f64()
            {
                *v = Value::Number(n);
            }
        }
        out
    }

    /// Record a successful save of `values`.
    pub fn mark_saved(&mut self, values: Values) {
        self.values = values;
        self.errors.clear();
        self.dirty = false;
    }

    /// Reseed with `values`, dropping all violations and edits.
    pub fn reset(&mut self, values: Values) {
        self.mark_saved(values);
    }

    /// Immutable view for an editor surface.
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            owner: self.schema.id.clone(),
            name: self.schema.name.clone(),
            generation: self.generation,
            values: self.values.clone(),
            errors: self.errors.clone(),
            dirty: self.dirty,
            status: self.status(),
        }
    }
}

/// Point-in-time copy of a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSnapshot {
    /// Owner id.
    pub owner: String,
    /// Owner display name.
    pub name: String,
    /// Draft generation.
    pub generation: u64,
    /// Draft values.
    pub values: Values,
    /// Violations of failing fields.
    pub errors: Errors,
    /// Edited since the last load or save.
    pub dirty: bool,
    /// Derived status.
    pub status: Status,
}
