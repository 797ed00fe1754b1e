//! Registered owner schemas.

use std::sync::Arc;

use schema::Schema;

/// Listing entry for one registered owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    /// Owner id.
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Display version.
    pub version: String,
    /// Optional description.
    pub description: Option<String>,
    /// Name shortened for narrow listings.
    pub display_name: String,
}

/// Shorten `name` to at most `width` characters, ending in `...` when cut.
pub fn display_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = name.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Registered schemas in registration order, unique by id.
#[derive(Debug, Default)]
pub struct Registry {
    /// Schemas in registration order.
    schemas: Vec<Arc<Schema>>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `schema`. An existing schema with the same id is removed first and
    /// returned; the new one goes to the end of the order.
    pub fn insert(&mut self, schema: Schema) -> Option<Arc<Schema>> {
        let previous = self
            .schemas
            .iter()
            .position(|s| s.id == schema.id)
            .map(|i| self.schemas.remove(i));
        self.schemas.push(Arc::new(schema));
        previous
    }

    /// Look up a schema by owner id.
    pub fn get(&self, id: &str) -> Option<Arc<Schema>> {
        self.schemas.iter().find(|s| s.id == id).cloned()
    }

    /// Number of registered owners.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.iter()
    }

    /// Summaries of owners whose name or id contains `filter`
    /// (case-insensitive). An empty filter matches everything.
    pub fn filter(&self, filter: &str, width: usize) -> Vec<OwnerSummary> {
        let needle = filter.trim().to_lowercase();
        self.schemas
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.name.to_lowercase().contains(&needle)
                    || s.id.to_lowercase().contains(&needle)
            })
            .map(|s| OwnerSummary {
                id: s.id.clone(),
                name: s.name.clone(),
                version: s.version.clone(),
                description: s.description.clone(),
                display_name: display_name(&s.name, width),
            })
            .collect()
    }
}
