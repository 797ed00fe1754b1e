//! Settings schema types, wire-shape resolution, and field validation.
//!
//! An owner declares a [`RawSchema`] (the JSON wire shape). Resolving it with
//! [`RawSchema::resolve`] either rejects it wholesale with a [`SchemaError`]
//! or produces a [`Schema`] whose fields carry a [`FieldKind`], a type-matching
//! default [`Value`], and compiled [`Rules`]. [`validate`] is the pure
//! validation engine used by editors before anything is committed.

mod error;
mod loader;
mod raw;
mod types;
mod validate;
mod value;

#[cfg(test)]
mod test_resolve;
#[cfg(test)]
mod test_validate;

pub use error::{Error, SchemaError, excerpt_at};
pub use loader::{check_path, load_dir, load_from_path, load_from_str};
pub use raw::{RawField, RawRules, RawSchema};
pub use types::{ChoiceOption, Field, FieldKind, Pattern, Rules, Schema};
pub use validate::{
    INVALID_FORMAT, INVALID_OPTION, NOT_A_BOOLEAN, NOT_A_LIST, NOT_A_NUMBER, NOT_TEXT, REQUIRED,
    validate,
};
pub use value::{Value, Values};
