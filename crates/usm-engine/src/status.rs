//! Editor status derived from a draft.

use std::fmt;

/// Editor status derived from a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Draft matches what was last stored.
    Saved,
    /// Draft has edits that have not been committed.
    Unsaved,
    /// At least one field has violations; saving is blocked.
    Error,
}

impl Status {
    /// Derive from the draft's error state and dirty flag. Errors win over
    /// dirtiness.
    pub fn derive(has_errors: bool, dirty: bool) -> Self {
        if has_errors {
            Self::Error
        } else if dirty {
            Self::Unsaved
        } else {
            Self::Saved
        }
    }

    /// Text shown next to the save button.
    pub fn label(self) -> &'static str {
        match self {
            Self::Saved => "Saved",
            Self::Unsaved => "Unsaved changes",
            Self::Error => "Validation errors",
        }
    }

    /// Whether the save action is enabled.
    pub fn can_save(self) -> bool {
        self != Self::Error
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
