//! Opaque cross-reference identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque string handle used as a cross-reference target within one document.
///
/// Entities participate in the dependency graph via their `BomRef` only, never
/// by direct object reference; that indirection is what makes dangling
/// reference detection meaningful. Equality, ordering and hashing are all over
/// the string value, so refs sort and dedupe like strings.
///
/// A default-constructed ref carries a fresh random UUID token, so every
/// entity is referenceable even when the caller never assigned an identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BomRef {
    value: String,
}

impl BomRef {
    /// Create a ref with an explicit value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Create a ref with a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            value: Uuid::new_v4().to_string(),
        }
    }

    /// The current string value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Reassign the value.
    ///
    /// Ordinary application code should not call this after construction; it
    /// exists for explicit reassignment and for the discriminator's scoped
    /// rename window.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl Default for BomRef {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for BomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<&str> for BomRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BomRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unique_and_non_empty() {
        let a = BomRef::default();
        let b = BomRef::default();
        assert!(!a.value().is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn orders_like_strings() {
        let a = BomRef::new("a");
        let b = BomRef::new("b");
        assert!(a < b);
        assert_eq!(a, BomRef::new("a"));
    }

    #[test]
    fn set_value_changes_identity() {
        let mut r = BomRef::new("before");
        r.set_value("after");
        assert_eq!(r.value(), "after");
        assert_eq!(r, BomRef::new("after"));
    }
}
