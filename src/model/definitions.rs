//! Definitions: standards, requirements, and levels (schema 1.6).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::BomRef;
use crate::order::{opt_str, CanonicalOrder};

/// A single obligation within a standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub bom_ref: BomRef,
    /// Stable identifier within the standard, e.g. `"REQ-1.2"`.
    pub identifier: String,
    pub title: Option<String>,
    pub text: Option<String>,
}

impl Requirement {
    /// Create a requirement with a generated bom-ref.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            bom_ref: BomRef::default(),
            identifier: identifier.into(),
            title: None,
            text: None,
        }
    }
}

impl CanonicalOrder for Requirement {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.identifier.as_str(), self.bom_ref.value())
            .cmp(&(other.identifier.as_str(), other.bom_ref.value()))
    }
}

/// A conformance level grouping requirements by bom-ref.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub bom_ref: BomRef,
    pub identifier: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Refs of the requirements this level demands.
    pub requirements: Vec<BomRef>,
}

impl Level {
    /// Create a level with a generated bom-ref.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            bom_ref: BomRef::default(),
            identifier: identifier.into(),
            title: None,
            description: None,
            requirements: Vec::new(),
        }
    }
}

impl CanonicalOrder for Level {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.identifier.as_str(), self.bom_ref.value())
            .cmp(&(other.identifier.as_str(), other.bom_ref.value()))
    }
}

/// A standard the document claims or measures conformance against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standard {
    pub bom_ref: BomRef,
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub requirements: Vec<Requirement>,
    pub levels: Vec<Level>,
}

impl Standard {
    /// Create a standard with a generated bom-ref.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bom_ref: BomRef::default(),
            name: name.into(),
            version: None,
            description: None,
            owner: None,
            requirements: Vec::new(),
            levels: Vec::new(),
        }
    }

    /// Set the version, builder style.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Visit the standard's own ref and every nested requirement/level ref.
    pub fn each_bom_ref(&self, f: &mut impl FnMut(&BomRef)) {
        f(&self.bom_ref);
        for req in &self.requirements {
            f(&req.bom_ref);
        }
        for level in &self.levels {
            f(&level.bom_ref);
        }
    }

    pub(crate) fn each_bom_ref_mut(&mut self, f: &mut impl FnMut(&mut BomRef)) {
        f(&mut self.bom_ref);
        for req in &mut self.requirements {
            f(&mut req.bom_ref);
        }
        for level in &mut self.levels {
            f(&mut level.bom_ref);
        }
    }
}

impl CanonicalOrder for Standard {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (
            self.name.as_str(),
            opt_str(&self.version),
            self.bom_ref.value(),
        )
            .cmp(&(
                other.name.as_str(),
                opt_str(&other.version),
                other.bom_ref.value(),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_visits_requirement_and_level_refs() {
        let mut std = Standard::new("NIST SSDF").with_version("1.1");
        std.bom_ref = BomRef::new("std");
        let mut req = Requirement::new("PO.1.1");
        req.bom_ref = BomRef::new("req");
        std.requirements.push(req);
        let mut level = Level::new("baseline");
        level.bom_ref = BomRef::new("lvl");
        std.levels.push(level);

        let mut seen = Vec::new();
        std.each_bom_ref(&mut |r| seen.push(r.value().to_string()));
        assert_eq!(seen, vec!["std", "req", "lvl"]);
    }
}
