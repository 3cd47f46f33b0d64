//! Referential-integrity and encodability validation.
//!
//! Validation mutates the document once (edge normalization) and then checks
//! the dependency edge set and license collections against the rules every
//! target schema shares. Structural schema conformance of serialized output
//! is a separate concern behind the [`SchemaValidator`] seam.

use std::collections::{BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::model::{Bom, BomRef};
use crate::spec_version::{OutputFormat, SpecVersion};

/// A non-fatal finding produced by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// The metadata root component has no outgoing dependency edges.
    RootComponentWithoutDependencies { bom_ref: String },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RootComponentWithoutDependencies { bom_ref } => {
                write!(f, "root component '{bom_ref}' has no dependency edges")
            }
        }
    }
}

/// What validation found, when it did not fail outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Ensure every declared entity ref appears as an edge-map key.
///
/// Entities with no registered dependencies get an empty target set, so the
/// emitted dependency section enumerates every entity explicitly.
fn normalize_edges(bom: &mut Bom) {
    let mut declared: Vec<BomRef> = Vec::new();
    if let Some(root) = &bom.metadata.component {
        root.each_bom_ref(&mut |r| declared.push(r.clone()));
    }
    for c in &bom.components {
        c.each_bom_ref(&mut |r| declared.push(r.clone()));
    }
    for s in &bom.services {
        s.each_bom_ref(&mut |r| declared.push(r.clone()));
    }
    for bom_ref in declared {
        bom.dependencies.entry(bom_ref).or_insert_with(BTreeSet::new);
    }
}

/// Validate the document's referential integrity and license collections.
///
/// Steps, in order:
/// 1. Normalize edges: every dependable entity gets an edge-map entry.
/// 2. Collect the dependable set (root tree, components, services).
/// 3. Collect every ref the edge map mentions, keys and targets alike.
/// 4. Any mentioned ref outside the dependable set fails validation.
/// 5. A root component whose target set is empty yields a warning.
/// 6. Any entity mixing a license expression with other entries fails.
pub fn validate(bom: &mut Bom) -> Result<ValidationOutcome> {
    normalize_edges(bom);

    let dependable = bom.all_dependable_refs();

    let mut mentioned: BTreeSet<&BomRef> = BTreeSet::new();
    for (dependent, targets) in &bom.dependencies {
        mentioned.insert(dependent);
        mentioned.extend(targets.iter());
    }

    let dangling: Vec<String> = mentioned
        .iter()
        .filter(|r| !dependable.contains(*r))
        .map(|r| r.value().to_string())
        .collect();
    if !dangling.is_empty() {
        tracing::warn!(count = dangling.len(), "dangling dependency references");
        return Err(Error::unknown_dependencies(dangling));
    }

    let mut outcome = ValidationOutcome::default();
    if let Some(root) = &bom.metadata.component {
        let no_edges = bom
            .dependencies
            .get(&root.bom_ref)
            .map_or(true, BTreeSet::is_empty);
        if no_edges {
            tracing::warn!(bom_ref = %root.bom_ref, "root component has no dependency edges");
            outcome
                .warnings
                .push(ValidationWarning::RootComponentWithoutDependencies {
                    bom_ref: root.bom_ref.value().to_string(),
                });
        }
    }

    check_license_collections(bom)?;

    Ok(outcome)
}

/// Fail on any entity whose license collection mixes an expression with
/// other entries.
fn check_license_collections(bom: &Bom) -> Result<()> {
    fn mixed(licenses: &crate::model::Licenses) -> bool {
        licenses.len() > 1 && licenses.contains_expression()
    }

    let mut offender: Option<String> = None;
    let mut check = |owner: String, licenses: &crate::model::Licenses| {
        if offender.is_none() && mixed(licenses) {
            offender = Some(owner);
        }
    };

    if let Some(root) = &bom.metadata.component {
        root.each_component(&mut |c| check(c.display_name(), &c.licenses));
    }
    check("metadata".to_string(), &bom.metadata.licenses);
    for c in &bom.components {
        c.each_component(&mut |c| check(c.display_name(), &c.licenses));
    }
    for s in &bom.services {
        s.each_service(&mut |s| check(s.name.clone(), &s.licenses));
    }

    match offender {
        Some(owner) => Err(Error::license_expression_along_with_others(owner)),
        None => Ok(()),
    }
}

/// A reported violation of an external schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer or XPath-like location of the violation.
    pub path: String,
    pub message: String,
}

/// Pluggable structural validation of serialized output against the official
/// schemas. Implementations typically wrap a JSON Schema or XSD engine.
pub trait SchemaValidator {
    /// Check `document` against the schema for `version` in `format`.
    fn check(
        &self,
        document: &str,
        format: OutputFormat,
        version: SpecVersion,
    ) -> Result<Vec<SchemaViolation>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Component, ComponentType, DisjunctiveLicense, LicenseChoice, LicenseExpression,
    };

    fn make_component(name: &str, bom_ref: &str) -> Component {
        Component::new(ComponentType::Library, name).with_bom_ref(bom_ref)
    }

    #[test]
    fn normalization_gives_every_entity_an_edge_entry() {
        let mut bom = Bom::default();
        bom.add_component(make_component("a", "a"));
        bom.add_component(make_component("b", "b"));
        bom.register_dependency(BomRef::new("a"), [BomRef::new("b")]);

        validate(&mut bom).expect("valid document");
        assert!(bom.dependencies.contains_key(&BomRef::new("b")));
        assert!(bom.dependencies[&BomRef::new("b")].is_empty());
    }

    #[test]
    fn dangling_target_fails_validation() {
        let mut bom = Bom::default();
        bom.add_component(make_component("a", "a"));
        bom.register_dependency(BomRef::new("a"), [BomRef::new("ghost")]);

        let err = validate(&mut bom).unwrap_err();
        match err {
            Error::UnknownComponentDependency { refs } => {
                assert_eq!(refs, vec!["ghost".to_string()]);
            }
            other => panic!("expected UnknownComponentDependency, got {other:?}"),
        }
    }

    #[test]
    fn dangling_key_fails_validation() {
        let mut bom = Bom::default();
        bom.add_component(make_component("a", "a"));
        bom.register_dependency(BomRef::new("ghost"), [BomRef::new("a")]);

        assert!(matches!(
            validate(&mut bom).unwrap_err(),
            Error::UnknownComponentDependency { .. }
        ));
    }

    #[test]
    fn root_without_edges_warns() {
        let mut bom = Bom::default();
        bom.metadata.component = Some(make_component("app", "root"));

        let outcome = validate(&mut bom).expect("warning, not error");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            ValidationWarning::RootComponentWithoutDependencies { bom_ref } if bom_ref == "root"
        ));
    }

    #[test]
    fn root_with_edges_is_clean() {
        let mut bom = Bom::default();
        bom.metadata.component = Some(make_component("app", "root"));
        bom.add_component(make_component("lib", "lib"));
        bom.register_dependency(BomRef::new("root"), [BomRef::new("lib")]);

        let outcome = validate(&mut bom).expect("valid document");
        assert!(outcome.is_clean());
    }

    #[test]
    fn mixed_license_collection_fails() {
        let mut component = make_component("lib", "lib");
        component.licenses.push(LicenseChoice::License(
            DisjunctiveLicense::from_id("MIT").expect("known id"),
        ));
        component.licenses.push(LicenseChoice::Expression(
            LicenseExpression::try_new("MIT OR Apache-2.0").expect("valid"),
        ));
        let mut bom = Bom::default();
        bom.add_component(component);

        assert!(matches!(
            validate(&mut bom).unwrap_err(),
            Error::LicenseExpressionAlongWithOthers { .. }
        ));
    }

    #[test]
    fn nested_service_with_mixed_licenses_fails() {
        use crate::model::Service;

        let mut child = Service::new("tokens").with_bom_ref("tokens");
        child.licenses.push(LicenseChoice::License(
            DisjunctiveLicense::from_id("MIT").expect("known id"),
        ));
        child.licenses.push(LicenseChoice::Expression(
            LicenseExpression::try_new("MIT OR Apache-2.0").expect("valid"),
        ));
        let mut parent = Service::new("auth").with_bom_ref("auth");
        parent.services.push(child);
        let mut bom = Bom::default();
        bom.add_service(parent);

        assert!(matches!(
            validate(&mut bom).unwrap_err(),
            Error::LicenseExpressionAlongWithOthers { .. }
        ));
    }

    #[test]
    fn lone_expression_is_fine() {
        let mut component = make_component("lib", "lib");
        component.licenses.push(LicenseChoice::Expression(
            LicenseExpression::try_new("MIT OR Apache-2.0").expect("valid"),
        ));
        let mut bom = Bom::default();
        bom.add_component(component);

        assert!(validate(&mut bom).is_ok());
    }
}
