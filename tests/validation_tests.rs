//! Referential-integrity validation over whole documents.

use cdx_bom::{
    validate, Bom, BomRef, Component, ComponentType, Error, Service, ValidationWarning,
};

fn make_component(name: &str, bom_ref: &str) -> Component {
    Component::new(ComponentType::Library, name)
        .with_version("1.0.0")
        .with_bom_ref(bom_ref)
}

fn make_bom_with_root() -> Bom {
    let mut bom = Bom::new();
    bom.metadata.component =
        Some(Component::new(ComponentType::Application, "app").with_bom_ref("app"));
    bom
}

#[test]
fn well_formed_graph_validates_cleanly() {
    let mut bom = make_bom_with_root();
    bom.add_component(make_component("serde", "serde"));
    bom.add_component(make_component("tokio", "tokio"));
    bom.register_dependency(BomRef::new("app"), [BomRef::new("serde"), BomRef::new("tokio")]);

    let outcome = validate(&mut bom).expect("valid graph");
    assert!(outcome.is_clean());
}

#[test]
fn every_entity_gets_a_self_edge_after_validation() {
    let mut bom = make_bom_with_root();
    bom.add_component(make_component("serde", "serde"));
    bom.register_dependency(BomRef::new("app"), [BomRef::new("serde")]);

    validate(&mut bom).expect("valid graph");
    // serde registered only as a target, still gets its own key.
    assert!(bom.dependencies.contains_key(&BomRef::new("serde")));
    assert!(bom.dependencies[&BomRef::new("serde")].is_empty());
}

#[test]
fn edge_to_undeclared_ref_is_rejected() {
    let mut bom = make_bom_with_root();
    bom.register_dependency(BomRef::new("app"), [BomRef::new("missing-ref")]);

    let err = validate(&mut bom).unwrap_err();
    match err {
        Error::UnknownComponentDependency { refs } => {
            assert_eq!(refs, vec!["missing-ref".to_string()]);
        }
        other => panic!("expected UnknownComponentDependency, got {other:?}"),
    }
}

#[test]
fn multiple_dangling_refs_are_reported_sorted() {
    let mut bom = make_bom_with_root();
    bom.register_dependency(
        BomRef::new("app"),
        [BomRef::new("zeta"), BomRef::new("alpha")],
    );

    match validate(&mut bom).unwrap_err() {
        Error::UnknownComponentDependency { refs } => {
            assert_eq!(refs, vec!["alpha".to_string(), "zeta".to_string()]);
        }
        other => panic!("expected UnknownComponentDependency, got {other:?}"),
    }
}

#[test]
fn nested_component_refs_are_dependable() {
    let mut parent = make_component("workspace", "workspace");
    parent.components.push(make_component("member", "member"));
    let mut bom = make_bom_with_root();
    bom.add_component(parent);
    bom.register_dependency(BomRef::new("app"), [BomRef::new("member")]);

    assert!(validate(&mut bom).is_ok());
}

#[test]
fn service_refs_are_dependable() {
    let mut bom = make_bom_with_root();
    bom.add_service(Service::new("auth-api").with_bom_ref("auth-api"));
    bom.register_dependency(BomRef::new("app"), [BomRef::new("auth-api")]);

    assert!(validate(&mut bom).is_ok());
}

#[test]
fn vulnerability_refs_are_not_dependable() {
    let mut bom = make_bom_with_root();
    bom.add_vulnerability(cdx_bom::Vulnerability::new("CVE-2024-1"));
    let vuln_ref = bom.vulnerabilities[0].bom_ref.clone();
    bom.register_dependency(BomRef::new("app"), [vuln_ref]);

    assert!(matches!(
        validate(&mut bom).unwrap_err(),
        Error::UnknownComponentDependency { .. }
    ));
}

#[test]
fn root_without_edges_is_a_warning_not_an_error() {
    let mut bom = make_bom_with_root();
    bom.add_component(make_component("serde", "serde"));

    let outcome = validate(&mut bom).expect("warning only");
    assert_eq!(outcome.warnings.len(), 1);
    match &outcome.warnings[0] {
        ValidationWarning::RootComponentWithoutDependencies { bom_ref } => {
            assert_eq!(bom_ref, "app");
        }
    }
}

#[test]
fn document_without_root_has_no_root_warning() {
    let mut bom = Bom::new();
    bom.add_component(make_component("serde", "serde"));

    let outcome = validate(&mut bom).expect("valid graph");
    assert!(outcome.is_clean());
}

#[test]
fn validation_is_idempotent() {
    let mut bom = make_bom_with_root();
    bom.add_component(make_component("serde", "serde"));
    bom.register_dependency(BomRef::new("app"), [BomRef::new("serde")]);

    validate(&mut bom).expect("first run");
    let snapshot = bom.clone();
    validate(&mut bom).expect("second run");
    assert_eq!(bom, snapshot);
}
