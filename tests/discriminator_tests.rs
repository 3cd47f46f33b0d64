//! Scoped bom-ref disambiguation across whole documents.

use cdx_bom::{discriminate, Bom, BomRef, Component, ComponentType, Service};

fn make_component(name: &str, bom_ref: &str) -> Component {
    Component::new(ComponentType::Library, name).with_bom_ref(bom_ref)
}

#[test]
fn collisions_across_entity_kinds_are_resolved() {
    let mut bom = Bom::new();
    bom.add_component(make_component("lib", "shared"));
    bom.add_service(Service::new("svc").with_bom_ref("shared"));

    let guard = discriminate(&mut bom);
    assert_eq!(guard.components[0].bom_ref.value(), "shared");
    assert_eq!(guard.services[0].bom_ref.value(), "shared-1");
}

#[test]
fn guard_scope_bounds_the_renames() {
    let mut bom = Bom::new();
    bom.add_component(make_component("a", "dup"));
    bom.add_component(make_component("b", "dup"));

    {
        let guard = discriminate(&mut bom);
        assert_eq!(guard.renames().len(), 1);
        assert_eq!(guard.components[1].bom_ref.value(), "dup-1");
    }
    assert_eq!(bom.components[1].bom_ref.value(), "dup");
}

#[test]
fn dependency_edges_keep_pointing_at_the_survivor() {
    let mut bom = Bom::new();
    bom.metadata.component =
        Some(Component::new(ComponentType::Application, "app").with_bom_ref("app"));
    bom.add_component(make_component("a", "dup"));
    bom.add_component(make_component("b", "dup"));
    bom.register_dependency(BomRef::new("app"), [BomRef::new("dup")]);

    let guard = discriminate(&mut bom);
    let targets = &guard.dependencies[&BomRef::new("app")];
    assert!(targets.contains(&BomRef::new("dup")));
    assert!(!targets.contains(&BomRef::new("dup-1")));
}

#[test]
fn renames_survive_nested_trees() {
    let mut parent = make_component("parent", "x");
    parent.components.push(make_component("child", "x"));
    let mut bom = Bom::new();
    bom.add_component(parent);

    {
        let guard = discriminate(&mut bom);
        assert_eq!(guard.components[0].bom_ref.value(), "x");
        assert_eq!(guard.components[0].components[0].bom_ref.value(), "x-1");
    }
    assert_eq!(bom.components[0].components[0].bom_ref.value(), "x");
}

#[test]
fn repeated_discrimination_yields_the_same_names() {
    let mut bom = Bom::new();
    bom.add_component(make_component("a", "dup"));
    bom.add_component(make_component("b", "dup"));
    bom.add_component(make_component("c", "dup"));

    let first: Vec<String> = {
        let guard = discriminate(&mut bom);
        guard
            .components
            .iter()
            .map(|c| c.bom_ref.value().to_string())
            .collect()
    };
    let second: Vec<String> = {
        let guard = discriminate(&mut bom);
        guard
            .components
            .iter()
            .map(|c| c.bom_ref.value().to_string())
            .collect()
    };
    assert_eq!(first, second);
    assert_eq!(first, vec!["dup", "dup-1", "dup-2"]);
}
