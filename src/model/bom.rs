//! The document aggregate: entities plus the dependency edge set.
//!
//! Cross-entity relationships are expressed only as bom-ref pairs in the edge
//! map, never as object references. The edge map is a `BTreeMap` keyed by ref
//! so iteration order, and therefore emission order, is stable.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BomRef, Component, Metadata, Service, Standard, Vulnerability};
use crate::utils::hash::content_hash;

/// A complete bill-of-materials document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bom {
    /// Document serial number in `urn:uuid:` form.
    pub serial_number: Option<String>,
    /// Revision counter for documents describing the same subject.
    pub version: u32,
    pub metadata: Metadata,
    pub components: Vec<Component>,
    pub services: Vec<Service>,
    /// Dependency edges: each key depends on each ref in its value set.
    pub dependencies: BTreeMap<BomRef, BTreeSet<BomRef>>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub definitions: Vec<Standard>,
}

impl Bom {
    /// A fresh document with a generated serial number, revision 1, and
    /// timestamped metadata.
    #[must_use]
    pub fn new() -> Self {
        Self {
            serial_number: Some(format!("urn:uuid:{}", Uuid::new_v4())),
            version: 1,
            metadata: Metadata::new(),
            ..Self::default()
        }
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn add_service(&mut self, service: Service) {
        self.services.push(service);
    }

    pub fn add_vulnerability(&mut self, vulnerability: Vulnerability) {
        self.vulnerabilities.push(vulnerability);
    }

    pub fn add_standard(&mut self, standard: Standard) {
        self.definitions.push(standard);
    }

    /// Record that `dependent` depends on each of `depends_on`.
    ///
    /// Edges merge: registering the same dependent twice unions the target
    /// sets. An empty target list still creates the key, declaring the
    /// dependent as having no (known) dependencies.
    pub fn register_dependency(
        &mut self,
        dependent: impl Into<BomRef>,
        depends_on: impl IntoIterator<Item = BomRef>,
    ) {
        let entry = self.dependencies.entry(dependent.into()).or_default();
        entry.extend(depends_on);
    }

    /// Visit every bom-ref declared by an entity in the document, in
    /// declaration order: metadata (root component tree, typed tools), then
    /// components, services, vulnerabilities, and definitions.
    ///
    /// Dependency edges are deliberately not visited; they reference
    /// identities, they do not declare them.
    pub fn each_bom_ref(&self, f: &mut impl FnMut(&BomRef)) {
        self.metadata.each_bom_ref(f);
        for c in &self.components {
            c.each_bom_ref(f);
        }
        for s in &self.services {
            s.each_bom_ref(f);
        }
        for v in &self.vulnerabilities {
            f(&v.bom_ref);
        }
        for d in &self.definitions {
            d.each_bom_ref(f);
        }
    }

    pub(crate) fn each_bom_ref_mut(&mut self, f: &mut impl FnMut(&mut BomRef)) {
        self.metadata.each_bom_ref_mut(f);
        for c in &mut self.components {
            c.each_bom_ref_mut(f);
        }
        for s in &mut self.services {
            s.each_bom_ref_mut(f);
        }
        for v in &mut self.vulnerabilities {
            f(&mut v.bom_ref);
        }
        for d in &mut self.definitions {
            d.each_bom_ref_mut(f);
        }
    }

    /// The set of refs that may legally appear in dependency edges: the root
    /// component tree plus declared components and services (transitively).
    ///
    /// Vulnerabilities and definitions declare identities but are not
    /// dependable.
    #[must_use]
    pub fn all_dependable_refs(&self) -> HashSet<BomRef> {
        let mut refs = HashSet::new();
        if let Some(root) = &self.metadata.component {
            root.each_bom_ref(&mut |r| {
                refs.insert(r.clone());
            });
        }
        for c in &self.components {
            c.each_bom_ref(&mut |r| {
                refs.insert(r.clone());
            });
        }
        for s in &self.services {
            s.each_bom_ref(&mut |r| {
                refs.insert(r.clone());
            });
        }
        refs
    }

    /// Fast content fingerprint over the serialized model.
    ///
    /// Stable for equal documents within one version of this library; not a
    /// cross-version or cross-process persistent identifier.
    #[must_use]
    pub fn content_fingerprint(&self) -> u64 {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        content_hash(&encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComponentType;

    fn make_component(name: &str, bom_ref: &str) -> Component {
        Component::new(ComponentType::Library, name).with_bom_ref(bom_ref)
    }

    #[test]
    fn new_bom_has_serial_and_revision() {
        let bom = Bom::new();
        assert!(bom
            .serial_number
            .as_deref()
            .is_some_and(|s| s.starts_with("urn:uuid:")));
        assert_eq!(bom.version, 1);
        assert!(bom.metadata.timestamp.is_some());
    }

    #[test]
    fn register_dependency_merges_target_sets() {
        let mut bom = Bom::default();
        bom.register_dependency(BomRef::new("a"), [BomRef::new("b")]);
        bom.register_dependency(BomRef::new("a"), [BomRef::new("c"), BomRef::new("b")]);
        let targets = &bom.dependencies[&BomRef::new("a")];
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn empty_target_list_still_declares_the_dependent() {
        let mut bom = Bom::default();
        bom.register_dependency(BomRef::new("a"), []);
        assert!(bom.dependencies.contains_key(&BomRef::new("a")));
    }

    #[test]
    fn each_bom_ref_walks_entities_not_edges() {
        let mut bom = Bom::default();
        bom.metadata.component = Some(make_component("app", "root"));
        bom.add_component(make_component("lib", "lib-1"));
        bom.add_service(crate::model::Service::new("svc").with_bom_ref("svc-1"));
        bom.register_dependency(BomRef::new("root"), [BomRef::new("ghost")]);

        let mut seen = Vec::new();
        bom.each_bom_ref(&mut |r| seen.push(r.value().to_string()));
        assert_eq!(seen, vec!["root", "lib-1", "svc-1"]);
    }

    #[test]
    fn dependable_refs_include_nested_but_not_vulnerabilities() {
        let mut parent = make_component("parent", "parent");
        parent.components.push(make_component("child", "child"));
        let mut bom = Bom::default();
        bom.add_component(parent);
        bom.add_vulnerability(
            crate::model::Vulnerability::new("CVE-2024-1").affecting("parent"),
        );

        let refs = bom.all_dependable_refs();
        assert!(refs.contains(&BomRef::new("parent")));
        assert!(refs.contains(&BomRef::new("child")));
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut bom = Bom::default();
        bom.add_component(make_component("lib", "lib-1"));
        let before = bom.content_fingerprint();
        bom.add_component(make_component("lib2", "lib-2"));
        assert_ne!(before, bom.content_fingerprint());
    }
}
