//! Service entities.
//!
//! Services mirror components structurally: an owned tree with bom-ref
//! identity, participating in the same dependency edge set.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{BomRef, ExternalReference, Licenses, OrganizationalEntity};
use crate::order::{opt_str, CanonicalOrder};

/// A service endpoint described by the document, possibly owning nested
/// services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub bom_ref: BomRef,
    pub provider: Option<OrganizationalEntity>,
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub licenses: Licenses,
    pub external_references: Vec<ExternalReference>,
    /// Nested services: an owned tree, not a set of references.
    pub services: Vec<Service>,
}

impl Service {
    /// Create a service with a generated bom-ref and minimal fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            bom_ref: BomRef::default(),
            provider: None,
            group: None,
            name: name.into(),
            version: None,
            description: None,
            licenses: Licenses::new(),
            external_references: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Set an explicit bom-ref, builder style.
    #[must_use]
    pub fn with_bom_ref(mut self, bom_ref: impl Into<BomRef>) -> Self {
        self.bom_ref = bom_ref.into();
        self
    }

    /// Set the version, builder style.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the provider, builder style.
    #[must_use]
    pub fn with_provider(mut self, provider: OrganizationalEntity) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Visit this service's ref and every nested service's ref.
    pub fn each_bom_ref(&self, f: &mut impl FnMut(&BomRef)) {
        f(&self.bom_ref);
        for child in &self.services {
            child.each_bom_ref(f);
        }
    }

    /// Visit this service and every nested service.
    pub fn each_service(&self, f: &mut impl FnMut(&Service)) {
        f(self);
        for child in &self.services {
            child.each_service(f);
        }
    }

    pub(crate) fn each_bom_ref_mut(&mut self, f: &mut impl FnMut(&mut BomRef)) {
        f(&mut self.bom_ref);
        for child in &mut self.services {
            child.each_bom_ref_mut(f);
        }
    }
}

impl CanonicalOrder for Service {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (
            opt_str(&self.group),
            self.name.as_str(),
            opt_str(&self.version),
            self.bom_ref.value(),
        )
            .cmp(&(
                opt_str(&other.group),
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
    fn nested_service_refs_are_all_visited() {
        let mut root = Service::new("gateway").with_bom_ref("gw");
        root.services
            .push(Service::new("auth").with_bom_ref("auth"));

        let mut seen = Vec::new();
        root.each_bom_ref(&mut |r| seen.push(r.value().to_string()));
        assert_eq!(seen, vec!["gw", "auth"]);
    }

    #[test]
    fn nested_services_are_all_visited() {
        let mut root = Service::new("gateway");
        let mut child = Service::new("auth");
        child.services.push(Service::new("tokens"));
        root.services.push(child);

        let mut seen = Vec::new();
        root.each_service(&mut |s| seen.push(s.name.clone()));
        assert_eq!(seen, vec!["gateway", "auth", "tokens"]);
    }

    #[test]
    fn canonical_order_uses_name_then_version() {
        use crate::order::sort_canonical;
        let mut services = vec![
            Service::new("b").with_bom_ref("1"),
            Service::new("a").with_version("2.0").with_bom_ref("2"),
            Service::new("a").with_version("1.0").with_bom_ref("3"),
        ];
        sort_canonical(&mut services);
        assert_eq!(services[0].version.as_deref(), Some("1.0"));
        assert_eq!(services[2].name, "b");
    }
}
