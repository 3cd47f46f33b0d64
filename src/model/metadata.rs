//! Document metadata: timestamp, creation tools, authors, root component.
//!
//! The tool collection carries the legacy/typed shape split: the 1.2–1.4
//! schemas describe tools as flat vendor/name/version records, while 1.5+
//! describes them as full component and service entities. [`Tools`] holds
//! whichever shape the caller (or the parsed document) chose and projects
//! to the other shape on demand at emit time.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BomRef, Component, ComponentType, ExternalReference, Hash, Licenses,
    OrganizationalContact, OrganizationalEntity, Service,
};
use crate::error::{Error, Result};
use crate::order::{opt_str, sorted_clone, CanonicalOrder};

/// A creation tool in the legacy flat shape (schema 1.2–1.4).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub hashes: Vec<Hash>,
    pub external_references: Vec<ExternalReference>,
}

impl Tool {
    /// Create a tool with vendor, name, and version.
    pub fn new(
        vendor: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            vendor: Some(vendor.into()),
            name: Some(name.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// This library itself, as a creation tool entry.
    #[must_use]
    pub fn this_tool() -> Self {
        Self {
            vendor: None,
            name: Some(env!("CARGO_PKG_NAME").to_string()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            hashes: Vec::new(),
            external_references: Vec::new(),
        }
    }
}

impl CanonicalOrder for Tool {
    fn canonical_cmp(&self, other: &Self) -> std::cmp::Ordering {
        (opt_str(&self.name), opt_str(&self.vendor), opt_str(&self.version)).cmp(&(
            opt_str(&other.name),
            opt_str(&other.vendor),
            opt_str(&other.version),
        ))
    }
}

/// The tools that created the document, in either the legacy or typed shape.
///
/// The two shapes are mutually exclusive on a single collection: mixing
/// legacy `Tool` entries with typed component/service entries is rejected at
/// mutation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tools {
    tools: Vec<Tool>,
    components: Vec<Component>,
    services: Vec<Service>,
}

impl Tools {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.components.is_empty() && self.services.is_empty()
    }

    /// Whether any entry uses the typed component/service shape.
    #[must_use]
    pub fn is_typed(&self) -> bool {
        !self.components.is_empty() || !self.services.is_empty()
    }

    /// Add a legacy-shape tool. Fails if typed entries already exist.
    pub fn add_tool(&mut self, tool: Tool) -> Result<()> {
        if self.is_typed() {
            return Err(Error::mutually_exclusive(
                "legacy tool entries cannot be mixed with typed tool components/services",
            ));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Add a typed tool component. Fails if legacy entries already exist.
    pub fn add_component(&mut self, component: Component) -> Result<()> {
        if !self.tools.is_empty() {
            return Err(Error::mutually_exclusive(
                "typed tool components cannot be mixed with legacy tool entries",
            ));
        }
        self.components.push(component);
        Ok(())
    }

    /// Add a typed tool service. Fails if legacy entries already exist.
    pub fn add_service(&mut self, service: Service) -> Result<()> {
        if !self.tools.is_empty() {
            return Err(Error::mutually_exclusive(
                "typed tool services cannot be mixed with legacy tool entries",
            ));
        }
        self.services.push(service);
        Ok(())
    }

    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub(crate) fn from_parts(
        tools: Vec<Tool>,
        components: Vec<Component>,
        services: Vec<Service>,
    ) -> Self {
        Self {
            tools,
            components,
            services,
        }
    }

    /// Project every entry into the legacy flat shape, sorted.
    ///
    /// Non-mutating: typed entries stay typed in the model, the flattened
    /// records exist only in the returned vector. Typed services flatten the
    /// same way as components, with the provider name as vendor.
    #[must_use]
    pub fn as_legacy(&self) -> Vec<Tool> {
        let mut out: Vec<Tool> = self.tools.clone();
        out.extend(self.components.iter().map(|c| Tool {
            vendor: c.supplier.as_ref().and_then(|s| s.name.clone()),
            name: Some(c.name.clone()),
            version: c.version.clone(),
            hashes: c.hashes.clone(),
            external_references: c.external_references.clone(),
        }));
        out.extend(self.services.iter().map(|s| Tool {
            vendor: s.provider.as_ref().and_then(|p| p.name.clone()),
            name: Some(s.name.clone()),
            version: s.version.clone(),
            hashes: Vec::new(),
            external_references: s.external_references.clone(),
        }));
        out.sort_by(|a, b| a.canonical_cmp(b));
        out
    }

    /// Project every entry into the typed shape, sorted.
    ///
    /// Legacy entries become application components with a deterministic
    /// bom-ref derived from name and version, so repeated projections of the
    /// same collection are byte-identical.
    #[must_use]
    pub fn as_typed(&self) -> (Vec<Component>, Vec<Service>) {
        let mut components = sorted_clone(&self.components);
        components.extend(self.tools.iter().map(|t| {
            let name = t.name.clone().unwrap_or_default();
            let synthetic_ref = match &t.version {
                Some(v) => format!("{name}@{v}"),
                None => name.clone(),
            };
            let mut c = Component::new(ComponentType::Application, name)
                .with_bom_ref(synthetic_ref);
            c.version = t.version.clone();
            c.supplier = t.vendor.clone().map(OrganizationalEntity::named);
            c.hashes = t.hashes.clone();
            c.external_references = t.external_references.clone();
            c
        }));
        components.sort_by(|a, b| a.canonical_cmp(b));
        let services = sorted_clone(&self.services);
        (components, services)
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Creation timestamp; `Default` leaves it unset, [`Metadata::new`] stamps
    /// the current instant.
    pub timestamp: Option<DateTime<Utc>>,
    pub tools: Tools,
    pub authors: Vec<OrganizationalContact>,
    /// The root component the document describes.
    pub component: Option<Component>,
    pub manufacture: Option<OrganizationalEntity>,
    pub supplier: Option<OrganizationalEntity>,
    /// Document license(s), encodable from schema 1.3 on.
    pub licenses: Licenses,
}

impl Metadata {
    /// Metadata stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timestamp: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Set the root component, builder style.
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.component = Some(component);
        self
    }

    /// RFC 3339 rendering of the timestamp, if set.
    #[must_use]
    pub fn timestamp_rfc3339(&self) -> Option<String> {
        self.timestamp
            .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// Visit every bom-ref owned by the metadata block: the root component
    /// tree and any typed tool entities.
    pub fn each_bom_ref(&self, f: &mut impl FnMut(&BomRef)) {
        if let Some(component) = &self.component {
            component.each_bom_ref(f);
        }
        for c in &self.tools.components {
            c.each_bom_ref(f);
        }
        for s in &self.tools.services {
            s.each_bom_ref(f);
        }
    }

    pub(crate) fn each_bom_ref_mut(&mut self, f: &mut impl FnMut(&mut BomRef)) {
        if let Some(component) = &mut self.component {
            component.each_bom_ref_mut(f);
        }
        for c in &mut self.tools.components {
            c.each_bom_ref_mut(f);
        }
        for s in &mut self.tools.services {
            s.each_bom_ref_mut(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_shapes_are_mutually_exclusive() {
        let mut tools = Tools::new();
        tools
            .add_tool(Tool::new("acme", "scanner", "1.0"))
            .expect("first shape wins");
        let err = tools
            .add_component(Component::new(ComponentType::Application, "scanner"))
            .unwrap_err();
        assert!(matches!(err, Error::MutuallyExclusiveProperties(_)));

        let mut tools = Tools::new();
        tools
            .add_component(Component::new(ComponentType::Application, "scanner"))
            .expect("first shape wins");
        assert!(tools.add_tool(Tool::new("acme", "scanner", "1.0")).is_err());
        assert!(tools.add_service(Service::new("scan-api")).is_ok());
    }

    #[test]
    fn legacy_projection_flattens_typed_entries() {
        let mut tools = Tools::new();
        let mut c = Component::new(ComponentType::Application, "scanner");
        c.version = Some("2.0".to_string());
        c.supplier = Some(OrganizationalEntity::named("Acme"));
        tools.add_component(c).expect("typed shape");
        tools
            .add_service(Service::new("scan-api").with_version("1.1"))
            .expect("typed shape");

        let legacy = tools.as_legacy();
        assert_eq!(legacy.len(), 2);
        assert_eq!(legacy[0].name.as_deref(), Some("scan-api"));
        assert_eq!(legacy[1].vendor.as_deref(), Some("Acme"));
        // The model keeps its typed shape.
        assert!(tools.is_typed());
    }

    #[test]
    fn typed_projection_is_deterministic() {
        let mut tools = Tools::new();
        tools
            .add_tool(Tool::new("acme", "scanner", "1.0"))
            .expect("legacy shape");

        let (first, _) = tools.as_typed();
        let (second, _) = tools.as_typed();
        assert_eq!(first[0].bom_ref, second[0].bom_ref);
        assert_eq!(first[0].bom_ref.value(), "scanner@1.0");
    }

    #[test]
    fn this_tool_names_the_library() {
        let tool = Tool::this_tool();
        assert_eq!(tool.name.as_deref(), Some(env!("CARGO_PKG_NAME")));
        assert!(tool.version.is_some());
    }

    #[test]
    fn metadata_new_stamps_a_timestamp() {
        assert!(Metadata::new().timestamp.is_some());
        assert!(Metadata::default().timestamp.is_none());
    }
}
