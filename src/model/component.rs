//! Component entities: the heart of the document graph.
//!
//! Components form an owned tree (a component may own nested components);
//! cross-references between components always go through [`BomRef`] values in
//! the dependency edge set, never through object references, which keeps the
//! ownership tree acyclic by construction.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BomRef, ExternalReference, Hash, Licenses, OrganizationalEntity};
use crate::order::{opt_str, CanonicalOrder};
use crate::spec_version::SpecVersion;

/// Component type vocabulary, each entry tagged with the schema revision that
/// introduced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Application,
    Framework,
    Library,
    OperatingSystem,
    Device,
    File,
    Container,
    Firmware,
    DeviceDriver,
    Platform,
    MachineLearningModel,
    Data,
    CryptographicAsset,
}

impl ComponentType {
    /// The wire spelling, e.g. `"operating-system"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Framework => "framework",
            Self::Library => "library",
            Self::OperatingSystem => "operating-system",
            Self::Device => "device",
            Self::File => "file",
            Self::Container => "container",
            Self::Firmware => "firmware",
            Self::DeviceDriver => "device-driver",
            Self::Platform => "platform",
            Self::MachineLearningModel => "machine-learning-model",
            Self::Data => "data",
            Self::CryptographicAsset => "cryptographic-asset",
        }
    }

    /// First schema revision in which this type has an encoding.
    #[must_use]
    pub const fn supported_since(self) -> SpecVersion {
        match self {
            Self::Application
            | Self::Framework
            | Self::Library
            | Self::OperatingSystem
            | Self::Device => SpecVersion::V1_0,
            Self::File => SpecVersion::V1_1,
            Self::Container | Self::Firmware => SpecVersion::V1_2,
            Self::DeviceDriver | Self::Platform | Self::MachineLearningModel | Self::Data => {
                SpecVersion::V1_5
            }
            Self::CryptographicAsset => SpecVersion::V1_6,
        }
    }

    /// Parse the wire spelling.
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "application" => Some(Self::Application),
            "framework" => Some(Self::Framework),
            "library" => Some(Self::Library),
            "operating-system" => Some(Self::OperatingSystem),
            "device" => Some(Self::Device),
            "file" => Some(Self::File),
            "container" => Some(Self::Container),
            "firmware" => Some(Self::Firmware),
            "device-driver" => Some(Self::DeviceDriver),
            "platform" => Some(Self::Platform),
            "machine-learning-model" => Some(Self::MachineLearningModel),
            "data" => Some(Self::Data),
            "cryptographic-asset" => Some(Self::CryptographicAsset),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A name/value annotation carried by a component (1.3+).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl CanonicalOrder for Property {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (&self.name, &self.value).cmp(&(&other.name, &other.value))
    }
}

/// A software component, possibly owning a subtree of nested components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub bom_ref: BomRef,
    pub component_type: ComponentType,
    pub name: String,
    pub version: Option<String>,
    /// Parsed semantic version, when `version` happens to be valid semver.
    pub semver: Option<semver::Version>,
    pub group: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub copyright: Option<String>,
    pub purl: Option<String>,
    pub cpe: Option<String>,
    pub supplier: Option<OrganizationalEntity>,
    pub licenses: Licenses,
    pub hashes: Vec<Hash>,
    pub external_references: Vec<ExternalReference>,
    pub properties: Vec<Property>,
    /// Nested components: an owned tree, not a set of references.
    pub components: Vec<Component>,
}

impl Component {
    /// Create a component with a generated bom-ref and minimal fields.
    pub fn new(component_type: ComponentType, name: impl Into<String>) -> Self {
        Self {
            bom_ref: BomRef::default(),
            component_type,
            name: name.into(),
            version: None,
            semver: None,
            group: None,
            description: None,
            author: None,
            copyright: None,
            purl: None,
            cpe: None,
            supplier: None,
            licenses: Licenses::new(),
            hashes: Vec::new(),
            external_references: Vec::new(),
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Set an explicit bom-ref, builder style.
    #[must_use]
    pub fn with_bom_ref(mut self, bom_ref: impl Into<BomRef>) -> Self {
        self.bom_ref = bom_ref.into();
        self
    }

    /// Set the version and opportunistically parse it as semver.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.semver = semver::Version::parse(&version).ok();
        self.version = Some(version);
        self
    }

    /// Set the package URL, builder style.
    #[must_use]
    pub fn with_purl(mut self, purl: impl Into<String>) -> Self {
        self.purl = Some(purl.into());
        self
    }

    /// Set the group/namespace, builder style.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Display name with version, e.g. `"serde@1.0.0"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.version
            .as_ref()
            .map_or_else(|| self.name.clone(), |v| format!("{}@{}", self.name, v))
    }

    /// Visit this component's ref and every nested component's ref.
    pub fn each_bom_ref(&self, f: &mut impl FnMut(&BomRef)) {
        f(&self.bom_ref);
        for child in &self.components {
            child.each_bom_ref(f);
        }
    }

    pub(crate) fn each_bom_ref_mut(&mut self, f: &mut impl FnMut(&mut BomRef)) {
        f(&mut self.bom_ref);
        for child in &mut self.components {
            child.each_bom_ref_mut(f);
        }
    }

    /// Visit this component and every nested component.
    pub fn each_component(&self, f: &mut impl FnMut(&Component)) {
        f(self);
        for child in &self.components {
            child.each_component(f);
        }
    }
}

impl CanonicalOrder for Component {
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
    use crate::order::sort_canonical;

    #[test]
    fn new_component_gets_a_fresh_ref() {
        let a = Component::new(ComponentType::Library, "lib");
        let b = Component::new(ComponentType::Library, "lib");
        assert_ne!(a.bom_ref, b.bom_ref);
    }

    #[test]
    fn with_version_parses_semver_opportunistically() {
        let c = Component::new(ComponentType::Library, "lib").with_version("1.2.3");
        assert!(c.semver.is_some());
        let c = Component::new(ComponentType::Library, "lib").with_version("1.0");
        assert!(c.semver.is_none());
        assert_eq!(c.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn type_gating_matches_schema_history() {
        assert_eq!(
            ComponentType::Library.supported_since(),
            SpecVersion::V1_0
        );
        assert_eq!(
            ComponentType::Container.supported_since(),
            SpecVersion::V1_2
        );
        assert_eq!(
            ComponentType::MachineLearningModel.supported_since(),
            SpecVersion::V1_5
        );
        assert_eq!(
            ComponentType::CryptographicAsset.supported_since(),
            SpecVersion::V1_6
        );
    }

    #[test]
    fn nested_refs_are_all_visited() {
        let mut root = Component::new(ComponentType::Application, "app")
            .with_bom_ref("root");
        let mut child = Component::new(ComponentType::Library, "lib").with_bom_ref("child");
        child
            .components
            .push(Component::new(ComponentType::Library, "leaf").with_bom_ref("leaf"));
        root.components.push(child);

        let mut seen = Vec::new();
        root.each_bom_ref(&mut |r| seen.push(r.value().to_string()));
        assert_eq!(seen, vec!["root", "child", "leaf"]);
    }

    #[test]
    fn canonical_order_is_group_name_version() {
        let mut comps = vec![
            Component::new(ComponentType::Library, "b").with_bom_ref("1"),
            Component::new(ComponentType::Library, "a")
                .with_group("org")
                .with_bom_ref("2"),
            Component::new(ComponentType::Library, "a").with_bom_ref("3"),
        ];
        sort_canonical(&mut comps);
        // Grouped "a" first (group present sorts before absent group), then
        // ungrouped by name.
        assert_eq!(comps[0].group.as_deref(), Some("org"));
        assert_eq!(comps[1].name, "a");
        assert_eq!(comps[2].name, "b");
    }
}
