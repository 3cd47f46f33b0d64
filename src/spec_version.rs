//! Schema versions and the per-feature visibility table.
//!
//! CycloneDX has gone through seven mutually incompatible schema revisions.
//! One in-memory graph serializes into any of them; which fields and document
//! sections are eligible for a given target is decided here, in a single
//! explicit lookup, rather than scattered per-field annotations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A CycloneDX schema revision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SpecVersion {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
    V1_4,
    V1_5,
    V1_6,
}

impl SpecVersion {
    /// The newest supported schema revision.
    pub const LATEST: Self = Self::V1_6;

    /// All supported revisions, oldest first.
    pub const ALL: [Self; 7] = [
        Self::V1_0,
        Self::V1_1,
        Self::V1_2,
        Self::V1_3,
        Self::V1_4,
        Self::V1_5,
        Self::V1_6,
    ];

    /// The wire form, e.g. `"1.4"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
            Self::V1_5 => "1.5",
            Self::V1_6 => "1.6",
        }
    }

    /// The XML namespace for this revision.
    #[must_use]
    pub fn xml_namespace(self) -> String {
        format!("http://cyclonedx.org/schema/bom/{}", self.as_str())
    }

    /// Whether `feature` has an encoding in this revision.
    ///
    /// This is the whole view-gate table: a pure function of
    /// (feature, version), consulted by the projection routines in `emit`.
    #[must_use]
    pub fn supports(self, feature: SchemaFeature) -> bool {
        use SchemaFeature::*;
        match feature {
            ExternalReferences => self >= Self::V1_1,
            // The JSON encoding itself first appeared in 1.2, together with
            // the metadata block, services and the dependency graph.
            JsonEncoding | Metadata | Dependencies | Services | ComponentAuthor => {
                self >= Self::V1_2
            }
            MetadataLicenses | ComponentProperties => self >= Self::V1_3,
            Vulnerabilities => self >= Self::V1_4,
            ToolComponents => self >= Self::V1_5,
            Definitions => self >= Self::V1_6,
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(Self::V1_0),
            "1.1" => Ok(Self::V1_1),
            "1.2" => Ok(Self::V1_2),
            "1.3" => Ok(Self::V1_3),
            "1.4" => Ok(Self::V1_4),
            "1.5" => Ok(Self::V1_5),
            "1.6" => Ok(Self::V1_6),
            other => Err(Error::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Schema capabilities that appeared (or changed shape) at a specific revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFeature {
    /// The structured-object encoding as a whole (1.2+).
    JsonEncoding,
    /// `externalReferences` on components and tools (1.1+).
    ExternalReferences,
    /// The `metadata` block (1.2+).
    Metadata,
    /// The flat dependency edge set (1.2+).
    Dependencies,
    /// The service forest (1.2+).
    Services,
    /// `component.author` (1.2+).
    ComponentAuthor,
    /// `metadata.licenses` (1.3+).
    MetadataLicenses,
    /// `component.properties` (1.3+).
    ComponentProperties,
    /// The embedded vulnerability set (1.4+).
    Vulnerabilities,
    /// Tools expressed as typed component/service collections (1.5+).
    ToolComponents,
    /// The `definitions` block with standards (1.6 only as of now).
    Definitions,
}

/// The two wire encodings a document can be rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Structured-object encoding.
    Json,
    /// Markup-tree encoding.
    Xml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Xml => write!(f, "XML"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_ordered() {
        assert!(SpecVersion::V1_0 < SpecVersion::V1_6);
        assert!(SpecVersion::V1_4 < SpecVersion::V1_5);
        assert_eq!(SpecVersion::LATEST, SpecVersion::V1_6);
    }

    #[test]
    fn round_trips_through_str() {
        for version in SpecVersion::ALL {
            let parsed: SpecVersion = version.as_str().parse().expect("known version");
            assert_eq!(parsed, version);
        }
    }

    #[test]
    fn unknown_version_is_rejected() {
        assert!("2.0".parse::<SpecVersion>().is_err());
        assert!("".parse::<SpecVersion>().is_err());
    }

    #[test]
    fn feature_gates_match_schema_history() {
        assert!(!SpecVersion::V1_0.supports(SchemaFeature::ExternalReferences));
        assert!(SpecVersion::V1_1.supports(SchemaFeature::ExternalReferences));

        assert!(!SpecVersion::V1_1.supports(SchemaFeature::JsonEncoding));
        assert!(SpecVersion::V1_2.supports(SchemaFeature::Dependencies));

        assert!(!SpecVersion::V1_3.supports(SchemaFeature::Vulnerabilities));
        assert!(SpecVersion::V1_4.supports(SchemaFeature::Vulnerabilities));

        assert!(!SpecVersion::V1_4.supports(SchemaFeature::ToolComponents));
        assert!(SpecVersion::V1_5.supports(SchemaFeature::ToolComponents));

        assert!(!SpecVersion::V1_5.supports(SchemaFeature::Definitions));
        assert!(SpecVersion::V1_6.supports(SchemaFeature::Definitions));
    }

    #[test]
    fn xml_namespace_carries_version() {
        assert_eq!(
            SpecVersion::V1_6.xml_namespace(),
            "http://cyclonedx.org/schema/bom/1.6"
        );
    }
}
