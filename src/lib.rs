//! cdx-bom: an in-memory CycloneDX document graph with deterministic
//! multi-version serialization.
//!
//! One model, seven schema revisions (1.0 through 1.6), two encodings. The
//! graph is built programmatically or parsed from an existing document, then
//! rendered into any supported (format, version) pair:
//!
//! ```
//! use cdx_bom::{
//!     serialize, Bom, BomRef, Component, ComponentType, OutputFormat, SpecVersion,
//! };
//!
//! let mut bom = Bom::new();
//! bom.metadata.component = Some(
//!     Component::new(ComponentType::Application, "app").with_bom_ref("app"),
//! );
//! bom.add_component(
//!     Component::new(ComponentType::Library, "serde")
//!         .with_version("1.0.200")
//!         .with_bom_ref("serde"),
//! );
//! bom.register_dependency(BomRef::new("app"), [BomRef::new("serde")]);
//!
//! let json = serialize(&mut bom, OutputFormat::Json, SpecVersion::V1_4)?;
//! assert!(json.contains("\"specVersion\": \"1.4\""));
//! # Ok::<(), cdx_bom::Error>(())
//! ```
//!
//! Serialization validates referential integrity first (dangling dependency
//! edges are an error, not a silent omission), renames colliding bom-refs for
//! the duration of the render, and sorts every entity collection so repeated
//! runs over an unchanged graph are byte-identical.

#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod discriminator;
pub mod emit;
pub mod error;
pub mod model;
pub mod order;
pub mod parse;
pub mod spec_version;
pub mod utils;
pub mod validation;

pub use discriminator::{discriminate, DiscriminatedBom};
pub use emit::serialize;
pub use error::{Error, Result};
pub use model::{
    Bom, BomRef, Component, ComponentType, DisjunctiveLicense, ExternalReference,
    ExternalReferenceType, Hash, HashAlgorithm, Level, LicenseChoice, LicenseExpression,
    Licenses, Metadata, OrganizationalContact, OrganizationalEntity, Property, Requirement,
    Service, Severity, Standard, Tool, Tools, Vulnerability, VulnerabilityRating,
    VulnerabilitySource,
};
pub use parse::parse;
pub use spec_version::{OutputFormat, SchemaFeature, SpecVersion};
pub use validation::{validate, SchemaValidator, SchemaViolation, ValidationOutcome, ValidationWarning};
