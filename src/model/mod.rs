//! The document model.
//!
//! Entities own their subtrees; cross-entity relationships live in the
//! [`Bom`] dependency edge map as bom-ref pairs.

mod bom;
mod bom_ref;
mod component;
mod definitions;
mod external_reference;
mod hash;
mod license;
mod metadata;
mod organization;
mod service;
mod vulnerability;

pub use bom::Bom;
pub use bom_ref::BomRef;
pub use component::{Component, ComponentType, Property};
pub use definitions::{Level, Requirement, Standard};
pub use external_reference::{ExternalReference, ExternalReferenceType};
pub use hash::{Hash, HashAlgorithm};
pub use license::{
    is_compound_expression, spdx_canonical_id, DisjunctiveLicense, LicenseChoice,
    LicenseExpression, Licenses,
};
pub use metadata::{Metadata, Tool, Tools};
pub use organization::{OrganizationalContact, OrganizationalEntity};
pub use service::Service;
pub use vulnerability::{
    Severity, Vulnerability, VulnerabilityRating, VulnerabilitySource,
};
