//! Serialization pipeline.
//!
//! One entry point drives the whole pipeline: refuse (format, version) pairs
//! with no defined encoding, validate the graph, disambiguate colliding
//! bom-refs for the duration of the render, then project into the requested
//! encoding. The document is borrowed mutably because edge normalization and
//! the rename window touch it; both leave it semantically unchanged.

mod json;
mod xml;

use crate::discriminator::discriminate;
use crate::error::{Error, Result};
use crate::model::Bom;
use crate::spec_version::{OutputFormat, SchemaFeature, SpecVersion};
use crate::validation::validate;

/// Render `bom` into `format` at schema revision `version`.
pub fn serialize(bom: &mut Bom, format: OutputFormat, version: SpecVersion) -> Result<String> {
    if format == OutputFormat::Json && !version.supports(SchemaFeature::JsonEncoding) {
        return Err(Error::UnsupportedFormatVersion { format, version });
    }

    let outcome = validate(bom)?;
    for warning in &outcome.warnings {
        tracing::warn!(%warning, "validation warning");
    }

    let discriminated = discriminate(bom);
    match format {
        OutputFormat::Json => json::render(&discriminated, version),
        OutputFormat::Xml => xml::render(&discriminated, version),
    }
}
