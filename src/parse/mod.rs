//! Deserialization of external documents into the model.
//!
//! Wire structs mirror each encoding's shape; conversion into the model is
//! where invariants are enforced (ref identity, license exclusivity via
//! demotion, hash algorithm vocabulary). The declared schema version must
//! match the requested one, and the converted document is validated before
//! being handed back.

mod json;
mod xml;

use crate::error::{Error, Result};
use crate::model::Bom;
use crate::spec_version::{OutputFormat, SchemaFeature, SpecVersion};
use crate::validation::validate;

/// Parse `content` as a document in `format` at schema revision `version`.
pub fn parse(content: &str, format: OutputFormat, version: SpecVersion) -> Result<Bom> {
    if format == OutputFormat::Json && !version.supports(SchemaFeature::JsonEncoding) {
        return Err(Error::UnsupportedFormatVersion { format, version });
    }

    let (mut bom, declared) = match format {
        OutputFormat::Json => json::parse(content)?,
        OutputFormat::Xml => xml::parse(content)?,
    };

    if let Some(declared) = declared {
        if declared != version {
            return Err(Error::UnsupportedVersion(format!(
                "document declares schema version {declared}, expected {version}"
            )));
        }
    }

    let outcome = validate(&mut bom)?;
    for warning in &outcome.warnings {
        tracing::warn!(%warning, "validation warning on parsed document");
    }

    Ok(bom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_parse_is_refused_below_1_2() {
        let err = parse("{}", OutputFormat::Json, SpecVersion::V1_0).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormatVersion { .. }));
    }

    #[test]
    fn declared_version_must_match() {
        let doc = r#"{ "bomFormat": "CycloneDX", "specVersion": "1.3", "version": 1 }"#;
        let err = parse(doc, OutputFormat::Json, SpecVersion::V1_4).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(_)));
    }
}
