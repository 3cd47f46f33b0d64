//! Unified error types for cdx-bom.
//!
//! One flat taxonomy covering construction-time invariant violations,
//! referential-integrity failures found by the validator, serialization
//! capability failures, and parse-side errors.

use thiserror::Error;

use crate::spec_version::{OutputFormat, SpecVersion};

/// Main error type for cdx-bom operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A dependency edge references a bom-ref that no declared entity carries.
    #[error("unknown dependency reference(s): {}", refs.join(", "))]
    UnknownComponentDependency {
        /// The dangling bom-ref values, sorted.
        refs: Vec<String>,
    },

    /// A license collection mixes an SPDX expression with other entries.
    #[error("license expression along with other licenses on {owner}")]
    LicenseExpressionAlongWithOthers { owner: String },

    /// Two mutually exclusive properties were both supplied.
    #[error("mutually exclusive properties: {0}")]
    MutuallyExclusiveProperties(String),

    /// The entity's type has no encoding at all in the requested schema version.
    #[error(
        "component type '{component_type}' of '{component}' is not representable in schema version {version}"
    )]
    SerializationOfUnsupportedComponentType {
        component: String,
        component_type: String,
        version: SpecVersion,
    },

    /// The requested (format, version) pair does not exist as an encoding.
    #[error("{format} output is not defined for schema version {version}")]
    UnsupportedFormatVersion {
        format: OutputFormat,
        version: SpecVersion,
    },

    /// Unrecognized algorithm prefix in a composite `alg:digest` string.
    #[error("unknown hash algorithm: {0}")]
    UnknownHashType(String),

    /// Composite hash string is structurally malformed.
    #[error("invalid composite hash value: {0}")]
    InvalidHashValue(String),

    /// String is not a recognizable SPDX license expression.
    #[error("invalid SPDX license expression: {0}")]
    InvalidLicenseExpression(String),

    /// Disjunctive license invariant violated (id/name exclusivity).
    #[error("invalid license: {0}")]
    InvalidLicense(String),

    /// JSON encoding or decoding failure.
    #[error("JSON error: {0}")]
    Json(String),

    /// XML encoding or decoding failure.
    #[error("XML error: {0}")]
    Xml(String),

    /// Document parsed but violates the expected structure.
    #[error("invalid document structure: {0}")]
    InvalidStructure(String),

    /// Declared schema version is unknown or does not match the requested one.
    #[error("unsupported schema version: {0}")]
    UnsupportedVersion(String),

    /// IO errors from the underlying writer/reader.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type for cdx-bom operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Dangling-reference error from a set of offending values.
    pub fn unknown_dependencies(refs: impl IntoIterator<Item = String>) -> Self {
        let mut refs: Vec<String> = refs.into_iter().collect();
        refs.sort();
        refs.dedup();
        Self::UnknownComponentDependency { refs }
    }

    /// License exclusivity error naming the offending entity.
    pub fn license_expression_along_with_others(owner: impl Into<String>) -> Self {
        Self::LicenseExpressionAlongWithOthers {
            owner: owner.into(),
        }
    }

    /// Mutually exclusive properties error.
    pub fn mutually_exclusive(message: impl Into<String>) -> Self {
        Self::MutuallyExclusiveProperties(message.into())
    }

    /// Structure error with context.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Self::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_dependencies_sorts_and_dedupes() {
        let err = Error::unknown_dependencies(vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
        ]);
        match err {
            Error::UnknownComponentDependency { refs } => {
                assert_eq!(refs, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected UnknownComponentDependency, got {other:?}"),
        }
    }

    #[test]
    fn error_display_names_offending_refs() {
        let err = Error::unknown_dependencies(vec!["missing-ref".to_string()]);
        assert!(err.to_string().contains("missing-ref"));
    }
}
