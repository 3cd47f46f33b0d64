//! External reference value objects.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Hash;
use crate::order::{opt_str, CanonicalOrder};

/// Reference kind vocabulary.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ExternalReferenceType {
    Vcs,
    IssueTracker,
    Website,
    Advisories,
    Bom,
    MailingList,
    Social,
    Chat,
    Documentation,
    Support,
    Distribution,
    License,
    BuildMeta,
    BuildSystem,
    ReleaseNotes,
    SecurityContact,
    Other,
}

impl ExternalReferenceType {
    /// The wire spelling, e.g. `"issue-tracker"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vcs => "vcs",
            Self::IssueTracker => "issue-tracker",
            Self::Website => "website",
            Self::Advisories => "advisories",
            Self::Bom => "bom",
            Self::MailingList => "mailing-list",
            Self::Social => "social",
            Self::Chat => "chat",
            Self::Documentation => "documentation",
            Self::Support => "support",
            Self::Distribution => "distribution",
            Self::License => "license",
            Self::BuildMeta => "build-meta",
            Self::BuildSystem => "build-system",
            Self::ReleaseNotes => "release-notes",
            Self::SecurityContact => "security-contact",
            Self::Other => "other",
        }
    }

    /// Parse the wire spelling; anything unrecognized maps to `Other`.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s {
            "vcs" => Self::Vcs,
            "issue-tracker" => Self::IssueTracker,
            "website" => Self::Website,
            "advisories" => Self::Advisories,
            "bom" => Self::Bom,
            "mailing-list" => Self::MailingList,
            "social" => Self::Social,
            "chat" => Self::Chat,
            "documentation" => Self::Documentation,
            "support" => Self::Support,
            "distribution" => Self::Distribution,
            "license" => Self::License,
            "build-meta" => Self::BuildMeta,
            "build-system" => Self::BuildSystem,
            "release-notes" => Self::ReleaseNotes,
            "security-contact" => Self::SecurityContact,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ExternalReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed link from an entity to an external resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub ref_type: ExternalReferenceType,
    pub url: String,
    pub comment: Option<String>,
    pub hashes: Vec<Hash>,
}

impl ExternalReference {
    /// Create a reference with no comment or hashes.
    pub fn new(ref_type: ExternalReferenceType, url: impl Into<String>) -> Self {
        Self {
            ref_type,
            url: url.into(),
            comment: None,
            hashes: Vec::new(),
        }
    }
}

impl CanonicalOrder for ExternalReference {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.url.as_str(), self.ref_type.as_str(), opt_str(&self.comment)).cmp(&(
            other.url.as_str(),
            other.ref_type.as_str(),
            opt_str(&other.comment),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::sort_canonical;

    #[test]
    fn wire_spelling_round_trips() {
        for ty in [
            ExternalReferenceType::Vcs,
            ExternalReferenceType::IssueTracker,
            ExternalReferenceType::SecurityContact,
            ExternalReferenceType::BuildMeta,
        ] {
            assert_eq!(ExternalReferenceType::from_wire(ty.as_str()), ty);
        }
    }

    #[test]
    fn unknown_kind_maps_to_other() {
        assert_eq!(
            ExternalReferenceType::from_wire("quantum-link"),
            ExternalReferenceType::Other
        );
    }

    #[test]
    fn sorts_by_url_then_kind() {
        let mut refs = vec![
            ExternalReference::new(ExternalReferenceType::Website, "https://b.example"),
            ExternalReference::new(ExternalReferenceType::Vcs, "https://a.example"),
        ];
        sort_canonical(&mut refs);
        assert_eq!(refs[0].url, "https://a.example");
    }
}
