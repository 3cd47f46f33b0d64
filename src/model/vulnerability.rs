//! Vulnerability entities (schema 1.4+).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::BomRef;
use crate::order::{opt_str, CanonicalOrder};

/// Qualitative severity buckets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    None,
    Unknown,
}

impl Severity {
    /// The wire spelling, e.g. `"critical"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
            Self::None => "none",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the wire spelling; anything unrecognized maps to `Unknown`.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            "info" => Self::Info,
            "none" => Self::None,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a vulnerability record came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilitySource {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl VulnerabilitySource {
    /// Create a source with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: None,
        }
    }
}

/// A single score for a vulnerability, e.g. one CVSS vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRating {
    pub score: Option<f32>,
    pub severity: Option<Severity>,
    /// Scoring method identifier, e.g. `"CVSSv31"`.
    pub method: Option<String>,
    pub vector: Option<String>,
}

/// A known vulnerability and the bom-refs it affects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub bom_ref: BomRef,
    /// External identifier, e.g. `"CVE-2024-12345"`.
    pub id: String,
    pub source: Option<VulnerabilitySource>,
    pub description: Option<String>,
    pub recommendation: Option<String>,
    pub ratings: Vec<VulnerabilityRating>,
    pub cwes: Vec<u32>,
    /// Refs of affected components/services; edges are not rewritten when the
    /// targets are renamed.
    pub affects: Vec<BomRef>,
}

impl Vulnerability {
    /// Create a vulnerability with a generated bom-ref.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            bom_ref: BomRef::default(),
            id: id.into(),
            source: None,
            description: None,
            recommendation: None,
            ratings: Vec::new(),
            cwes: Vec::new(),
            affects: Vec::new(),
        }
    }

    /// Mark a bom-ref as affected, builder style.
    #[must_use]
    pub fn affecting(mut self, bom_ref: impl Into<BomRef>) -> Self {
        self.affects.push(bom_ref.into());
        self
    }

    /// The highest qualitative severity across all ratings.
    #[must_use]
    pub fn top_severity(&self) -> Option<Severity> {
        // Severity derives Ord with Critical first.
        self.ratings.iter().filter_map(|r| r.severity).min()
    }
}

impl CanonicalOrder for Vulnerability {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.id.as_str(), self.bom_ref.value()).cmp(&(other.id.as_str(), other.bom_ref.value()))
    }
}

impl CanonicalOrder for VulnerabilityRating {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (opt_str(&self.method), opt_str(&self.vector)).cmp(&(
            opt_str(&other.method),
            opt_str(&other.vector),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_severity_picks_the_worst_rating() {
        let mut vuln = Vulnerability::new("CVE-2024-12345");
        vuln.ratings.push(VulnerabilityRating {
            severity: Some(Severity::Low),
            ..VulnerabilityRating::default()
        });
        vuln.ratings.push(VulnerabilityRating {
            severity: Some(Severity::High),
            ..VulnerabilityRating::default()
        });
        assert_eq!(vuln.top_severity(), Some(Severity::High));
    }

    #[test]
    fn unknown_severity_spelling_maps_to_unknown() {
        assert_eq!(Severity::from_wire("catastrophic"), Severity::Unknown);
        assert_eq!(Severity::from_wire("critical"), Severity::Critical);
    }

    #[test]
    fn vulnerabilities_sort_by_external_id() {
        use crate::order::sort_canonical;
        let mut vulns = vec![
            Vulnerability::new("CVE-2024-2"),
            Vulnerability::new("CVE-2024-1"),
        ];
        sort_canonical(&mut vulns);
        assert_eq!(vulns[0].id, "CVE-2024-1");
    }
}
