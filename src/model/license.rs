//! License model: disjunctive licenses vs. SPDX expressions.
//!
//! Uses the `spdx` crate for identifier canonicalization and lax expression
//! parsing, with a structural heuristic for compound expressions the grammar
//! cannot parse.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::order::{opt_str, CanonicalOrder, PresentFirst};

/// Return the canonical casing of a known SPDX identifier, or `None`.
///
/// Lax parsing accepts common spelling slips ("mit", "apache2") and maps them
/// onto the registered identifier.
#[must_use]
pub fn spdx_canonical_id(candidate: &str) -> Option<&'static str> {
    let expr = spdx::Expression::parse_mode(candidate, spdx::ParseMode::LAX).ok()?;
    let mut requirements = expr.requirements();
    let first = requirements.next()?;
    if requirements.next().is_some() {
        // Compound expression, not a single identifier.
        return None;
    }
    match first.req.license {
        spdx::LicenseItem::Spdx { id, .. } => Some(id.name),
        spdx::LicenseItem::Other { .. } => None,
    }
}

/// Best-effort structural recognition of a compound SPDX expression.
///
/// Not a grammar parse: balanced parentheses, a minimum length, and the
/// presence of an operator token are enough to treat a string as compound.
#[must_use]
pub fn is_compound_expression(candidate: &str) -> bool {
    const MIN_LEN: usize = 5;
    if candidate.len() < MIN_LEN {
        return false;
    }
    let mut depth: i32 = 0;
    for c in candidate.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return false;
    }
    let upper = candidate.to_uppercase();
    upper.contains(" OR ") || upper.contains(" AND ") || upper.contains(" WITH ")
}

/// A single license choice: a known id or a free-form name, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisjunctiveLicense {
    id: Option<String>,
    name: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
}

impl DisjunctiveLicense {
    /// Create from a candidate SPDX identifier, canonicalizing its casing.
    ///
    /// Fails when the identifier is not a registered SPDX id; use
    /// [`DisjunctiveLicense::named`] for non-SPDX licenses.
    pub fn from_id(candidate: &str) -> Result<Self> {
        let canonical = spdx_canonical_id(candidate)
            .ok_or_else(|| Error::InvalidLicense(format!("unknown SPDX id: {candidate}")))?;
        Ok(Self {
            id: Some(canonical.to_string()),
            name: None,
            text: None,
            url: None,
        })
    }

    /// Create from a free-form license name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            text: None,
            url: None,
        }
    }

    /// Create from optional id/name wire fields, enforcing exclusivity.
    ///
    /// Exactly one of `id` and `name` must be present. An unknown id is
    /// demoted to a name with a warning rather than rejected, since external
    /// documents routinely carry near-miss identifiers.
    pub fn new(id: Option<String>, name: Option<String>) -> Result<Self> {
        match (id, name) {
            (Some(_), Some(_)) => Err(Error::InvalidLicense(
                "license carries both id and name".to_string(),
            )),
            (None, None) => Err(Error::InvalidLicense(
                "license carries neither id nor name".to_string(),
            )),
            (Some(id), None) => match spdx_canonical_id(&id) {
                Some(canonical) => Ok(Self {
                    id: Some(canonical.to_string()),
                    name: None,
                    text: None,
                    url: None,
                }),
                None => {
                    tracing::warn!(id = %id, "unknown SPDX id, demoting to license name");
                    Ok(Self::named(id))
                }
            },
            (None, Some(name)) => Ok(Self::named(name)),
        }
    }

    /// The canonical SPDX id, if this license has one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The free-form name, if this license has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attach a URL, builder style.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl CanonicalOrder for DisjunctiveLicense {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (opt_str(&self.id), opt_str(&self.name)).cmp(&(opt_str(&other.id), opt_str(&other.name)))
    }
}

/// A compound SPDX license expression, e.g. `"MIT OR Apache-2.0"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseExpression {
    expression: String,
}

impl LicenseExpression {
    /// Validate and wrap an expression string.
    ///
    /// Accepts anything the `spdx` crate parses in lax mode, plus strings the
    /// structural heuristic recognizes as compound.
    pub fn try_new(expression: impl Into<String>) -> Result<Self> {
        let expression = expression.into();
        let parses =
            spdx::Expression::parse_mode(&expression, spdx::ParseMode::LAX).is_ok();
        if parses || is_compound_expression(&expression) {
            Ok(Self { expression })
        } else {
            Err(Error::InvalidLicenseExpression(expression))
        }
    }

    /// The raw expression string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for LicenseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Either a disjunctive license or a compound expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseChoice {
    License(DisjunctiveLicense),
    Expression(LicenseExpression),
}

impl LicenseChoice {
    /// Build a choice from an arbitrary string: canonical SPDX id first,
    /// compound expression second, free-form name last.
    #[must_use]
    pub fn from_str_lossy(candidate: &str) -> Self {
        if spdx_canonical_id(candidate).is_some() {
            if let Ok(license) = DisjunctiveLicense::from_id(candidate) {
                return Self::License(license);
            }
        }
        if let Ok(expr) = LicenseExpression::try_new(candidate) {
            if is_compound_expression(candidate) {
                return Self::Expression(expr);
            }
        }
        Self::License(DisjunctiveLicense::named(candidate))
    }

    fn order_key(&self) -> (u8, PresentFirst<&str>, PresentFirst<&str>) {
        match self {
            // Expressions lead so the emit-time collapse keeps a stable pick.
            Self::Expression(e) => (0, PresentFirst(Some(e.as_str())), PresentFirst(None)),
            Self::License(l) => (1, opt_str(&l.id), opt_str(&l.name)),
        }
    }
}

impl CanonicalOrder for LicenseChoice {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

/// An ordered license collection owned by one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Licenses(Vec<LicenseChoice>);

impl Licenses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, choice: LicenseChoice) {
        self.0.push(choice);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LicenseChoice> {
        self.0.iter()
    }

    /// Whether any entry is a compound expression.
    #[must_use]
    pub fn contains_expression(&self) -> bool {
        self.0
            .iter()
            .any(|c| matches!(c, LicenseChoice::Expression(_)))
    }

    /// The entries that survive serialization, sorted.
    ///
    /// The target schemas do not allow mixing an expression with other
    /// entries: when both are present, only the first expression (in canonical
    /// order) is kept and the rest are dropped with a warning.
    #[must_use]
    pub fn effective_choices(&self) -> Vec<&LicenseChoice> {
        let mut choices: Vec<&LicenseChoice> = self.0.iter().collect();
        choices.sort_by(|a, b| a.canonical_cmp(b));
        if self.len() > 1 && self.contains_expression() {
            let expression = choices
                .iter()
                .find(|c| matches!(c, LicenseChoice::Expression(_)))
                .copied();
            if let Some(expression) = expression {
                tracing::warn!(
                    dropped = self.len() - 1,
                    "license expression along with other licenses, keeping only the expression"
                );
                return vec![expression];
            }
        }
        choices
    }
}

impl FromIterator<LicenseChoice> for Licenses {
    fn from_iter<I: IntoIterator<Item = LicenseChoice>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Licenses {
    type Item = &'a LicenseChoice;
    type IntoIter = std::slice::Iter<'a, LicenseChoice>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
