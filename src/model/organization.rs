//! Organizational entities and contacts.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::order::{opt_str, CanonicalOrder};

/// A person reachable at an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationalContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl OrganizationalContact {
    /// Create a contact with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl CanonicalOrder for OrganizationalContact {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (opt_str(&self.name), opt_str(&self.email), opt_str(&self.phone)).cmp(&(
            opt_str(&other.name),
            opt_str(&other.email),
            opt_str(&other.phone),
        ))
    }
}

/// An organization: manufacturer, supplier, or service provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationalEntity {
    pub name: Option<String>,
    pub urls: Vec<String>,
    pub contacts: Vec<OrganizationalContact>,
}

impl OrganizationalEntity {
    /// Create an organization with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a URL, builder style.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }
}

impl CanonicalOrder for OrganizationalEntity {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        (opt_str(&self.name), &self.urls).cmp(&(opt_str(&other.name), &other.urls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::sort_canonical;

    #[test]
    fn named_entities_sort_before_anonymous() {
        let mut orgs = vec![
            OrganizationalEntity::default(),
            OrganizationalEntity::named("Acme"),
        ];
        sort_canonical(&mut orgs);
        assert_eq!(orgs[0].name.as_deref(), Some("Acme"));
        assert_eq!(orgs[1].name, None);
    }
}
