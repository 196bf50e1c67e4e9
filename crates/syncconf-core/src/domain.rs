//! Domain identities
//!
//! A domain is one independently synchronizable category of data. Its
//! identity is a plain string tag, ordered lexically, so it can key ordered
//! maps and sets and round-trip through configuration files unchanged.

use std::borrow::{Borrow, Cow};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered set of domain identities, as handed to `configure`.
pub type DomainSet = BTreeSet<DomainId>;

/// Stable identity of a synchronizable domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(Cow<'static, str>);

impl DomainId {
    pub const BOOKMARKS: DomainId = DomainId::from_static("bookmarks");
    pub const PREFERENCES: DomainId = DomainId::from_static("preferences");
    pub const AUTOFILL: DomainId = DomainId::from_static("autofill");
    pub const TYPED_URLS: DomainId = DomainId::from_static("typed_urls");

    /// Create an identity from a static string without allocating.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create an identity from any owned or borrowed string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for DomainId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DomainId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for DomainId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Collect anything string-like into a [`DomainSet`].
///
/// ```
/// use syncconf_core::{domain_set, DomainId};
///
/// let set = domain_set(["bookmarks", "autofill"]);
/// assert!(set.contains(&DomainId::AUTOFILL));
/// ```
pub fn domain_set<I, T>(domains: I) -> DomainSet
where
    I: IntoIterator<Item = T>,
    T: Into<DomainId>,
{
    domains.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_owned_identities_compare_equal() {
        assert_eq!(DomainId::new("bookmarks"), DomainId::BOOKMARKS);
        assert_eq!("typed_urls".parse::<DomainId>().unwrap(), DomainId::TYPED_URLS);
    }

    #[test]
    fn identities_order_lexically() {
        let set = domain_set(["preferences", "autofill", "bookmarks"]);
        let names: Vec<&str> = set.iter().map(DomainId::as_str).collect();
        assert_eq!(names, vec!["autofill", "bookmarks", "preferences"]);
    }

    #[test]
    fn set_lookup_by_str() {
        let set = domain_set(["autofill"]);
        assert!(set.contains("autofill"));
    }
}
