//! Static start order over domains
//!
//! Work lists are sorted ascending by rank before anything is started or
//! stopped. Stops use the same ascending order as starts.

use std::collections::HashMap;

use crate::domain::DomainId;
use crate::error::{Error, Result};

/// Built-in start order.
pub const DEFAULT_START_ORDER: [DomainId; 4] = [
    DomainId::BOOKMARKS,
    DomainId::PREFERENCES,
    DomainId::AUTOFILL,
    DomainId::TYPED_URLS,
];

/// Mapping from domain to integer rank; lower ranks go first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    ranks: HashMap<DomainId, usize>,
}

impl PriorityTable {
    /// Rank given to domains missing from the table. It is not distinct:
    /// unranked domains tie with the first ranked one.
    pub const UNRANKED: usize = 0;

    /// Build a table where each domain's rank is its position in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePriority`] if a domain appears twice.
    pub fn from_order<I>(order: I) -> Result<Self>
    where
        I: IntoIterator<Item = DomainId>,
    {
        let mut ranks = HashMap::new();
        for (rank, domain) in order.into_iter().enumerate() {
            if ranks.contains_key(&domain) {
                return Err(Error::DuplicatePriority { domain });
            }
            ranks.insert(domain, rank);
        }
        Ok(Self { ranks })
    }

    pub fn rank(&self, domain: &DomainId) -> usize {
        self.ranks.get(domain).copied().unwrap_or(Self::UNRANKED)
    }

    pub fn contains(&self, domain: &DomainId) -> bool {
        self.ranks.contains_key(domain)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Sort ascending by rank; equal ranks fall back to identity order.
    pub fn sort_by_rank<T, F>(&self, items: &mut [T], domain_of: F)
    where
        F: Fn(&T) -> &DomainId,
    {
        items.sort_by(|a, b| {
            let (a, b) = (domain_of(a), domain_of(b));
            (self.rank(a), a).cmp(&(self.rank(b), b))
        });
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        let ranks = DEFAULT_START_ORDER
            .into_iter()
            .enumerate()
            .map(|(rank, domain)| (domain, rank))
            .collect();
        Self { ranks }
    }
}
