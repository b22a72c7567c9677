//! Facet sets: facet name → distinct values observed at a node.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Mapping from facet name to the set of values observed for a node.
///
/// Backed by ordered collections so iteration (and therefore display and export)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FacetSet {
    facets: BTreeMap<String, BTreeSet<String>>,
}

impl FacetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, facet: impl Into<String>, value: impl Into<String>) {
        self.facets
            .entry(facet.into())
            .or_default()
            .insert(value.into());
    }

    /// Add all `values` under `facet`. An empty iterator leaves the facet absent.
    pub fn extend_values<I, S>(&mut self, facet: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return;
        }
        self.facets
            .entry(facet.to_string())
            .or_default()
            .extend(values.map(Into::into));
    }

    /// Merge `other` into `self` (set union per facet).
    pub fn union_with(&mut self, other: &FacetSet) {
        for (facet, values) in &other.facets {
            self.facets
                .entry(facet.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    pub fn contains(&self, facet: &str, value: &str) -> bool {
        self.facets
            .get(facet)
            .is_some_and(|values| values.contains(value))
    }

    pub fn has_facet(&self, facet: &str) -> bool {
        self.facets.contains_key(facet)
    }

    pub fn values(&self, facet: &str) -> Option<&BTreeSet<String>> {
        self.facets.get(facet)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.facets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> + '_ {
        self.facets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Total number of (facet, value) pairs.
    pub fn value_count(&self) -> usize {
        self.facets.values().map(BTreeSet::len).sum()
    }
}

impl<K, V> FromIterator<(K, V)> for FacetSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = FacetSet::new();
        for (facet, value) in iter {
            set.insert(facet, value);
        }
        set
    }
}

/// Read access to the facet set of a node label.
pub trait HasFacets {
    fn facets(&self) -> &FacetSet;
}

impl HasFacets for FacetSet {
    fn facets(&self) -> &FacetSet {
        self
    }
}
