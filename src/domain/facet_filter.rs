//! Default facet filter: `And` over facets, `Or` over each facet's observed values.
//!
//! Values are compared by their underlying string. The display string (`""` shown as
//! `<empty>`) is only used for leaf names and ordering.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::facets::{FacetSet, HasFacets};
use crate::domain::filter::Filter;

pub type Extractor<N> = Arc<dyn Fn(&N) -> Vec<String> + Send + Sync>;

/// A named facet and the function yielding a node's own values for it.
///
/// An extractor returning no values means the facet is absent for that node. Returning
/// `[""]` means the facet is present with an empty value.
pub struct FacetDefinition<N> {
    name: String,
    extract: Extractor<N>,
}

impl<N> FacetDefinition<N> {
    pub fn new<F>(name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&N) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            extract: Arc::new(extract),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self, node: &N) -> Vec<String> {
        (self.extract)(node)
    }
}

impl<N> Clone for FacetDefinition<N> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            extract: Arc::clone(&self.extract),
        }
    }
}

impl<N> fmt::Debug for FacetDefinition<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacetDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Intrinsic facet set of `node` under `definitions`.
pub fn intrinsic<N>(definitions: &[FacetDefinition<N>], node: &N) -> FacetSet {
    let mut set = FacetSet::new();
    for def in definitions {
        set.extend_values(def.name(), def.values(node));
    }
    set
}

/// Presentation strings for the two special categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLabels {
    /// Shown for a present but empty value
    pub empty: String,
    /// Shown for an absent facet
    pub none: String,
}

impl Default for DisplayLabels {
    fn default() -> Self {
        Self {
            empty: "<empty>".to_string(),
            none: "<none>".to_string(),
        }
    }
}

impl DisplayLabels {
    pub fn display<'a>(&'a self, value: &'a str) -> &'a str {
        if value.is_empty() {
            &self.empty
        } else {
            value
        }
    }
}

/// Distinct values of one facet across a node set.
struct Observed {
    facet: String,
    values: BTreeSet<String>,
    /// Some node lacked the facet entirely
    absent: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FacetFilterBuilder {
    labels: DisplayLabels,
}

impl FacetFilterBuilder {
    pub fn new(labels: DisplayLabels) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &DisplayLabels {
        &self.labels
    }

    /// Build the default filter from facet definitions evaluated on each node's own
    /// values.
    #[instrument(level = "debug", skip_all)]
    pub fn build<'n, N: 'static>(
        &self,
        definitions: &[FacetDefinition<N>],
        nodes: impl IntoIterator<Item = &'n N> + Clone,
    ) -> Filter<N> {
        let per_facet = definitions.iter().map(|def| {
            let mut observed = Observed {
                facet: def.name().to_string(),
                values: BTreeSet::new(),
                absent: false,
            };
            for node in nodes.clone() {
                let values = def.values(node);
                observed.absent |= values.is_empty();
                observed.values.extend(values);
            }

            let mut children: Vec<_> = self
                .value_leaves(&observed, |value| {
                    let def = def.clone();
                    move |node: &N| def.values(node).contains(&value)
                })
                .collect();
            if observed.absent {
                let def = def.clone();
                children.push(Filter::leaf(self.labels.none.clone(), move |node: &N| {
                    def.values(node).is_empty()
                }));
            }
            Filter::or(observed.facet, children)
        });
        let filter = Filter::and("", per_facet.collect::<Vec<_>>());
        debug!(facets = filter.children().len(), "built default filter");
        filter
    }

    /// Build the default filter over labels that already carry a facet set, e.g.
    /// facet-annotated tree nodes.
    #[instrument(level = "debug", skip_all)]
    pub fn for_facets<'n, L, S>(
        &self,
        facet_names: impl IntoIterator<Item = S>,
        nodes: impl IntoIterator<Item = &'n L> + Clone,
    ) -> Filter<L>
    where
        L: HasFacets + 'static,
        S: Into<String>,
    {
        let observed = facet_names.into_iter().map(|name| {
            let facet = name.into();
            let mut values = BTreeSet::new();
            let mut absent = false;
            for node in nodes.clone() {
                match node.facets().values(&facet) {
                    Some(found) => values.extend(found.iter().cloned()),
                    None => absent = true,
                }
            }
            Observed {
                facet,
                values,
                absent,
            }
        });
        let filter = Filter::and("", observed.map(|o| self.facet_or(o)).collect::<Vec<_>>());
        debug!(facets = filter.children().len(), "built default filter");
        filter
    }

    /// Build the default filter from an already aggregated facet set.
    ///
    /// A single set cannot tell which nodes lack a facet, so no `<none>` leaves are
    /// added.
    pub fn from_facet_set<L: HasFacets + 'static>(&self, set: &FacetSet) -> Filter<L> {
        let per_facet = set.iter().map(|(facet, values)| {
            self.facet_or(Observed {
                facet: facet.to_string(),
                values: values.clone(),
                absent: false,
            })
        });
        Filter::and("", per_facet.collect::<Vec<_>>())
    }

    fn facet_or<L: HasFacets + 'static>(&self, observed: Observed) -> Filter<L> {
        let leaves = self.value_leaves(&observed, |value| {
            let facet = observed.facet.clone();
            move |label: &L| label.facets().contains(&facet, &value)
        });
        let none = observed.absent.then(|| {
            let facet = observed.facet.clone();
            Filter::leaf(self.labels.none.clone(), move |label: &L| {
                !label.facets().has_facet(&facet)
            })
        });
        let children: Vec<_> = leaves.chain(none).collect();
        Filter::or(observed.facet, children)
    }

    /// One leaf per distinct value, ordered by display string.
    fn value_leaves<'a, T, M, P>(
        &'a self,
        observed: &'a Observed,
        matcher: M,
    ) -> impl Iterator<Item = Filter<T>> + 'a
    where
        T: 'a,
        M: Fn(String) -> P + 'a,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        observed
            .values
            .iter()
            .sorted_by(|a, b| self.labels.display(a).cmp(self.labels.display(b)))
            .map(move |value| Filter::leaf(self.labels.display(value), matcher(value.clone())))
    }
}
