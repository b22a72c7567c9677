//! Facet index: bottom-up aggregation of facet values over a labeled tree.
//!
//! A node's effective facet set is its own intrinsic facets united with the effective
//! facets of all children. Filtering an ancestor by a value that only a deep descendant
//! carries therefore matches the ancestor as well.

use std::fmt;

use rayon::prelude::*;
use tracing::{instrument, trace};

use crate::domain::facets::{FacetSet, HasFacets};
use crate::domain::tree::{Edge, LabeledTree};

/// Node label paired with its effective (aggregated) facet set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated<N> {
    pub entity: N,
    pub facets: FacetSet,
}

impl<N> Annotated<N> {
    pub fn entity(&self) -> &N {
        &self.entity
    }

    pub fn into_entity(self) -> N {
        self.entity
    }
}

impl<N> HasFacets for Annotated<N> {
    fn facets(&self) -> &FacetSet {
        &self.facets
    }
}

impl<N: fmt::Display> fmt::Display for Annotated<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entity)
    }
}

pub type AnnotatedTree<N, E> = LabeledTree<Annotated<N>, E>;

/// Builds facet-annotated trees from an intrinsic facet extraction function.
pub struct FacetIndex<F> {
    extract: F,
}

impl<F> FacetIndex<F> {
    pub fn new(extract: F) -> Self {
        Self { extract }
    }

    /// Annotate every node with its effective facet set in one post-order pass.
    #[instrument(level = "debug", skip_all)]
    pub fn annotate<N, E>(&self, tree: LabeledTree<N, E>) -> AnnotatedTree<N, E>
    where
        F: Fn(&N) -> FacetSet,
    {
        let (label, edges) = tree.into_parts();
        let mut facets = (self.extract)(&label);

        let edges: Vec<_> = edges
            .into_iter()
            .map(|edge| {
                let (edge_label, child) = edge.into_parts();
                let child = self.annotate(child);
                facets.union_with(&child.label().facets);
                Edge::new(edge_label, child)
            })
            .collect();

        trace!(facet_values = facets.value_count(), "annotated node");
        LabeledTree::node(Annotated { entity: label, facets }, edges)
    }

    /// Same result as [`annotate`](Self::annotate), with sibling subtrees processed in
    /// parallel. The union order does not affect the resulting sets.
    #[instrument(level = "debug", skip_all)]
    pub fn annotate_par<N, E>(&self, tree: LabeledTree<N, E>) -> AnnotatedTree<N, E>
    where
        F: Fn(&N) -> FacetSet + Sync,
        N: Send,
        E: Send,
    {
        let (label, edges) = tree.into_parts();
        let mut facets = (self.extract)(&label);

        let edges: Vec<_> = edges
            .into_par_iter()
            .map(|edge| {
                let (edge_label, child) = edge.into_parts();
                Edge::new(edge_label, self.annotate_par(child))
            })
            .collect();

        for edge in &edges {
            facets.union_with(&edge.target().label().facets);
        }

        LabeledTree::node(Annotated { entity: label, facets }, edges)
    }
}

/// Strip the facet annotation, returning a tree of the original labels.
pub fn strip<N, E>(tree: AnnotatedTree<N, E>) -> LabeledTree<N, E> {
    tree.into_mapped(&Annotated::<N>::into_entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intrinsic(label: &&str) -> FacetSet {
        match *label {
            "a" => [("Type", "Package")].into_iter().collect(),
            "b" => [("Type", "Element"), ("Color", "Red")].into_iter().collect(),
            _ => FacetSet::new(),
        }
    }

    fn sample() -> LabeledTree<&'static str> {
        LabeledTree::node(
            "r",
            [
                Edge::unlabeled(LabeledTree::leaf("a")),
                Edge::unlabeled(LabeledTree::leaf("b")),
                Edge::unlabeled(LabeledTree::leaf("empty")),
            ],
        )
    }

    #[test]
    fn test_root_aggregates_descendant_facets() {
        let annotated = FacetIndex::new(intrinsic).annotate(sample());
        let root = annotated.label();

        assert_eq!(root.entity, "r");
        assert!(root.facets.contains("Type", "Package"));
        assert!(root.facets.contains("Type", "Element"));
        assert!(root.facets.contains("Color", "Red"));
    }

    #[test]
    fn test_leaf_without_facets_has_empty_set() {
        let annotated = FacetIndex::new(intrinsic).annotate(sample());
        let (_, empty) = annotated.edges().nth(2).unwrap();
        assert!(empty.label().facets.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let index = FacetIndex::new(intrinsic);
        assert_eq!(index.annotate(sample()), index.annotate_par(sample()));
    }

    #[test]
    fn test_strip_restores_labels() {
        let annotated = FacetIndex::new(intrinsic).annotate(sample());
        assert_eq!(strip(annotated), sample());
    }
}
