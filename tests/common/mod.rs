//! Shared helpers for integration tests: seeded pseudo-random trees.
#![allow(dead_code)]

use std::path::PathBuf;

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use tailor::domain::{Edge, FacetSet, HasFacets, LabeledTree};

pub const FACETS: [&str; 3] = ["Type", "Color", "Stage"];
pub const VALUES: [&str; 4] = ["a", "b", "c", ""];

/// Reproducible generator for a property-test case.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Uniform draw from `0..n`.
pub fn below(rng: &mut StdRng, n: usize) -> usize {
    Uniform::new(0, n).expect("non-empty range").sample(rng)
}

/// Node label carrying its own intrinsic facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: usize,
    pub facets: FacetSet,
}

impl HasFacets for Node {
    fn facets(&self) -> &FacetSet {
        &self.facets
    }
}

pub fn random_facets(rng: &mut StdRng) -> FacetSet {
    let mut set = FacetSet::new();
    for facet in FACETS {
        // roughly half of the nodes lack a facet
        if below(rng, 2) == 0 {
            continue;
        }
        for _ in 0..=below(rng, 2) {
            set.insert(facet, VALUES[below(rng, VALUES.len())]);
        }
    }
    set
}

/// Random tree with up to `max_depth` levels and up to four children per node.
pub fn random_tree(rng: &mut StdRng, max_depth: usize) -> LabeledTree<Node> {
    let mut next_id = 0;
    build(rng, max_depth, &mut next_id)
}

fn build(rng: &mut StdRng, depth: usize, next_id: &mut usize) -> LabeledTree<Node> {
    let node = Node {
        id: *next_id,
        facets: random_facets(rng),
    };
    *next_id += 1;
    let fanout = if depth <= 1 { 0 } else { below(rng, 5) };
    let edges: Vec<_> = (0..fanout)
        .map(|_| Edge::unlabeled(build(rng, depth - 1, next_id)))
        .collect();
    LabeledTree::node(node, edges)
}

pub fn node_ids<N, E>(tree: &LabeledTree<N, E>, id: impl Fn(&N) -> usize) -> Vec<usize> {
    tree.iter().map(id).collect()
}

pub fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/models")
        .join(name)
}
