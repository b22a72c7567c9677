//! Integration tests for ancestor-preserving pruning.

mod common;

use std::collections::HashSet;

use common::{node_ids, random_tree, seeded, Node};
use tailor::domain::{
    prune, prune_owned, Annotated, Edge, FacetIndex, FacetSet, Filter, HasFacets, LabeledTree,
};

/// Accepts nodes whose id falls in one residue class.
fn residue_filter(modulus: usize, residue: usize) -> Filter<Node> {
    Filter::leaf(format!("id % {modulus} == {residue}"), move |n: &Node| {
        n.id % modulus == residue
    })
}

fn id_paths(tree: &LabeledTree<Node>) -> HashSet<Vec<usize>> {
    tree.paths()
        .into_iter()
        .map(|path| path.into_iter().map(|n| n.id).collect())
        .collect()
}

/// Ids of nodes with an accepted node somewhere in their subtree, plus the root.
fn expected_retained(tree: &LabeledTree<Node>, filter: &Filter<Node>) -> HashSet<usize> {
    let mut retained: HashSet<usize> = tree
        .subtrees()
        .filter(|sub| sub.iter().any(|n| filter.accept(n)))
        .map(|sub| sub.label().id)
        .collect();
    retained.insert(tree.label().id);
    retained
}

// ============================================================
// Properties over random trees
// ============================================================

#[test]
fn given_random_trees_when_pruning_then_exactly_nodes_on_paths_to_accepted_nodes_remain() {
    for seed in 0..64 {
        // Arrange
        let mut rng = seeded(seed);
        let tree = random_tree(&mut rng, 5);
        let filter = residue_filter(2 + (seed as usize % 5), seed as usize % 3);

        // Act
        let pruned = prune(&tree, &filter);

        // Assert
        let retained: HashSet<usize> = node_ids(&pruned, |n: &Node| n.id).into_iter().collect();
        assert_eq!(retained, expected_retained(&tree, &filter), "seed {seed}");
    }
}

#[test]
fn given_random_trees_when_pruning_then_every_retained_node_keeps_its_ancestors() {
    for seed in 0..64 {
        let mut rng = seeded(seed);
        let tree = random_tree(&mut rng, 5);
        let filter = residue_filter(3, seed as usize % 3);

        let pruned = prune(&tree, &filter);

        // Every root-to-node path of the result exists in the input, so each retained
        // node sits below exactly its original ancestors.
        let original = id_paths(&tree);
        for path in id_paths(&pruned) {
            assert!(original.contains(&path), "seed {seed}, path {path:?}");
        }
    }
}

#[test]
fn given_random_trees_when_pruning_twice_then_result_is_unchanged() {
    for seed in 0..64 {
        let mut rng = seeded(seed);
        let tree = random_tree(&mut rng, 5);
        let filter = residue_filter(4, seed as usize % 4);

        let once = prune(&tree, &filter);
        let twice = prune(&once, &filter);

        assert_eq!(once, twice, "seed {seed}");
    }
}

#[test]
fn given_random_trees_when_pruning_owned_then_same_as_borrowed() {
    for seed in 0..32 {
        let mut rng = seeded(seed);
        let tree = random_tree(&mut rng, 5);
        let filter = residue_filter(3, 1);

        assert_eq!(prune(&tree, &filter), prune_owned(tree, &filter), "seed {seed}");
    }
}

// ============================================================
// Root and order
// ============================================================

#[test]
fn given_filter_rejecting_everything_when_pruning_then_only_root_remains() {
    let mut rng = seeded(3);
    let tree = random_tree(&mut rng, 4);
    let nothing: Filter<Node> = Filter::or("nothing", []);

    let pruned = prune(&tree, &nothing);

    assert!(pruned.is_leaf());
    assert_eq!(pruned.label().id, tree.label().id);
}

#[test]
fn given_accepted_children_when_pruning_then_original_edge_order_is_kept() {
    let tree: LabeledTree<u32, char> = LabeledTree::node(
        0,
        [
            Edge::new('a', LabeledTree::leaf(1)),
            Edge::new('b', LabeledTree::leaf(2)),
            Edge::new('c', LabeledTree::leaf(3)),
            Edge::new('d', LabeledTree::leaf(4)),
        ],
    );
    let odd = Filter::leaf("odd", |n: &u32| n % 2 == 1);

    let pruned = prune(&tree, &odd);

    let kept: Vec<_> = pruned.edges().map(|(e, c)| (*e, *c.label())).collect();
    assert_eq!(kept, vec![('a', 1), ('c', 3)]);
}

// ============================================================
// End-to-end: aggregate, filter, prune
// ============================================================

#[derive(Debug, Clone, PartialEq)]
struct Labeled {
    name: &'static str,
    facets: FacetSet,
}

fn labeled(name: &'static str, pairs: &[(&str, &str)]) -> Labeled {
    Labeled {
        name,
        facets: pairs.iter().copied().collect(),
    }
}

#[test]
fn given_mixed_children_when_selecting_type_package_then_only_root_and_package_remain() {
    // Arrange: R ─┬─ A {Type: Package}
    //             └─ B {Type: Element, Color: Red}
    let tree = LabeledTree::node(
        labeled("R", &[]),
        [
            Edge::unlabeled(LabeledTree::leaf(labeled("A", &[("Type", "Package")]))),
            Edge::unlabeled(LabeledTree::leaf(labeled(
                "B",
                &[("Type", "Element"), ("Color", "Red")],
            ))),
        ],
    );

    // Act
    let annotated = FacetIndex::new(|l: &Labeled| l.facets.clone()).annotate(tree);
    let root_facets = annotated.label().facets.clone();
    let filter: Filter<Annotated<Labeled>> = Filter::and(
        "",
        [Filter::or(
            "Type",
            [Filter::leaf("Package", |node: &Annotated<Labeled>| {
                node.facets().contains("Type", "Package")
            })],
        )],
    );
    let pruned = prune(&annotated, &filter);

    // Assert
    let expected: FacetSet = [("Type", "Package"), ("Type", "Element"), ("Color", "Red")]
        .into_iter()
        .collect();
    assert_eq!(root_facets, expected);
    let names: Vec<_> = pruned.iter().map(|n| n.entity.name).collect();
    assert_eq!(names, vec!["R", "A"]);
}
