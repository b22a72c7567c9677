//! Integration tests for LabeledTree construction, traversal and transformation.

use tailor::domain::{Edge, LabeledTree, TreeDisplay};

fn sample() -> LabeledTree<&'static str, char> {
    // root ─┬─a─ A ─x─ A1
    //       └─b─ B
    LabeledTree::node(
        "root",
        [
            Edge::new(
                'a',
                LabeledTree::node("A", [Edge::new('x', LabeledTree::leaf("A1"))]),
            ),
            Edge::new('b', LabeledTree::leaf("B")),
        ],
    )
}

#[test]
fn given_tree_when_iterating_edges_twice_then_same_sequence_in_original_order() {
    let tree = sample();

    let edges = tree.edges();
    let first: Vec<_> = edges.clone().map(|(e, c)| (*e, *c.label())).collect();
    let second: Vec<_> = edges.map(|(e, c)| (*e, *c.label())).collect();

    assert_eq!(first, vec![('a', "A"), ('b', "B")]);
    assert_eq!(first, second);
}

#[test]
fn given_tree_when_traversing_then_preorder_and_postorder_visit_all_nodes() {
    let tree = sample();

    let pre: Vec<_> = tree.iter().copied().collect();
    let post: Vec<_> = tree.iter_postorder().copied().collect();

    assert_eq!(pre, vec!["root", "A", "A1", "B"]);
    assert_eq!(post, vec!["A1", "A", "B", "root"]);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn given_tree_when_listing_paths_then_each_node_has_its_ancestors() {
    let tree = sample();

    let paths: Vec<Vec<&str>> = tree
        .paths()
        .into_iter()
        .map(|p| p.into_iter().copied().collect())
        .collect();

    assert_eq!(
        paths,
        vec![
            vec!["root"],
            vec!["root", "A"],
            vec!["root", "A", "A1"],
            vec!["root", "B"],
        ]
    );
    assert_eq!(tree.leaf_labels(), vec![&"A1", &"B"]);
}

#[test]
fn given_tree_when_mapping_labels_then_new_tree_keeps_shape_and_edge_labels() {
    let tree = sample();

    let mapped = tree.map_labels(|label| label.len());

    assert_eq!(mapped.iter().copied().collect::<Vec<_>>(), vec![4, 1, 2, 1]);
    assert_eq!(mapped.edges().map(|(e, _)| *e).collect::<Vec<_>>(), vec!['a', 'b']);
    // input untouched
    assert_eq!(*tree.label(), "root");
}

#[test]
fn given_leaf_when_inspecting_then_no_edges() {
    let leaf: LabeledTree<u8> = LabeledTree::leaf(7);

    assert!(leaf.is_leaf());
    assert_eq!(leaf.edges().count(), 0);
    assert_eq!(leaf.len(), 1);
}

#[test]
fn given_tree_when_rendering_then_text_tree_lists_labels() {
    let rendered = sample().to_tree_string().to_string();

    assert!(rendered.starts_with("root"));
    assert!(rendered.contains("A1"));
    assert!(rendered.contains("B"));
}
