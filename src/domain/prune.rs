//! Ancestor-preserving pruning of labeled trees.

use tracing::{debug, instrument};

use crate::domain::filter::Filter;
use crate::domain::tree::{Edge, LabeledTree};

/// Apply `filter` to `tree`, keeping exactly the nodes on a path to an accepted node.
///
/// The root is always kept. A child edge survives if the child's own label is accepted
/// or if its pruned subtree still has edges. Retained edges keep their original order.
/// Pruning twice with the same filter yields the same tree.
#[instrument(level = "debug", skip_all)]
pub fn prune<N, E>(tree: &LabeledTree<N, E>, filter: &Filter<N>) -> LabeledTree<N, E>
where
    N: Clone,
    E: Clone,
{
    let pruned = prune_node(tree, filter);
    debug!(before = tree.len(), after = pruned.len(), "pruned tree");
    pruned
}

fn prune_node<N, E>(tree: &LabeledTree<N, E>, filter: &Filter<N>) -> LabeledTree<N, E>
where
    N: Clone,
    E: Clone,
{
    let edges = tree.edges().filter_map(|(label, child)| {
        let pruned = prune_node(child, filter);
        let keep = filter.accept(child.label()) || !pruned.is_leaf();
        keep.then(|| Edge::new(label.clone(), pruned))
    });
    LabeledTree::node(tree.label().clone(), edges)
}

/// Consuming variant of [`prune`]; avoids cloning labels of retained nodes.
pub fn prune_owned<N, E>(tree: LabeledTree<N, E>, filter: &Filter<N>) -> LabeledTree<N, E> {
    let (label, edges) = tree.into_parts();
    let edges: Vec<_> = edges
        .into_iter()
        .filter_map(|edge| {
            let (edge_label, child) = edge.into_parts();
            let accepted = filter.accept(child.label());
            let pruned = prune_owned(child, filter);
            (accepted || !pruned.is_leaf()).then(|| Edge::new(edge_label, pruned))
        })
        .collect();
    LabeledTree::node(label, edges)
}
