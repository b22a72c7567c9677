//! Labeled tree: every node and every edge carries a label.
//!
//! Trees are built once and never mutated. Transformations (`map_labels`, pruning,
//! facet annotation) always produce a new tree.

use std::fmt;

use termtree::Tree;

/// Tree node owning its outgoing edges.
///
/// A node is exclusively owned by the edge that points at it, so cycles cannot be
/// expressed. Edge order is the insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTree<N, E = ()> {
    label: N,
    edges: Vec<Edge<N, E>>,
}

/// Labeled edge owning exactly one child node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<N, E = ()> {
    label: E,
    target: LabeledTree<N, E>,
}

impl<N, E> Edge<N, E> {
    pub fn new(label: E, target: LabeledTree<N, E>) -> Self {
        Self { label, target }
    }

    pub fn label(&self) -> &E {
        &self.label
    }

    pub fn target(&self) -> &LabeledTree<N, E> {
        &self.target
    }

    pub fn into_parts(self) -> (E, LabeledTree<N, E>) {
        (self.label, self.target)
    }
}

impl<N> Edge<N, ()> {
    /// Edge without a meaningful label.
    pub fn unlabeled(target: LabeledTree<N, ()>) -> Self {
        Self::new((), target)
    }
}

impl<N, E> LabeledTree<N, E> {
    pub fn node(label: N, edges: impl IntoIterator<Item = Edge<N, E>>) -> Self {
        Self {
            label,
            edges: edges.into_iter().collect(),
        }
    }

    pub fn leaf(label: N) -> Self {
        Self {
            label,
            edges: Vec::new(),
        }
    }

    pub fn label(&self) -> &N {
        &self.label
    }

    /// Outgoing `(edge label, child)` pairs in insertion order.
    ///
    /// The iterator is `Clone`, so callers can restart it cheaply.
    pub fn edges(&self) -> impl Iterator<Item = (&E, &LabeledTree<N, E>)> + Clone + '_ {
        self.edges.iter().map(|edge| (&edge.label, &edge.target))
    }

    pub fn edge_list(&self) -> &[Edge<N, E>] {
        &self.edges
    }

    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn into_parts(self) -> (N, Vec<Edge<N, E>>) {
        (self.label, self.edges)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        1 + self.edges.iter().map(|e| e.target.len()).sum::<usize>()
    }

    /// A tree always has its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn depth(&self) -> usize {
        1 + self
            .edges
            .iter()
            .map(|e| e.target.depth())
            .max()
            .unwrap_or(0)
    }

    /// Node labels in pre-order (root first, children left to right).
    pub fn iter(&self) -> PreOrderIterator<'_, N, E> {
        PreOrderIterator { stack: vec![self] }
    }

    /// Node labels in post-order (children before their parent).
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, N, E> {
        PostOrderIterator {
            stack: vec![(self, false)],
        }
    }

    pub fn leaf_labels(&self) -> Vec<&N> {
        self.subtrees()
            .filter(|t| t.is_leaf())
            .map(|t| t.label())
            .collect()
    }

    /// All subtrees in pre-order, starting with `self`.
    pub fn subtrees(&self) -> impl Iterator<Item = &LabeledTree<N, E>> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let current = stack.pop()?;
            for edge in current.edges.iter().rev() {
                stack.push(&edge.target);
            }
            Some(current)
        })
    }

    /// Label paths from the root to every node, in pre-order.
    pub fn paths(&self) -> Vec<Vec<&N>> {
        fn walk<'a, N, E>(
            tree: &'a LabeledTree<N, E>,
            prefix: &mut Vec<&'a N>,
            out: &mut Vec<Vec<&'a N>>,
        ) {
            prefix.push(&tree.label);
            out.push(prefix.clone());
            for edge in &tree.edges {
                walk(&edge.target, prefix, out);
            }
            prefix.pop();
        }

        let mut out = Vec::new();
        walk(self, &mut Vec::new(), &mut out);
        out
    }

    /// New tree of the same shape with every node label transformed.
    pub fn map_labels<M, F>(&self, f: F) -> LabeledTree<M, E>
    where
        E: Clone,
        F: Fn(&N) -> M,
    {
        fn go<N, M, E, F>(tree: &LabeledTree<N, E>, f: &F) -> LabeledTree<M, E>
        where
            E: Clone,
            F: Fn(&N) -> M,
        {
            LabeledTree {
                label: f(&tree.label),
                edges: tree
                    .edges
                    .iter()
                    .map(|e| Edge::new(e.label.clone(), go(&e.target, f)))
                    .collect(),
            }
        }
        go(self, &f)
    }

    /// Consuming variant of [`map_labels`](Self::map_labels).
    pub fn into_mapped<M, F>(self, f: &F) -> LabeledTree<M, E>
    where
        F: Fn(N) -> M,
    {
        LabeledTree {
            label: f(self.label),
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge::new(e.label, e.target.into_mapped(f)))
                .collect(),
        }
    }
}

/// Render a tree as text via `termtree`.
pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<N: fmt::Display, E> TreeDisplay for LabeledTree<N, E> {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.edges.iter().map(|e| e.target.to_tree_string()).collect();
        Tree::new(self.label.to_string()).with_leaves(leaves)
    }
}

pub struct PreOrderIterator<'a, N, E> {
    stack: Vec<&'a LabeledTree<N, E>>,
}

impl<N, E> Clone for PreOrderIterator<'_, N, E> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<'a, N, E> Iterator for PreOrderIterator<'a, N, E> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for edge in current.edges.iter().rev() {
            self.stack.push(&edge.target);
        }
        Some(&current.label)
    }
}

pub struct PostOrderIterator<'a, N, E> {
    stack: Vec<(&'a LabeledTree<N, E>, bool)>,
}

impl<'a, N, E> Iterator for PostOrderIterator<'a, N, E> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(&current.label);
            }
            self.stack.push((current, true));
            for edge in current.edges.iter().rev() {
                self.stack.push((&edge.target, false));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //      r
    //     / \
    //    a   b
    //    |
    //    c
    fn sample() -> LabeledTree<&'static str, u8> {
        LabeledTree::node(
            "r",
            [
                Edge::new(1, LabeledTree::node("a", [Edge::new(3, LabeledTree::leaf("c"))])),
                Edge::new(2, LabeledTree::leaf("b")),
            ],
        )
    }

    #[test]
    fn test_edges_preserve_order_and_restart() {
        let tree = sample();
        let edges = tree.edges();
        let first: Vec<_> = edges.clone().map(|(l, t)| (*l, *t.label())).collect();
        let second: Vec<_> = edges.map(|(l, t)| (*l, *t.label())).collect();
        assert_eq!(first, vec![(1, "a"), (2, "b")]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_traversal_orders() {
        let tree = sample();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec!["r", "a", "c", "b"]);
        assert_eq!(
            tree.iter_postorder().copied().collect::<Vec<_>>(),
            vec!["c", "a", "b", "r"]
        );
    }

    #[test]
    fn test_shape_queries() {
        let tree = sample();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_labels(), vec![&"c", &"b"]);
        assert_eq!(tree.paths().len(), 4);
        assert_eq!(tree.paths()[2], vec![&"r", &"a", &"c"]);
    }

    #[test]
    fn test_map_labels_keeps_shape_and_edge_labels() {
        let tree = sample();
        let upper = tree.map_labels(|l| l.to_uppercase());
        assert_eq!(upper.label(), "R");
        assert_eq!(upper.edge_list()[0].label(), &1);
        assert_eq!(upper.edge_list()[0].target().edge_list()[0].target().label(), "C");
        // input untouched
        assert_eq!(*tree.label(), "r");
    }

    #[test]
    fn test_to_tree_string() {
        let rendered = sample().to_tree_string().to_string();
        assert!(rendered.starts_with("r\n"));
        assert!(rendered.contains("c"));
    }
}
