//! Named, composable boolean filters.
//!
//! A [`Filter`] is a tree of named predicates: leaves test a single property, `Or`
//! accepts if any child accepts, `And` accepts if all children accept. Names exist for
//! presentation (the selection UI shows them); they play no part in matching.
//!
//! Filters are immutable values. Narrowing a filter ([`Filter::retain`]) or adapting it
//! to another label type ([`Filter::lift`], [`Filter::focus`]) returns a new filter.

use std::fmt;
use std::sync::Arc;

use termtree::Tree;

/// Shared predicate of a leaf filter.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

pub enum Filter<T> {
    Leaf { name: String, predicate: Predicate<T> },
    Or { name: String, children: Vec<Filter<T>> },
    And { name: String, children: Vec<Filter<T>> },
}

impl<T> Filter<T> {
    pub fn leaf<P>(name: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Filter::Leaf {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn or(name: impl Into<String>, children: impl IntoIterator<Item = Filter<T>>) -> Self {
        Filter::Or {
            name: name.into(),
            children: children.into_iter().collect(),
        }
    }

    pub fn and(name: impl Into<String>, children: impl IntoIterator<Item = Filter<T>>) -> Self {
        Filter::And {
            name: name.into(),
            children: children.into_iter().collect(),
        }
    }

    /// Evaluate the filter.
    ///
    /// `And` without children accepts, `Or` without children rejects.
    pub fn accept(&self, value: &T) -> bool {
        match self {
            Filter::Leaf { predicate, .. } => predicate(value),
            Filter::Or { children, .. } => children.iter().any(|c| c.accept(value)),
            Filter::And { children, .. } => children.iter().all(|c| c.accept(value)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Filter::Leaf { name, .. } | Filter::Or { name, .. } | Filter::And { name, .. } => name,
        }
    }

    /// Child filters; empty for leaves.
    pub fn children(&self) -> &[Filter<T>] {
        match self {
            Filter::Leaf { .. } => &[],
            Filter::Or { children, .. } | Filter::And { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Filter::Leaf { .. })
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Filter<T>> {
        self.children().iter().find(|c| c.name() == name)
    }

    /// Name paths from this filter down to every leaf, in order.
    ///
    /// Each path starts with this filter's own name and ends with the leaf's name.
    pub fn leaf_paths(&self) -> Vec<Vec<&str>> {
        fn walk<'a, T>(
            filter: &'a Filter<T>,
            prefix: &mut Vec<&'a str>,
            out: &mut Vec<Vec<&'a str>>,
        ) {
            prefix.push(filter.name());
            match filter {
                Filter::Leaf { .. } => out.push(prefix.clone()),
                Filter::Or { children, .. } | Filter::And { children, .. } => {
                    for child in children {
                        walk(child, prefix, out);
                    }
                }
            }
            prefix.pop();
        }

        let mut out = Vec::new();
        walk(self, &mut Vec::new(), &mut out);
        out
    }

    /// New filter keeping only the leaves whose name path satisfies `keep`.
    ///
    /// Combinators survive with their names even when all their leaves are dropped,
    /// so a facet with nothing selected rejects everything.
    pub fn retain<K>(&self, keep: K) -> Filter<T>
    where
        K: Fn(&[&str]) -> bool,
    {
        fn go<T, K: Fn(&[&str]) -> bool>(
            filter: &Filter<T>,
            prefix: &mut Vec<String>,
            keep: &K,
        ) -> Option<Filter<T>> {
            prefix.push(filter.name().to_string());
            let result = match filter {
                Filter::Leaf { .. } => {
                    let path: Vec<&str> = prefix.iter().map(String::as_str).collect();
                    keep(&path).then(|| filter.clone())
                }
                Filter::Or { name, children } => Some(Filter::Or {
                    name: name.clone(),
                    children: children.iter().filter_map(|c| go(c, prefix, keep)).collect(),
                }),
                Filter::And { name, children } => Some(Filter::And {
                    name: name.clone(),
                    children: children.iter().filter_map(|c| go(c, prefix, keep)).collect(),
                }),
            };
            prefix.pop();
            result
        }

        // The root itself is never dropped: a leaf root that is not kept becomes an
        // empty Or, which rejects.
        go(self, &mut Vec::new(), &keep).unwrap_or_else(|| Filter::or(self.name(), []))
    }

    /// Adapt this filter to a broader label type.
    ///
    /// The lifted filter is a single leaf carrying this filter's name. It rejects values
    /// for which `project` yields `None` and otherwise delegates to this filter.
    pub fn lift<U, P>(&self, project: P) -> Filter<U>
    where
        T: 'static,
        U: 'static,
        P: for<'a> Fn(&'a U) -> Option<&'a T> + Send + Sync + 'static,
    {
        let inner = self.clone();
        Filter::leaf(self.name(), move |value: &U| {
            project(value).is_some_and(|narrow| inner.accept(narrow))
        })
    }

    /// Adapt this filter to a label type that always contains a `T`, keeping the
    /// full filter structure (names and combinators) intact.
    pub fn focus<U, P>(&self, project: P) -> Filter<U>
    where
        T: 'static,
        U: 'static,
        P: for<'a> Fn(&'a U) -> &'a T + Send + Sync + 'static,
    {
        fn go<T: 'static, U: 'static, P>(filter: &Filter<T>, project: &Arc<P>) -> Filter<U>
        where
            P: for<'a> Fn(&'a U) -> &'a T + Send + Sync + 'static,
        {
            match filter {
                Filter::Leaf { name, predicate } => {
                    let predicate = Arc::clone(predicate);
                    let project = Arc::clone(project);
                    Filter::leaf(name.clone(), move |value: &U| predicate(project(value)))
                }
                Filter::Or { name, children } => {
                    Filter::or(name.clone(), children.iter().map(|c| go(c, project)))
                }
                Filter::And { name, children } => {
                    Filter::and(name.clone(), children.iter().map(|c| go(c, project)))
                }
            }
        }
        go(self, &Arc::new(project))
    }

    pub fn to_tree_string(&self) -> Tree<String> {
        let label = match self {
            Filter::Leaf { name, .. } => name.clone(),
            Filter::Or { name, .. } => format!("{} (any)", display_name(name)),
            Filter::And { name, .. } => format!("{} (all)", display_name(name)),
        };
        Tree::new(label).with_leaves(self.children().iter().map(Filter::to_tree_string))
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "*"
    } else {
        name
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        match self {
            Filter::Leaf { name, predicate } => Filter::Leaf {
                name: name.clone(),
                predicate: Arc::clone(predicate),
            },
            Filter::Or { name, children } => Filter::Or {
                name: name.clone(),
                children: children.clone(),
            },
            Filter::And { name, children } => Filter::And {
                name: name.clone(),
                children: children.clone(),
            },
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Leaf { name, .. } => f.debug_tuple("Leaf").field(name).finish(),
            Filter::Or { name, children } => {
                f.debug_tuple("Or").field(name).field(children).finish()
            }
            Filter::And { name, children } => {
                f.debug_tuple("And").field(name).field(children).finish()
            }
        }
    }
}

impl<T> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn even() -> Filter<i32> {
        Filter::leaf("even", |n: &i32| n % 2 == 0)
    }

    fn positive() -> Filter<i32> {
        Filter::leaf("positive", |n: &i32| *n > 0)
    }

    #[rstest]
    #[case(-3)]
    #[case(0)]
    #[case(42)]
    fn test_vacuous_laws(#[case] value: i32) {
        assert!(Filter::<i32>::and("", []).accept(&value));
        assert!(!Filter::<i32>::or("", []).accept(&value));
    }

    #[rstest]
    #[case(4, true, true)]
    #[case(3, false, true)]
    #[case(-2, false, true)]
    #[case(-3, false, false)]
    fn test_combinators(#[case] value: i32, #[case] all: bool, #[case] any: bool) {
        assert_eq!(Filter::and("all", [even(), positive()]).accept(&value), all);
        assert_eq!(Filter::or("any", [even(), positive()]).accept(&value), any);
    }

    #[test]
    fn test_names_do_not_affect_matching() {
        let a = Filter::leaf("x", |n: &i32| *n == 1);
        let b = Filter::leaf("completely different", |n: &i32| *n == 1);
        assert_eq!(a.accept(&1), b.accept(&1));
        assert_eq!(a.name(), "x");
    }

    #[test]
    fn test_leaf_paths_include_all_ancestors() {
        let filter = Filter::and("", [Filter::or("Num", [even(), positive()])]);
        assert_eq!(
            filter.leaf_paths(),
            vec![vec!["", "Num", "even"], vec!["", "Num", "positive"]]
        );
    }

    #[test]
    fn test_retain_drops_leaves_and_keeps_structure() {
        let filter = Filter::and("", [Filter::or("Num", [even(), positive()])]);
        let narrowed = filter.retain(|path| path.last() == Some(&"even"));

        assert_eq!(narrowed.children()[0].children().len(), 1);
        assert!(!narrowed.accept(&3));
        assert!(narrowed.accept(&-2));
        // original untouched
        assert!(filter.accept(&3));
    }

    #[test]
    fn test_retain_nothing_rejects() {
        let filter = Filter::and("", [Filter::or("Num", [even(), positive()])]);
        let narrowed = filter.retain(|_| false);
        assert!(!narrowed.accept(&4));
        assert_eq!(narrowed.child("Num").map(|c| c.children().len()), Some(0));
    }

    #[derive(Debug)]
    enum Shape {
        Circle(u32),
        Square(u32),
    }

    fn as_circle(shape: &Shape) -> Option<&u32> {
        match shape {
            Shape::Circle(r) => Some(r),
            Shape::Square(_) => None,
        }
    }

    #[test]
    fn test_lift_rejects_other_variants() {
        let accept_all = Filter::<u32>::and("anything", []);
        let lifted = accept_all.lift(as_circle);

        assert!(lifted.accept(&Shape::Circle(1)));
        assert!(!lifted.accept(&Shape::Square(1)));
        assert_eq!(lifted.name(), "anything");
    }

    #[test]
    fn test_focus_keeps_structure() {
        let filter = Filter::and("", [Filter::or("Num", [even(), positive()])]);
        let focused: Filter<(i32, &'static str)> =
            filter.focus(|pair: &(i32, &'static str)| &pair.0);

        assert_eq!(focused.leaf_paths(), filter.leaf_paths());
        assert!(focused.accept(&(2, "x")));
        assert!(!focused.accept(&(-1, "x")));
    }

    #[test]
    fn test_tree_string_shows_combinators() {
        let rendered = Filter::and("", [Filter::or("Num", [even()])]).to_string();
        assert!(rendered.contains("* (all)"));
        assert!(rendered.contains("Num (any)"));
        assert!(rendered.contains("even"));
    }
}
