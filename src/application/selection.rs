//! Filter selection: the step where a user narrows the default filter before pruning.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Annotated, AnnotatedTree, Containment, Filter, ModelEntity};

/// Filter over facet-annotated entity nodes.
pub type NodeFilter = Filter<Annotated<ModelEntity>>;

/// Entity hierarchy annotated with effective facets.
pub type AnnotatedEntityTree = AnnotatedTree<ModelEntity, Containment>;

/// Lets a user narrow the default filter.
///
/// `Ok(None)` means the user cancelled: nothing is pruned or exported.
pub trait FilterSelector {
    fn select(
        &self,
        default: &NodeFilter,
        annotated: &AnnotatedEntityTree,
    ) -> ApplicationResult<Option<NodeFilter>>;
}

/// Keeps the default filter unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl FilterSelector for AcceptAll {
    fn select(
        &self,
        default: &NodeFilter,
        _annotated: &AnnotatedEntityTree,
    ) -> ApplicationResult<Option<NodeFilter>> {
        Ok(Some(default.clone()))
    }
}

/// A `Facet=Value` pair naming one leaf of a filter.
///
/// `Facet` may be qualified with its enclosing group names, e.g. `Elements/Metatype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetSelection {
    pub facet: String,
    pub value: String,
}

impl FacetSelection {
    pub fn new(facet: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            facet: facet.into(),
            value: value.into(),
        }
    }

    /// True if `path` (root name first, leaf name last) names a leaf of this facet.
    fn matches_facet(&self, path: &[&str]) -> bool {
        facet_key(path)
            .is_some_and(|key| key == self.facet || key.ends_with(&format!("/{}", self.facet)))
    }

    fn matches(&self, path: &[&str]) -> bool {
        self.matches_facet(path) && path.last() == Some(&self.value.as_str())
    }
}

/// Group names between the root and the leaf, joined by `/`.
fn facet_key(path: &[&str]) -> Option<String> {
    (path.len() >= 3).then(|| path[1..path.len() - 1].join("/"))
}

impl FromStr for FacetSelection {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((facet, value)) if !facet.trim().is_empty() => {
                Ok(FacetSelection::new(facet.trim(), value.trim()))
            }
            _ => Err(ApplicationError::InvalidSelection {
                message: format!("expected FACET=VALUE, got '{}'", s),
            }),
        }
    }
}

impl fmt::Display for FacetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.facet, self.value)
    }
}

/// Narrows the default filter from selections given up front, e.g. on the command line.
///
/// For every facet named in `select`, only the listed values stay. Values named in
/// `deselect` are dropped. Facets not mentioned keep all their values.
#[derive(Debug, Clone, Default)]
pub struct StaticSelector {
    select: Vec<FacetSelection>,
    deselect: Vec<FacetSelection>,
}

impl StaticSelector {
    pub fn new(select: Vec<FacetSelection>, deselect: Vec<FacetSelection>) -> Self {
        Self { select, deselect }
    }

    /// Every selection must name an existing facet and value of `filter`.
    fn validate<T>(&self, filter: &Filter<T>) -> ApplicationResult<()> {
        let paths = filter.leaf_paths();
        for selection in self.select.iter().chain(&self.deselect) {
            if !paths.iter().any(|p| selection.matches_facet(p)) {
                return Err(ApplicationError::InvalidSelection {
                    message: format!("unknown facet '{}'", selection.facet),
                });
            }
            if !paths.iter().any(|p| selection.matches(p)) {
                return Err(ApplicationError::InvalidSelection {
                    message: format!(
                        "unknown value '{}' for facet '{}'",
                        selection.value, selection.facet
                    ),
                });
            }
        }
        Ok(())
    }

    /// Apply the selections to any filter.
    pub fn narrow<T>(&self, filter: &Filter<T>) -> ApplicationResult<Filter<T>> {
        self.validate(filter)?;
        let narrowed = filter.retain(|path| {
            let selected_facet: Vec<_> = self
                .select
                .iter()
                .filter(|s| s.matches_facet(path))
                .collect();
            let kept_by_select =
                selected_facet.is_empty() || selected_facet.iter().any(|s| s.matches(path));
            let dropped = self.deselect.iter().any(|s| s.matches(path));
            kept_by_select && !dropped
        });
        debug!(
            "narrow: leaves before={} after={}",
            filter.leaf_paths().len(),
            narrowed.leaf_paths().len()
        );
        Ok(narrowed)
    }
}

impl FilterSelector for StaticSelector {
    fn select(
        &self,
        default: &NodeFilter,
        _annotated: &AnnotatedEntityTree,
    ) -> ApplicationResult<Option<NodeFilter>> {
        self.narrow(default).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn filter() -> Filter<(&'static str, &'static str)> {
        let leaf = |facet: &'static str, value: &'static str| {
            Filter::leaf(value, move |(f, v): &(&'static str, &'static str)| {
                *f == facet && *v == value
            })
        };
        Filter::and(
            "",
            [
                Filter::or("Type", [leaf("Type", "Element"), leaf("Type", "Package")]),
                Filter::or("Stage", [leaf("Stage", "Draft"), leaf("Stage", "Final")]),
            ],
        )
    }

    #[rstest]
    #[case("Type=Element", "Type", "Element")]
    #[case(" Stage = <empty> ", "Stage", "<empty>")]
    #[case("Elements/Metatype=adProblem", "Elements/Metatype", "adProblem")]
    fn test_parse_selection(#[case] input: &str, #[case] facet: &str, #[case] value: &str) {
        assert_eq!(input.parse::<FacetSelection>().unwrap(), FacetSelection::new(facet, value));
    }

    #[rstest]
    #[case("Type")]
    #[case("=Element")]
    fn test_parse_selection_rejects_malformed(#[case] input: &str) {
        assert!(matches!(
            input.parse::<FacetSelection>(),
            Err(ApplicationError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_select_keeps_only_listed_values_of_that_facet() {
        let selector = StaticSelector::new(vec![FacetSelection::new("Type", "Package")], vec![]);
        let narrowed = selector.narrow(&filter()).unwrap();

        assert_eq!(
            narrowed.leaf_paths(),
            vec![
                vec!["", "Type", "Package"],
                vec!["", "Stage", "Draft"],
                vec!["", "Stage", "Final"],
            ]
        );
    }

    #[test]
    fn test_deselect_drops_value() {
        let selector = StaticSelector::new(vec![], vec![FacetSelection::new("Stage", "Draft")]);
        let narrowed = selector.narrow(&filter()).unwrap();

        assert_eq!(narrowed.child("Stage").map(|s| s.children().len()), Some(1));
        assert_eq!(narrowed.child("Type").map(|s| s.children().len()), Some(2));
    }

    #[rstest]
    #[case("Color", "Red", "unknown facet")]
    #[case("Type", "Diagram", "unknown value")]
    fn test_unknown_selection_is_rejected(
        #[case] facet: &str,
        #[case] value: &str,
        #[case] message: &str,
    ) {
        let selector = StaticSelector::new(vec![FacetSelection::new(facet, value)], vec![]);
        let err = selector.narrow(&filter()).unwrap_err();
        assert!(err.to_string().contains(message), "{err}");
    }

    #[test]
    fn test_qualified_facet_matches_only_its_group() {
        let leaf = |name: &'static str| Filter::leaf(name, |_: &u8| true);
        let filter = Filter::or(
            "",
            [
                Filter::and("Elements", [Filter::or("Metatype", [leaf("a"), leaf("b")])]),
                Filter::and("Diagrams", [Filter::or("Metatype", [leaf("a")])]),
            ],
        );
        let selector =
            StaticSelector::new(vec![], vec![FacetSelection::new("Diagrams/Metatype", "a")]);
        let narrowed = selector.narrow(&filter).unwrap();

        assert_eq!(narrowed.leaf_paths().len(), 2);
        assert!(narrowed
            .leaf_paths()
            .iter()
            .all(|p| p[1] == "Elements"));
    }
}
