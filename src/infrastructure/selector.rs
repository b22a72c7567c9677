//! Interactive facet selection

use std::sync::Arc;

use tracing::debug;

use crate::application::{
    AnnotatedEntityTree, ApplicationError, ApplicationResult, FilterSelector, NodeFilter,
};
use crate::infrastructure::traits::{MultiSelector, SelectionItem};

const SEPARATOR: &str = " › ";

/// Presents every `Facet › Value` leaf of the default filter in a multi-select picker.
///
/// Facets with at least one chosen value keep only the chosen values. Facets with no
/// chosen value keep all of them. Aborting the picker cancels the export.
pub struct SkimFacetSelector {
    selector: Arc<dyn MultiSelector>,
}

impl SkimFacetSelector {
    pub fn new(selector: Arc<dyn MultiSelector>) -> Self {
        Self { selector }
    }
}

/// Display text for a leaf path, without the unnamed root.
fn display_path(path: &[&str]) -> String {
    path.iter()
        .skip(1)
        .copied()
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// The facet part of a leaf path (everything but the leaf name).
fn facet_of<'a, 'b>(path: &'a [&'b str]) -> &'a [&'b str] {
    &path[..path.len().saturating_sub(1)]
}

impl FilterSelector for SkimFacetSelector {
    fn select(
        &self,
        default: &NodeFilter,
        annotated: &AnnotatedEntityTree,
    ) -> ApplicationResult<Option<NodeFilter>> {
        let paths = default.leaf_paths();
        let items: Vec<SelectionItem> = paths
            .iter()
            .enumerate()
            .map(|(i, path)| SelectionItem {
                display: display_path(path),
                value: i.to_string(),
            })
            .collect();

        let prompt = format!("{} › ", annotated.label().entity.name());
        let Some(chosen) = self
            .selector
            .select_many(&items, &prompt)
            .map_err(|message| ApplicationError::Selection { message })?
        else {
            return Ok(None);
        };
        debug!("select: chosen {} of {} values", chosen.len(), items.len());

        let chosen_paths: Vec<&Vec<&str>> = chosen
            .iter()
            .filter_map(|item| item.value.parse::<usize>().ok())
            .filter_map(|i| paths.get(i))
            .collect();
        let narrowed_facets: Vec<&[&str]> = chosen_paths.iter().map(|p| facet_of(p)).collect();

        Ok(Some(default.retain(|path| {
            let facet = facet_of(path);
            !narrowed_facets.iter().any(|f| *f == facet)
                || chosen_paths.iter().any(|p| p.as_slice() == path)
        })))
    }
}
