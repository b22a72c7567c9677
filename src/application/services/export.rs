//! Export service
//!
//! Runs the tailoring pipeline: build the hierarchy, annotate it with effective facets,
//! derive the default filter, let a selector narrow it, prune, and hand the retained
//! entities to an exporter.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::selection::{AnnotatedEntityTree, FilterSelector, NodeFilter};
use crate::application::vocabulary::{collect_tagged_values, TaggedValueType, Vocabulary};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::property_filter::kind_filter;
use crate::domain::{
    intrinsic, prune_owned, strip, Annotated, EntitySource, EntityTree, FacetDefinition,
    FacetFilterBuilder, FacetIndex, HierarchyBuilder, ModelEntity, Package,
};

/// Receives the pruned hierarchy (original entity labels only).
pub trait Exporter {
    fn export(&self, root: &Package, tree: &EntityTree) -> ApplicationResult<()>;
}

/// How the default filter is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// `And` over facets, matched against effective (aggregated) facet sets
    #[default]
    Facets,
    /// Properties grouped by entity kind, matched against each entity's own label
    Kinds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The selector was cancelled; nothing was exported
    Cancelled,
    Exported { retained: usize },
}

/// Annotated hierarchy together with its default filter.
pub struct Prepared {
    pub annotated: AnnotatedEntityTree,
    pub default: NodeFilter,
}

/// Service for tailoring partial exports of a model hierarchy.
pub struct ExportService {
    settings: Arc<Settings>,
}

impl ExportService {
    /// Create a new export service.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    fn filter_builder(&self) -> FacetFilterBuilder {
        FacetFilterBuilder::new(self.settings.display_labels())
    }

    /// Facet definitions: the built-in `Type` and `Metatype` facets (if enabled) followed
    /// by one facet per facetable tagged value.
    ///
    /// `names` maps referenced GUIDs to entity names for reference-typed tagged values.
    pub fn facet_definitions(
        &self,
        vocabulary: &Vocabulary,
        names: Arc<HashMap<String, String>>,
    ) -> Vec<FacetDefinition<ModelEntity>> {
        let mut definitions = Vec::new();
        if self.settings.builtin_facets {
            definitions.push(FacetDefinition::new("Type", |e: &ModelEntity| {
                vec![e.type_name().to_string()]
            }));
            definitions.push(FacetDefinition::new("Metatype", |e: &ModelEntity| {
                vec![e.meta_type().to_string()]
            }));
        }
        for def in vocabulary.facet_tags(&self.settings.facet_types) {
            let def = def.clone();
            let names = Arc::clone(&names);
            definitions.push(FacetDefinition::new(def.name.clone(), move |e: &ModelEntity| {
                collect_tagged_values(e, &def, |guid| names.get(guid).cloned())
            }));
        }
        debug!(
            "facet_definitions: {:?}",
            definitions.iter().map(FacetDefinition::name).collect::<Vec<_>>()
        );
        definitions
    }

    /// Annotate every node with its effective facet set.
    pub fn annotate(
        &self,
        tree: EntityTree,
        definitions: &[FacetDefinition<ModelEntity>],
    ) -> AnnotatedEntityTree {
        let index = FacetIndex::new(|entity: &ModelEntity| intrinsic(definitions, entity));
        if self.settings.parallel {
            index.annotate_par(tree)
        } else {
            index.annotate(tree)
        }
    }

    /// Default facet filter over all annotated nodes; accepts every node.
    pub fn default_filter(
        &self,
        annotated: &AnnotatedEntityTree,
        definitions: &[FacetDefinition<ModelEntity>],
    ) -> NodeFilter {
        self.filter_builder()
            .for_facets(definitions.iter().map(FacetDefinition::name), annotated.iter())
    }

    /// Per-kind property filter, evaluated on each entity's own label.
    pub fn kind_filter(&self, tree: &AnnotatedEntityTree, vocabulary: &Vocabulary) -> NodeFilter {
        let tags: Vec<String> = vocabulary
            .facet_tags(&self.settings.facet_types)
            .into_iter()
            .map(|def| def.name.clone())
            .collect();
        let entities: Vec<&ModelEntity> = tree.iter().map(Annotated::entity).collect();
        kind_filter(entities.iter().copied(), &tags, &self.settings.display_labels())
            .focus(|node: &Annotated<ModelEntity>| &node.entity)
    }

    /// Build and annotate the hierarchy below `root` and derive its default filter.
    #[instrument(level = "debug", skip_all, fields(root = %root.data.name))]
    pub fn prepare(
        &self,
        root: Package,
        source: &dyn EntitySource,
        vocabulary: &Vocabulary,
        mode: FilterMode,
    ) -> ApplicationResult<Prepared> {
        let tree = HierarchyBuilder::new(source).build(root)?;
        let names = Arc::new(reference_names(&tree, vocabulary, source));
        let definitions = self.facet_definitions(vocabulary, names);
        let annotated = self.annotate(tree, &definitions);
        let default = match mode {
            FilterMode::Facets => self.default_filter(&annotated, &definitions),
            FilterMode::Kinds => self.kind_filter(&annotated, vocabulary),
        };
        debug!("prepare: nodes={}, mode={:?}", annotated.len(), mode);
        Ok(Prepared { annotated, default })
    }

    /// Prune the annotated hierarchy and strip the annotations.
    pub fn apply(&self, annotated: AnnotatedEntityTree, filter: &NodeFilter) -> EntityTree {
        strip(prune_owned(annotated, filter))
    }

    /// Run the whole export.
    ///
    /// Returns [`ExportOutcome::Cancelled`] without calling the exporter when the
    /// selector is cancelled.
    pub fn run(
        &self,
        root: Package,
        source: &dyn EntitySource,
        vocabulary: &Vocabulary,
        mode: FilterMode,
        selector: &dyn FilterSelector,
        exporter: &dyn Exporter,
    ) -> ApplicationResult<ExportOutcome> {
        let Prepared { annotated, default } =
            self.prepare(root.clone(), source, vocabulary, mode)?;

        let Some(filter) = selector.select(&default, &annotated)? else {
            info!("export cancelled by selector");
            return Ok(ExportOutcome::Cancelled);
        };

        let total = annotated.len();
        let pruned = self.apply(annotated, &filter);
        let retained = pruned.len();
        debug!("run: retained {} of {} nodes", retained, total);

        exporter.export(&root, &pruned)?;
        Ok(ExportOutcome::Exported { retained })
    }
}

/// Names of all entities referenced by reference-typed tagged values in `tree`.
fn reference_names(
    tree: &EntityTree,
    vocabulary: &Vocabulary,
    source: &dyn EntitySource,
) -> HashMap<String, String> {
    let reference_tags: Vec<_> = vocabulary
        .definitions()
        .iter()
        .filter(|def| {
            matches!(
                def.value_type,
                TaggedValueType::RefGuid | TaggedValueType::RefGuidList
            )
        })
        .collect();
    if reference_tags.is_empty() {
        return HashMap::new();
    }

    let local: HashMap<&str, &str> = tree.iter().map(|e| (e.guid(), e.name())).collect();
    let mut names = HashMap::new();
    for entity in tree.iter() {
        for def in &reference_tags {
            let Some(raw) = entity.tagged_value(&def.name) else {
                continue;
            };
            for guid in raw.split(',').map(str::trim).filter(|g| !g.is_empty()) {
                if names.contains_key(guid) {
                    continue;
                }
                let name = local
                    .get(guid)
                    .map(|n| n.to_string())
                    .or_else(|| source.resolve_name(guid));
                if let Some(name) = name {
                    names.insert(guid.to_string(), name);
                }
            }
        }
    }
    names
}
