//! Domain layer: tree, facet and filter engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entity;
pub mod error;
pub mod facet_filter;
pub mod facets;
pub mod filter;
pub mod index;
pub mod property_filter;
pub mod prune;
pub mod tree;

pub use builder::{Containment, EntitySource, EntityTree, HierarchyBuilder, PackageContents};
pub use entity::{
    Connector, Diagram, DiagramType, Element, EntityData, EntityKind, EntityVariant, ModelEntity,
    Package,
};
pub use error::{DomainError, DomainResult};
pub use facet_filter::{intrinsic, DisplayLabels, FacetDefinition, FacetFilterBuilder};
pub use facets::{FacetSet, HasFacets};
pub use filter::Filter;
pub use index::{strip, Annotated, AnnotatedTree, FacetIndex};
pub use prune::{prune, prune_owned};
pub use tree::{Edge, LabeledTree, TreeDisplay};
