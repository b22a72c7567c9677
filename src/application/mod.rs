//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on collaborator traits.

pub mod error;
pub mod selection;
pub mod services;
pub mod vocabulary;

pub use error::{ApplicationError, ApplicationResult};
pub use selection::{
    AcceptAll, AnnotatedEntityTree, FacetSelection, FilterSelector, NodeFilter, StaticSelector,
};
pub use vocabulary::{collect_tagged_values, TaggedValueDefinition, TaggedValueType, Vocabulary};
