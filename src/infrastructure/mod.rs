//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and collaborator adapters, and wires up
//! services.

pub mod di;
pub mod error;
pub mod exporter;
pub mod model_file;
pub mod selector;
pub mod traits;

pub use error::{InfraError, InfraResult, IoResultExt};
pub use exporter::JsonExporter;
pub use model_file::{ModelDocument, ModelSource};
pub use selector::SkimFacetSelector;
