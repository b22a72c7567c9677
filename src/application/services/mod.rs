//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on collaborator traits (EntitySource, FilterSelector, Exporter)
//! but are themselves concrete structs, not traits.

mod export;

pub use export::{ExportOutcome, ExportService, Exporter, FilterMode, Prepared};
