//! tailor: facet-driven tailoring of hierarchical model exports
//!
//! Architecture:
//! - `domain`: labeled trees, facet aggregation, filters, pruning, entity model
//! - `application`: vocabulary, selection, export orchestration
//! - `infrastructure`: model documents, JSON export, interactive picker, wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
