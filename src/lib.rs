//! Arborist - Generate linked API reference pages from Doxygen XML
//!
//! Reads the index.xml produced by Doxygen, links every documented
//! compound into an ownership tree mirroring namespace, class, and
//! directory nesting, resolves file-level cross-references from the
//! per-compound detail documents, and writes a hyperlinked
//! reStructuredText page hierarchy with class, directory, and full-index
//! views.

pub mod cli;
pub mod config;
pub mod doxygen;
pub mod error;
pub mod graph;
pub mod output;

// Re-export main types
pub use config::Config;
pub use doxygen::{Compound, DoxygenIndex};
pub use error::{Error, Result};
pub use graph::{ApiGraph, Entity, EntityId, EntityKind};
pub use output::{GenerationReport, RstConfig, RstGenerator};
