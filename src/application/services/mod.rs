//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod document;
mod tree;

pub use document::{Document, DocumentFormat, DocumentService, HEADER_MARKER};
pub use tree::{Assignment, MergeOutcome, TreeService};
