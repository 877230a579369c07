//! Domain layer: the key-path tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod merge;
pub mod pack;
pub mod unpack;
pub mod value;

pub use error::{DomainError, DomainResult};
pub use merge::{merge, merge_all, merge_with, ConflictPolicy, MergeEvent};
pub use pack::{pack, split_components, Fill, FoldOrder, PackItems, PackOptions};
pub use unpack::unpack;
pub use value::{FlatEntries, Tree, Value, DEFAULT_DELIMITER};
