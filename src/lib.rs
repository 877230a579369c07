//! pathtree: flatten, rebuild and deep-merge hierarchical trees via key paths
//!
//! Layers:
//! - `domain`: the pure tree engine (`unpack`, `pack`, `merge`)
//! - `application`: document loading/saving and file-level use cases
//! - `infrastructure`: I/O boundary traits and service wiring
//! - `cli`: argument parsing, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
