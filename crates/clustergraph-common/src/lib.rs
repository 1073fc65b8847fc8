//! # clustergraph-common
//!
//! Foundation layer for Clustergraph: identifiers, id generation, and errors.
//!
//! This crate provides the building blocks shared by the other Clustergraph
//! crates. It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Identifier types (GlobalVertex, GlobalEdge, LocalVertex, ...)
//!   and the tree-shared [`IdGenerator`]
//! - [`utils`] - Utility functions and helpers (hashing, errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::{ClusterId, GlobalEdge, GlobalVertex, IdGenerator, LocalEdge, LocalVertex};
pub use utils::error::{ClusterError, Error, Result};
