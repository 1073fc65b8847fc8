//! # clustergraph-core
//!
//! Core layer for Clustergraph: local graph storage, the attribute store,
//! and the cluster tree built on top of them.
//!
//! It depends only on `clustergraph-common`.
//!
//! ## Modules
//!
//! - [`graph`] - Local undirected multigraph storage and entity bundles
//! - [`attribute`] - Attribute registry, typed properties and shared objects
//! - [`cluster`] - The cluster tree with descriptor translation and mutation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attribute;
pub mod cluster;
pub mod graph;

// Re-export commonly used types
pub use attribute::{AttributeKey, GraphConfig, GraphConfigBuilder, Property, SharedObject};
pub use cluster::{Cluster, ClusterGraph, ObjectCloner, Removed, ShareObjects, Visit};
pub use graph::LocalGraph;
