//! Core type definitions for Clustergraph.
//!
//! This module contains the identifier types used throughout the cluster tree:
//! - Tree-wide identifiers ([`GlobalVertex`], [`GlobalEdge`])
//! - Cluster-local handles ([`LocalVertex`], [`LocalEdge`])
//! - Cluster addresses ([`ClusterId`])
//! - The shared identifier source ([`IdGenerator`])

mod generator;
mod id;

pub use generator::IdGenerator;
pub use id::{ClusterId, GlobalEdge, GlobalVertex, LocalEdge, LocalVertex, RESERVED_IDS};
