//! Error types for Clustergraph.
//!
//! Every fallible operation returns [`Result`]. Apart from [`ClusterError`],
//! an `Err` means the call had no effect on the cluster tree.

use crate::types::{ClusterId, GlobalEdge, GlobalVertex, LocalEdge, LocalVertex};
use thiserror::Error;

/// Result type alias for Clustergraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The global vertex is not reachable from the addressed cluster.
    #[error("vertex {0} not found")]
    VertexNotFound(GlobalVertex),

    /// The global edge is not reachable from the addressed cluster.
    #[error("edge {0} not found")]
    EdgeNotFound(GlobalEdge),

    /// The local vertex handle does not resolve in the addressed cluster.
    #[error("local vertex {0} is not valid in this cluster")]
    InvalidLocalVertex(LocalVertex),

    /// The local edge handle does not resolve in the addressed cluster.
    #[error("local edge {0} is not valid in this cluster")]
    InvalidLocalEdge(LocalEdge),

    /// A caller-supplied global id lies in the reserved range.
    #[error("global id {0} is reserved")]
    InvalidGlobalId(u64),

    /// Both endpoints of a requested edge resolve to the same local vertex.
    #[error("edge endpoints resolve to the same vertex")]
    SelfLoop,

    /// A cluster vertex was named as an edge endpoint. Edges only connect
    /// ordinary vertices; cluster vertices carry aggregated edges.
    #[error("vertex {0} represents a subcluster and cannot be an edge endpoint")]
    ClusterEndpoint(GlobalVertex),

    /// The cluster id does not name a live cluster of this tree.
    #[error("cluster {0} not found")]
    ClusterNotFound(ClusterId),

    /// The cluster is not a direct child of the given parent.
    #[error("cluster {child} is not a subcluster of {parent}")]
    NotASubcluster {
        /// The addressed parent.
        parent: ClusterId,
        /// The cluster expected to be its child.
        child: ClusterId,
    },

    /// The operation needs a parent cluster but was called on the root.
    #[error("the root cluster has no parent")]
    RootHasNoParent,

    /// The attribute type was not declared in the graph configuration.
    #[error("{kind} type {name} is not registered")]
    UnregisteredType {
        /// Which registry list was searched.
        kind: &'static str,
        /// Type name of the attribute.
        name: &'static str,
    },

    /// The attribute type was declared twice in one registry list.
    #[error("{kind} type {name} is registered twice")]
    DuplicateType {
        /// Which registry list holds the duplicate.
        kind: &'static str,
        /// Type name of the attribute.
        name: &'static str,
    },

    /// Copied content would reuse a global id the target tree keeps elsewhere.
    #[error("global id {0} already exists in the target tree")]
    DuplicateGlobalId(u64),

    /// Two trees with different attribute registries cannot exchange content.
    #[error("graph configurations are incompatible")]
    IncompatibleConfig,

    /// Internal consistency violation.
    #[error("cluster error: {0}")]
    Cluster(#[from] ClusterError),
}

/// Internal consistency violations of the cluster tree.
///
/// These only surface through implementation bugs, never through misuse of
/// the public API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// A subcluster map entry has no matching cluster vertex, or vice versa.
    #[error("cluster map and cluster vertices disagree at {0}")]
    MapMismatch(LocalVertex),

    /// A cluster references a parent that no longer exists.
    #[error("cluster {0} has a dangling parent")]
    DanglingParent(ClusterId),

    /// A global edge no longer resolves to two distinct local vertices.
    #[error("global edge {0} does not resolve to distinct local vertices")]
    UnresolvedEdge(GlobalEdge),
}
