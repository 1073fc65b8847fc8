//! # Clustergraph
//!
//! A hierarchical, clustered, undirected multigraph.
//!
//! Entities get global identifiers that stay valid however the graph is
//! regrouped. Vertices can be moved into nested *clusters*, each with its
//! own local storage, and every vertex and edge carries typed properties and
//! optional shared objects declared once in a [`GraphConfig`].
//!
//! Start with [`ClusterGraph`]: it owns the whole cluster tree, and every
//! operation names the cluster it works in.
//!
//! ## Quick Start
//!
//! ```rust
//! use clustergraph::{ClusterGraph, GraphConfig, Property};
//!
//! struct Name;
//! impl Property for Name {
//!     type Value = String;
//! }
//!
//! let config = GraphConfig::builder().vertex_property::<Name>().build()?;
//! let mut graph = ClusterGraph::new(config);
//! let root = graph.root();
//!
//! let (a, ga) = graph.add_vertex(root)?;
//! let (b, _) = graph.add_vertex(root)?;
//! let (_, edge) = graph.add_edge(root, a, b)?;
//! graph.set_property::<Name>(root, a, "p1".to_string())?;
//!
//! // Regroup: `a` moves into a subcluster, the edge follows
//! let (rigid, _) = graph.create_subcluster(root)?;
//! graph.move_to_subcluster(root, a, rigid)?;
//!
//! assert_eq!(graph.vertex_owner(root, ga).map(|(c, _)| c), Some(rigid));
//! assert_eq!(graph.property::<Name>(root, ga)?, "p1");
//! assert!(graph.edge_owner(root, edge).is_some());
//! # Ok::<(), clustergraph::Error>(())
//! ```

// Re-export the cluster tree API
pub use clustergraph_core::{
    AttributeKey, Cluster, ClusterGraph, GraphConfig, GraphConfigBuilder, LocalGraph, ObjectCloner,
    Property, Removed, ShareObjects, SharedObject, Visit,
};

// Built-in properties
pub use clustergraph_core::attribute::{Changed, EdgeIndex, TypeList, VertexIndex};

// Re-export core types - you'll need these for working with descriptors
pub use clustergraph_common::types::{
    ClusterId, GlobalEdge, GlobalVertex, IdGenerator, LocalEdge, LocalVertex,
};
pub use clustergraph_common::utils::error::{ClusterError, Error, Result};
