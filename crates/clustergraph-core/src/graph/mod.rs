//! Per-cluster graph storage.
//!
//! - [`LocalGraph`] - undirected multigraph whose handles survive unrelated
//!   insertions and removals
//! - [`VertexBundle`], [`EdgeBundle`], [`EdgeSingle`] - data attached to local
//!   vertices and edges

mod bundle;
mod local;

pub use bundle::{EdgeBundle, EdgeSingle, VertexBundle};
pub use local::LocalGraph;
