//! Addressing of attribute bundles.

use clustergraph_common::types::{GlobalEdge, GlobalVertex, LocalEdge, LocalVertex};

/// Any descriptor that names an attribute bundle.
///
/// Global descriptors are resolved within the addressed cluster's subtree.
/// A [`LocalEdge`] addresses the local edge's properties and the objects of
/// its *first* aggregated global edge; a [`GlobalEdge`] addresses the
/// properties of the local edge holding it and its own object slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    /// A vertex of the addressed cluster.
    LocalVertex(LocalVertex),
    /// An edge of the addressed cluster.
    LocalEdge(LocalEdge),
    /// A vertex anywhere below the addressed cluster.
    GlobalVertex(GlobalVertex),
    /// An edge anywhere below the addressed cluster.
    GlobalEdge(GlobalEdge),
}

impl AttributeKey {
    /// Returns true if the key addresses a vertex.
    #[must_use]
    pub fn is_vertex(&self) -> bool {
        matches!(self, Self::LocalVertex(_) | Self::GlobalVertex(_))
    }
}

impl From<LocalVertex> for AttributeKey {
    fn from(v: LocalVertex) -> Self {
        Self::LocalVertex(v)
    }
}

impl From<LocalEdge> for AttributeKey {
    fn from(e: LocalEdge) -> Self {
        Self::LocalEdge(e)
    }
}

impl From<GlobalVertex> for AttributeKey {
    fn from(v: GlobalVertex) -> Self {
        Self::GlobalVertex(v)
    }
}

impl From<GlobalEdge> for AttributeKey {
    fn from(e: GlobalEdge) -> Self {
        Self::GlobalEdge(e)
    }
}
