//! Local graph storage.
//!
//! A thin layer over petgraph's `StableGraph`, which keeps every index valid
//! when other vertices or edges are removed. Handles are exposed as
//! [`LocalVertex`]/[`LocalEdge`] so callers never see the backing index type.
//!
//! petgraph reuses freed slots, so each slot also carries a generation that
//! is bumped on removal. A handle only resolves while its generation matches.

use super::bundle::{EdgeBundle, VertexBundle};
use clustergraph_common::types::{LocalEdge, LocalVertex};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;

#[inline]
fn generation(generations: &[u32], index: usize) -> u32 {
    generations.get(index).copied().unwrap_or(0)
}

fn bump(generations: &mut Vec<u32>, index: usize) {
    if generations.len() <= index {
        generations.resize(index + 1, 0);
    }
    generations[index] = generations[index].wrapping_add(1);
}

/// Undirected multigraph storage of one cluster.
///
/// Read access is public so traversal algorithms can walk a cluster; all
/// structural mutation goes through the cluster tree.
#[derive(Debug, Clone, Default)]
pub struct LocalGraph {
    graph: StableUnGraph<VertexBundle, EdgeBundle>,
    vertex_generations: Vec<u32>,
    edge_generations: Vec<u32>,
}

impl LocalGraph {
    /// Creates empty storage with room for the given number of entities.
    #[must_use]
    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            graph: StableUnGraph::with_capacity(vertices, edges),
            vertex_generations: Vec::with_capacity(vertices),
            edge_generations: Vec::with_capacity(edges),
        }
    }

    // === Handle Translation ===

    fn vertex_handle(&self, n: NodeIndex) -> LocalVertex {
        LocalVertex::new(n.index() as u32, generation(&self.vertex_generations, n.index()))
    }

    fn edge_handle(&self, e: EdgeIndex) -> LocalEdge {
        LocalEdge::new(e.index() as u32, generation(&self.edge_generations, e.index()))
    }

    /// The backing index of a live vertex handle.
    fn node(&self, v: LocalVertex) -> Option<NodeIndex> {
        let n = NodeIndex::new(v.index());
        (self.graph.contains_node(n) && generation(&self.vertex_generations, v.index()) == v.generation())
            .then_some(n)
    }

    /// The backing index of a live edge handle.
    fn edge_index(&self, e: LocalEdge) -> Option<EdgeIndex> {
        let ix = EdgeIndex::new(e.index());
        (self.graph.edge_weight(ix).is_some() && generation(&self.edge_generations, e.index()) == e.generation())
            .then_some(ix)
    }

    // === Vertex Operations ===

    pub(crate) fn add_vertex(&mut self, bundle: VertexBundle) -> LocalVertex {
        let n = self.graph.add_node(bundle);
        self.vertex_handle(n)
    }

    /// Removes a vertex and, with it, every incident edge.
    pub(crate) fn remove_vertex(&mut self, v: LocalVertex) -> Option<VertexBundle> {
        let n = self.node(v)?;
        let incident: Vec<usize> = self.graph.edges(n).map(|e| e.id().index()).collect();
        for index in incident {
            bump(&mut self.edge_generations, index);
        }
        bump(&mut self.vertex_generations, n.index());
        self.graph.remove_node(n)
    }

    /// Returns true if `v` is a live vertex of this storage.
    #[must_use]
    pub fn contains_vertex(&self, v: LocalVertex) -> bool {
        self.node(v).is_some()
    }

    /// Returns the bundle of a vertex.
    #[must_use]
    pub fn vertex(&self, v: LocalVertex) -> Option<&VertexBundle> {
        self.graph.node_weight(self.node(v)?)
    }

    pub(crate) fn vertex_mut(&mut self, v: LocalVertex) -> Option<&mut VertexBundle> {
        let n = self.node(v)?;
        self.graph.node_weight_mut(n)
    }

    /// Iterates over all vertices in storage order.
    pub fn vertices(&self) -> impl Iterator<Item = LocalVertex> + '_ {
        self.graph.node_indices().map(|n| self.vertex_handle(n))
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    // === Edge Operations ===

    /// Connects two live vertices. Returns `None` if either handle is stale.
    pub(crate) fn add_edge(&mut self, a: LocalVertex, b: LocalVertex, bundle: EdgeBundle) -> Option<LocalEdge> {
        let (a, b) = (self.node(a)?, self.node(b)?);
        let e = self.graph.add_edge(a, b, bundle);
        Some(self.edge_handle(e))
    }

    pub(crate) fn remove_edge(&mut self, e: LocalEdge) -> Option<EdgeBundle> {
        let ix = self.edge_index(e)?;
        bump(&mut self.edge_generations, ix.index());
        self.graph.remove_edge(ix)
    }

    /// Returns true if `e` is a live edge of this storage.
    #[must_use]
    pub fn contains_edge(&self, e: LocalEdge) -> bool {
        self.edge_index(e).is_some()
    }

    /// Returns the edge connecting `a` and `b`, in either direction.
    #[must_use]
    pub fn find_edge(&self, a: LocalVertex, b: LocalVertex) -> Option<LocalEdge> {
        let (a, b) = (self.node(a)?, self.node(b)?);
        self.graph.find_edge(a, b).map(|e| self.edge_handle(e))
    }

    /// Returns the bundle of an edge.
    #[must_use]
    pub fn edge(&self, e: LocalEdge) -> Option<&EdgeBundle> {
        self.graph.edge_weight(self.edge_index(e)?)
    }

    pub(crate) fn edge_mut(&mut self, e: LocalEdge) -> Option<&mut EdgeBundle> {
        let ix = self.edge_index(e)?;
        self.graph.edge_weight_mut(ix)
    }

    /// Returns both endpoints of an edge.
    #[must_use]
    pub fn endpoints(&self, e: LocalEdge) -> Option<(LocalVertex, LocalVertex)> {
        self.graph
            .edge_endpoints(self.edge_index(e)?)
            .map(|(a, b)| (self.vertex_handle(a), self.vertex_handle(b)))
    }

    /// Returns the endpoint of `e` opposite to `v`.
    #[must_use]
    pub fn opposite(&self, e: LocalEdge, v: LocalVertex) -> Option<LocalVertex> {
        let (a, b) = self.endpoints(e)?;
        if a == v {
            Some(b)
        } else if b == v {
            Some(a)
        } else {
            None
        }
    }

    /// Returns every edge touching `v`.
    #[must_use]
    pub fn incident_edges(&self, v: LocalVertex) -> Vec<LocalEdge> {
        let Some(n) = self.node(v) else {
            return Vec::new();
        };
        self.graph.edges(n).map(|e| self.edge_handle(e.id())).collect()
    }

    /// Iterates over all edges in storage order.
    pub fn edges(&self) -> impl Iterator<Item = LocalEdge> + '_ {
        self.graph.edge_indices().map(|e| self.edge_handle(e))
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Removes everything. Every handle handed out so far goes stale.
    pub(crate) fn clear(&mut self) {
        for index in self.graph.node_indices().map(|n| n.index()).collect::<Vec<_>>() {
            bump(&mut self.vertex_generations, index);
        }
        for index in self.graph.edge_indices().map(|e| e.index()).collect::<Vec<_>>() {
            bump(&mut self.edge_generations, index);
        }
        self.graph.clear();
    }
}
