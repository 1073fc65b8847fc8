//! Translation between local handles and global descriptors.
//!
//! A global vertex stored deep inside the tree is represented in every
//! ancestor cluster by the cluster vertex leading towards it. Lookups that
//! search recursively therefore answer with that representative, while the
//! `*_owner` lookups report the cluster that stores the entity directly.

use super::ClusterGraph;
use clustergraph_common::types::{ClusterId, GlobalEdge, GlobalVertex, LocalEdge, LocalVertex};

impl ClusterGraph {
    // === Vertices ===

    /// The global vertex held by a local vertex.
    #[must_use]
    pub fn global_vertex(&self, cluster: ClusterId, v: LocalVertex) -> Option<GlobalVertex> {
        self.clusters
            .get(&cluster)?
            .storage
            .vertex(v)
            .map(|bundle| bundle.global)
    }

    /// Resolves a global vertex to a local vertex of `cluster`.
    ///
    /// Searches the cluster's own vertices first. With `recursive`, also
    /// searches every subcluster; a vertex found below is answered with the
    /// cluster vertex of `cluster` on the path down to it.
    #[must_use]
    pub fn local_vertex(&self, cluster: ClusterId, global: GlobalVertex, recursive: bool) -> Option<LocalVertex> {
        let c = self.clusters.get(&cluster)?;
        if let Some(v) = Self::find_own_vertex(&c.storage, global) {
            return Some(v);
        }
        if !recursive {
            return None;
        }
        let (owner, v) = self.vertex_owner(cluster, global)?;
        self.representative(cluster, owner, v)
    }

    /// Recursive form of [`local_vertex`](Self::local_vertex).
    #[must_use]
    pub fn containing_vertex(&self, cluster: ClusterId, global: GlobalVertex) -> Option<LocalVertex> {
        self.local_vertex(cluster, global, true)
    }

    /// Finds the cluster directly storing a global vertex, searching
    /// `cluster` and its subtree, together with the local handle there.
    #[must_use]
    pub fn vertex_owner(&self, cluster: ClusterId, global: GlobalVertex) -> Option<(ClusterId, LocalVertex)> {
        let c = self.clusters.get(&cluster)?;
        if let Some(v) = Self::find_own_vertex(&c.storage, global) {
            return Some((cluster, v));
        }
        c.children
            .values()
            .find_map(|&child| self.vertex_owner(child, global))
    }

    /// Iterates over the global vertices stored directly in a cluster.
    pub fn global_vertices(&self, cluster: ClusterId) -> impl Iterator<Item = GlobalVertex> + '_ {
        self.clusters.get(&cluster).into_iter().flat_map(|c| {
            c.storage
                .vertices()
                .filter_map(move |v| c.storage.vertex(v).map(|bundle| bundle.global))
        })
    }

    /// Iterates over the local vertices of a cluster.
    pub fn vertices(&self, cluster: ClusterId) -> impl Iterator<Item = LocalVertex> + '_ {
        self.clusters
            .get(&cluster)
            .into_iter()
            .flat_map(|c| c.storage.vertices())
    }

    /// Number of local vertices of a cluster, cluster vertices included.
    #[must_use]
    pub fn vertex_count(&self, cluster: ClusterId) -> usize {
        self.clusters
            .get(&cluster)
            .map_or(0, |c| c.storage.vertex_count())
    }

    // === Edges ===

    /// The local edge of `cluster` aggregating a global edge.
    ///
    /// Only the cluster's own edges are searched; use
    /// [`edge_owner`](Self::edge_owner) for edges stored further down.
    #[must_use]
    pub fn local_edge(&self, cluster: ClusterId, global: GlobalEdge) -> Option<LocalEdge> {
        let c = self.clusters.get(&cluster)?;
        c.storage.edges().find(|&e| {
            c.storage
                .edge(e)
                .is_some_and(|bundle| bundle.position(global).is_some())
        })
    }

    /// Finds the cluster directly storing a global edge, searching `cluster`
    /// and its subtree, together with the local edge aggregating it there.
    #[must_use]
    pub fn edge_owner(&self, cluster: ClusterId, global: GlobalEdge) -> Option<(ClusterId, LocalEdge)> {
        if let Some(e) = self.local_edge(cluster, global) {
            return Some((cluster, e));
        }
        self.clusters
            .get(&cluster)?
            .children
            .values()
            .find_map(|&child| self.edge_owner(child, global))
    }

    /// The local edge connecting two local vertices, if any.
    #[must_use]
    pub fn edge(&self, cluster: ClusterId, a: LocalVertex, b: LocalVertex) -> Option<LocalEdge> {
        self.clusters.get(&cluster)?.storage.find_edge(a, b)
    }

    /// Both endpoints of a local edge.
    #[must_use]
    pub fn edge_endpoints(&self, cluster: ClusterId, e: LocalEdge) -> Option<(LocalVertex, LocalVertex)> {
        self.clusters.get(&cluster)?.storage.endpoints(e)
    }

    /// Every local edge touching `v`.
    #[must_use]
    pub fn incident_edges(&self, cluster: ClusterId, v: LocalVertex) -> Vec<LocalEdge> {
        self.clusters
            .get(&cluster)
            .map(|c| c.storage.incident_edges(v))
            .unwrap_or_default()
    }

    /// Iterates over the global edges aggregated by a local edge.
    pub fn global_edges(&self, cluster: ClusterId, e: LocalEdge) -> impl Iterator<Item = GlobalEdge> + '_ {
        self.clusters
            .get(&cluster)
            .and_then(|c| c.storage.edge(e))
            .into_iter()
            .flat_map(|bundle| bundle.globals())
    }

    /// Number of global edges aggregated by a local edge, 0 if it is not valid.
    #[must_use]
    pub fn global_edge_count(&self, cluster: ClusterId, e: LocalEdge) -> usize {
        self.clusters
            .get(&cluster)
            .and_then(|c| c.storage.edge(e))
            .map_or(0, |bundle| bundle.global_count())
    }

    /// Iterates over the local edges of a cluster.
    pub fn edges(&self, cluster: ClusterId) -> impl Iterator<Item = LocalEdge> + '_ {
        self.clusters
            .get(&cluster)
            .into_iter()
            .flat_map(|c| c.storage.edges())
    }

    /// Number of local edges of a cluster.
    #[must_use]
    pub fn edge_count(&self, cluster: ClusterId) -> usize {
        self.clusters
            .get(&cluster)
            .map_or(0, |c| c.storage.edge_count())
    }

    // === Internal Helpers ===

    fn find_own_vertex(storage: &crate::graph::LocalGraph, global: GlobalVertex) -> Option<LocalVertex> {
        storage
            .vertices()
            .find(|&v| storage.vertex(v).is_some_and(|bundle| bundle.global == global))
    }

    /// Maps vertex `v` of `owner` to its representative in `scope`.
    ///
    /// `scope` must be an ancestor of `owner` (or `owner` itself).
    pub(super) fn representative(&self, scope: ClusterId, owner: ClusterId, v: LocalVertex) -> Option<LocalVertex> {
        if owner == scope {
            return Some(v);
        }
        let mut current = owner;
        loop {
            let c = self.clusters.get(&current)?;
            let parent = c.parent?;
            if parent == scope {
                return c.vertex;
            }
            current = parent;
        }
    }
}
