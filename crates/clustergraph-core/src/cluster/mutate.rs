//! Adding and removing vertices and edges.

use super::{ClusterGraph, Removed};
use crate::attribute::PropertySlots;
use crate::graph::{EdgeBundle, EdgeSingle, VertexBundle};
use clustergraph_common::types::{ClusterId, GlobalEdge, GlobalVertex, LocalEdge, LocalVertex};
use clustergraph_common::utils::error::{Error, Result};

impl ClusterGraph {
    // === Vertex Operations ===

    /// Adds a vertex with a freshly generated global id.
    ///
    /// All properties start at their defaults and all object slots are empty.
    pub fn add_vertex(&mut self, cluster: ClusterId) -> Result<(LocalVertex, GlobalVertex)> {
        self.get(cluster)?;
        let global = GlobalVertex::new(self.ids.generate());
        let bundle = self.vertex_bundle(global);
        let v = self.get_mut(cluster)?.storage.add_vertex(bundle);
        self.mark_changed(cluster);

        tracing::trace!("added vertex {} as {} in {}", global, v, cluster);
        Ok((v, global))
    }

    /// Adds a vertex with a caller-chosen global id.
    ///
    /// The id generator is fast-forwarded past `global`. If `global` already
    /// exists in the cluster's subtree, its (representative) local vertex is
    /// returned and nothing changes.
    pub fn add_vertex_with_id(
        &mut self,
        cluster: ClusterId,
        global: GlobalVertex,
    ) -> Result<(LocalVertex, GlobalVertex)> {
        if !global.is_valid() {
            return Err(Error::InvalidGlobalId(global.as_u64()));
        }
        self.get(cluster)?;
        if let Some(v) = self.local_vertex(cluster, global, true) {
            return Ok((v, global));
        }

        let bundle = self.vertex_bundle(global);
        let v = self.get_mut(cluster)?.storage.add_vertex(bundle);
        self.ids.set_count(global.as_u64());
        self.mark_changed(cluster);

        tracing::trace!("added vertex {} as {} in {}", global, v, cluster);
        Ok((v, global))
    }

    /// Removes a local vertex.
    ///
    /// Every global edge of the vertex, wherever in the tree it is stored, is
    /// reported to `on_removed` and dropped before the vertex itself goes.
    /// A cluster vertex removes its whole cluster, as
    /// [`remove_cluster`](Self::remove_cluster) does.
    pub fn remove_vertex(
        &mut self,
        cluster: ClusterId,
        v: LocalVertex,
        mut on_removed: impl FnMut(Removed),
    ) -> Result<()> {
        self.require_vertex(cluster, v)?;
        if let Some(child) = self.cluster_of(cluster, v) {
            self.detach_cluster(cluster, v, child, &mut on_removed);
        } else {
            self.drop_vertex(cluster, v, &mut on_removed);
        }
        Ok(())
    }

    /// Removes a global vertex stored anywhere in the cluster's subtree.
    ///
    /// Every cluster between the owning one and `cluster` is marked changed.
    pub fn remove_vertex_global(
        &mut self,
        cluster: ClusterId,
        global: GlobalVertex,
        mut on_removed: impl FnMut(Removed),
    ) -> Result<()> {
        let (owner, v) = self
            .vertex_owner(cluster, global)
            .ok_or(Error::VertexNotFound(global))?;
        if let Some(child) = self.cluster_of(owner, v) {
            self.detach_cluster(owner, v, child, &mut on_removed);
        } else {
            self.drop_vertex(owner, v, &mut on_removed);
        }
        self.mark_changed_upwards(owner, cluster);
        Ok(())
    }

    // === Edge Operations ===

    /// Connects two local vertices of a cluster with a new global edge.
    ///
    /// If a local edge already connects them, the global edge is aggregated
    /// onto it; otherwise a new local edge is created. Cluster vertices are
    /// rejected with [`Error::ClusterEndpoint`].
    pub fn add_edge(
        &mut self,
        cluster: ClusterId,
        a: LocalVertex,
        b: LocalVertex,
    ) -> Result<(LocalEdge, GlobalEdge)> {
        if a == b {
            return Err(Error::SelfLoop);
        }
        let c = self.require_vertex(cluster, a)?;
        let ga = c.storage.vertex(a).map(|bundle| bundle.global);
        let gb = c.storage.vertex(b).map(|bundle| bundle.global);
        let (Some(ga), Some(gb)) = (ga, gb) else {
            return Err(Error::InvalidLocalVertex(b));
        };
        if self.is_cluster(cluster, a) {
            return Err(Error::ClusterEndpoint(ga));
        }
        if self.is_cluster(cluster, b) {
            return Err(Error::ClusterEndpoint(gb));
        }

        let global = GlobalEdge::new(ga, gb, self.ids.generate());
        let single = self.edge_single(global);
        let e = self.attach(cluster, a, b, single)?;
        self.mark_changed(cluster);

        tracing::trace!("added edge {} as {} in {}", global, e, cluster);
        Ok((e, global))
    }

    /// Connects two global vertices of the cluster's subtree.
    ///
    /// Each endpoint is resolved to its representative local vertex. When
    /// the representatives differ, the edge is stored in `cluster` and the
    /// returned scope flag is `true`. When both endpoints route through the
    /// same child cluster, resolution is repeated once inside that child and
    /// the edge is stored there, with scope `false`; the returned local edge
    /// is then only valid in that child. Endpoints that still coincide fail
    /// with [`Error::SelfLoop`], and the id of a cluster vertex fails with
    /// [`Error::ClusterEndpoint`].
    pub fn add_edge_global(
        &mut self,
        cluster: ClusterId,
        source: GlobalVertex,
        target: GlobalVertex,
    ) -> Result<(LocalEdge, GlobalEdge, bool)> {
        self.get(cluster)?;
        let a = self
            .local_vertex(cluster, source, true)
            .ok_or(Error::VertexNotFound(source))?;
        let b = self
            .local_vertex(cluster, target, true)
            .ok_or(Error::VertexNotFound(target))?;
        for global in [source, target] {
            if self.represents_cluster(cluster, global) {
                return Err(Error::ClusterEndpoint(global));
            }
        }

        let (holder, a, b, scope) = if a != b {
            (cluster, a, b, true)
        } else {
            let child = self.cluster_of(cluster, a).ok_or(Error::SelfLoop)?;
            let a = self
                .local_vertex(child, source, true)
                .ok_or(Error::VertexNotFound(source))?;
            let b = self
                .local_vertex(child, target, true)
                .ok_or(Error::VertexNotFound(target))?;
            if a == b {
                return Err(Error::SelfLoop);
            }
            (child, a, b, false)
        };

        let global = GlobalEdge::new(source, target, self.ids.generate());
        let single = self.edge_single(global);
        let e = self.attach(holder, a, b, single)?;
        self.mark_changed(holder);

        tracing::trace!("added edge {} as {} in {}", global, e, holder);
        Ok((e, global, scope))
    }

    /// Removes one global edge stored anywhere in the cluster's subtree.
    ///
    /// The local edge holding it is removed only if it aggregates nothing else.
    pub fn remove_edge_global(&mut self, cluster: ClusterId, global: GlobalEdge) -> Result<()> {
        let (owner, e) = self
            .edge_owner(cluster, global)
            .ok_or(Error::EdgeNotFound(global))?;
        let c = self.get_mut(owner)?;
        let Some(bundle) = c.storage.edge_mut(e) else {
            return Err(Error::EdgeNotFound(global));
        };
        bundle.take_where(|g| *g == global);
        if bundle.singles.is_empty() {
            c.storage.remove_edge(e);
        }
        self.mark_changed_upwards(owner, cluster);

        tracing::trace!("removed edge {} from {}", global, owner);
        Ok(())
    }

    /// Removes a local edge with every global edge it aggregates.
    pub fn remove_edge(
        &mut self,
        cluster: ClusterId,
        e: LocalEdge,
        mut on_removed: impl FnMut(Removed),
    ) -> Result<()> {
        let bundle = self
            .get_mut(cluster)?
            .storage
            .remove_edge(e)
            .ok_or(Error::InvalidLocalEdge(e))?;
        for single in bundle.singles {
            on_removed(Removed::Edge(single.global));
        }
        self.mark_changed(cluster);
        Ok(())
    }

    // === Internal Helpers ===

    pub(super) fn vertex_bundle(&self, global: GlobalVertex) -> VertexBundle {
        VertexBundle::new(
            global,
            self.config.vertex_properties().new_properties(),
            self.config.objects().new_objects(),
        )
    }

    pub(super) fn edge_single(&self, global: GlobalEdge) -> EdgeSingle {
        EdgeSingle::new(global, self.config.objects().new_objects())
    }

    /// Appends `single` to the local edge between `a` and `b`, creating it if needed.
    pub(super) fn attach(
        &mut self,
        cluster: ClusterId,
        a: LocalVertex,
        b: LocalVertex,
        single: EdgeSingle,
    ) -> Result<LocalEdge> {
        self.attach_all(cluster, a, b, None, std::iter::once(single))
    }

    /// Appends `singles` to the local edge between `a` and `b`.
    ///
    /// A newly created local edge takes `properties`, or defaults if `None`.
    pub(super) fn attach_all(
        &mut self,
        cluster: ClusterId,
        a: LocalVertex,
        b: LocalVertex,
        properties: Option<PropertySlots>,
        singles: impl IntoIterator<Item = EdgeSingle>,
    ) -> Result<LocalEdge> {
        let existing = self.get(cluster)?.storage.find_edge(a, b);
        let e = match existing {
            Some(e) => e,
            None => {
                let properties =
                    properties.unwrap_or_else(|| self.config.edge_properties().new_properties());
                let c = self.get_mut(cluster)?;
                if !c.storage.contains_vertex(a) {
                    return Err(Error::InvalidLocalVertex(a));
                }
                if !c.storage.contains_vertex(b) {
                    return Err(Error::InvalidLocalVertex(b));
                }
                c.storage
                    .add_edge(a, b, EdgeBundle::new(properties))
                    .ok_or(Error::InvalidLocalVertex(a))?
            }
        };
        let c = self.get_mut(cluster)?;
        if let Some(bundle) = c.storage.edge_mut(e) {
            bundle.singles.extend(singles);
        }
        Ok(e)
    }

    /// Returns true if `global` is the vertex of a subcluster within `cluster`'s subtree.
    fn represents_cluster(&self, cluster: ClusterId, global: GlobalVertex) -> bool {
        self.vertex_owner(cluster, global)
            .is_some_and(|(owner, v)| self.is_cluster(owner, v))
    }

    /// Removes an ordinary vertex and all its global edges.
    fn drop_vertex(&mut self, cluster: ClusterId, v: LocalVertex, on_removed: &mut dyn FnMut(Removed)) {
        let Some(c) = self.clusters.get_mut(&cluster) else {
            return;
        };
        let Some(global) = c.storage.vertex(v).map(|bundle| bundle.global) else {
            return;
        };
        for e in c.storage.incident_edges(v) {
            if let Some(bundle) = c.storage.remove_edge(e) {
                for single in bundle.singles {
                    on_removed(Removed::Edge(single.global));
                }
            }
        }
        c.storage.remove_vertex(v);
        self.purge_above(cluster, &|e| e.source == global || e.target == global, on_removed);
        self.mark_changed(cluster);

        tracing::trace!("removed vertex {} from {}", global, cluster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_vertex() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();

        let (v1, g1) = graph.add_vertex(root).unwrap();
        let (v2, g2) = graph.add_vertex(root).unwrap();
        assert_ne!(v1, v2);
        assert!(g1.is_valid() && g2.is_valid());
        assert!(g1 < g2);
        assert_eq!(graph.vertex_count(root), 2);
        assert!(graph.is_changed(root));
    }

    #[test]
    fn test_add_vertex_with_id() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();

        let (v, g) = graph.add_vertex_with_id(root, GlobalVertex::new(100)).unwrap();
        assert_eq!(g, GlobalVertex::new(100));
        assert_eq!(graph.local_vertex(root, g, false), Some(v));

        // Generator moved past the explicit id
        let (_, next) = graph.add_vertex(root).unwrap();
        assert_eq!(next, GlobalVertex::new(101));

        // Existing id returns the existing vertex unchanged
        let (again, _) = graph.add_vertex_with_id(root, GlobalVertex::new(100)).unwrap();
        assert_eq!(again, v);
        assert_eq!(graph.vertex_count(root), 2);
    }

    #[test]
    fn test_add_vertex_with_reserved_id() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        assert_eq!(
            graph.add_vertex_with_id(root, GlobalVertex::new(9)),
            Err(Error::InvalidGlobalId(9))
        );
        assert_eq!(graph.vertex_count(root), 0);
    }

    #[test]
    fn test_add_edge_aggregates_parallel_edges() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (a, ga) = graph.add_vertex(root).unwrap();
        let (b, gb) = graph.add_vertex(root).unwrap();

        let (e1, g1) = graph.add_edge(root, a, b).unwrap();
        let (e2, g2) = graph.add_edge(root, a, b).unwrap();

        assert_eq!(e1, e2);
        assert_ne!(g1, g2);
        assert_eq!(graph.edge_count(root), 1);
        assert_eq!(graph.global_edge_count(root, e1), 2);
        assert_eq!((g1.source, g1.target), (ga, gb));
    }

    #[test]
    fn test_add_edge_rejects_invalid() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (a, _) = graph.add_vertex(root).unwrap();
        let (b, _) = graph.add_vertex(root).unwrap();
        graph.remove_vertex(root, b, |_| {}).unwrap();

        assert_eq!(graph.add_edge(root, a, a), Err(Error::SelfLoop));
        assert_eq!(graph.add_edge(root, a, b), Err(Error::InvalidLocalVertex(b)));
        assert_eq!(graph.edge_count(root), 0);
    }

    #[test]
    fn test_add_edge_global_scope() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (child, cv) = graph.create_subcluster(root).unwrap();
        let (_, ga) = graph.add_vertex(child).unwrap();
        let (_, gb) = graph.add_vertex(child).unwrap();
        let (r, gr) = graph.add_vertex(root).unwrap();

        // Crossing the cluster boundary: stored in root
        let (e, _, scope) = graph.add_edge_global(root, ga, gr).unwrap();
        assert!(scope);
        assert_eq!(graph.edge_endpoints(root, e).map(|(x, y)| x == cv || y == cv), Some(true));
        assert_eq!(graph.edge(root, cv, r), Some(e));

        // Both inside the child: stored one level down
        let (e, g, scope) = graph.add_edge_global(root, ga, gb).unwrap();
        assert!(!scope);
        assert_eq!(graph.edge_owner(root, g), Some((child, e)));
    }

    #[test]
    fn test_add_edge_global_failures() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (_, g) = graph.add_vertex(root).unwrap();
        let missing = GlobalVertex::new(999);

        assert_eq!(graph.add_edge_global(root, g, g), Err(Error::SelfLoop));
        assert_eq!(graph.add_edge_global(root, g, missing), Err(Error::VertexNotFound(missing)));

        // Two levels of collapse are rejected
        let (a, _) = graph.create_subcluster(root).unwrap();
        let (b, _) = graph.create_subcluster(a).unwrap();
        let (_, x) = graph.add_vertex(b).unwrap();
        let (_, y) = graph.add_vertex(b).unwrap();
        assert_eq!(graph.add_edge_global(root, x, y), Err(Error::SelfLoop));
        assert_eq!(graph.edge_count(b), 0);
    }

    #[test]
    fn test_stale_handle_is_rejected_after_reuse() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (a, _) = graph.add_vertex(root).unwrap();
        let (b, _) = graph.add_vertex(root).unwrap();
        graph.remove_vertex(root, b, |_| {}).unwrap();
        let (c, gc) = graph.add_vertex(root).unwrap();

        assert_ne!(b, c);
        assert_eq!(graph.add_edge(root, a, b), Err(Error::InvalidLocalVertex(b)));
        assert_eq!(
            graph.property::<crate::attribute::VertexIndex>(root, b),
            Err(Error::InvalidLocalVertex(b))
        );
        assert_eq!(graph.global_vertex(root, b), None);
        assert_eq!(graph.global_vertex(root, c), Some(gc));
        assert_eq!(graph.edge_count(root), 0);
    }

    #[test]
    fn test_remove_vertex_reports_edges() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (a, _) = graph.add_vertex(root).unwrap();
        let (b, _) = graph.add_vertex(root).unwrap();
        let (c, _) = graph.add_vertex(root).unwrap();
        let (_, g1) = graph.add_edge(root, a, b).unwrap();
        let (_, g2) = graph.add_edge(root, a, b).unwrap();
        let (_, g3) = graph.add_edge(root, a, c).unwrap();

        let mut removed = Vec::new();
        graph.remove_vertex(root, a, |r| removed.push(r)).unwrap();

        assert_eq!(removed.len(), 3);
        for g in [g1, g2, g3] {
            assert!(removed.contains(&Removed::Edge(g)));
        }
        assert_eq!(graph.vertex_count(root), 2);
        assert_eq!(graph.edge_count(root), 0);
    }

    #[test]
    fn test_remove_vertex_global_purges_ancestor_edges() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (child, cv) = graph.create_subcluster(root).unwrap();
        let (_, inner) = graph.add_vertex(child).unwrap();
        let (_, outer) = graph.add_vertex(root).unwrap();
        let (_, cross, _) = graph.add_edge_global(root, inner, outer).unwrap();

        graph.reset_changed(child).unwrap();
        graph.reset_changed(root).unwrap();

        let mut removed = Vec::new();
        graph
            .remove_vertex_global(root, inner, |r| removed.push(r))
            .unwrap();

        assert_eq!(removed, vec![Removed::Edge(cross)]);
        assert_eq!(graph.vertex_count(child), 0);
        assert!(graph.incident_edges(root, cv).is_empty());
        assert!(graph.is_changed(child));
        assert!(graph.is_changed(root));
        assert_eq!(
            graph.remove_vertex_global(root, inner, |_| {}),
            Err(Error::VertexNotFound(inner))
        );
    }

    #[test]
    fn test_remove_edge_global_keeps_remaining_aggregates() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (a, _) = graph.add_vertex(root).unwrap();
        let (b, _) = graph.add_vertex(root).unwrap();
        let (e, g1) = graph.add_edge(root, a, b).unwrap();
        let (_, g2) = graph.add_edge(root, a, b).unwrap();

        graph.remove_edge_global(root, g1).unwrap();
        assert_eq!(graph.global_edges(root, e).collect::<Vec<_>>(), vec![g2]);

        graph.remove_edge_global(root, g2).unwrap();
        assert_eq!(graph.edge_count(root), 0);
        assert_eq!(graph.remove_edge_global(root, g2), Err(Error::EdgeNotFound(g2)));
    }

    #[test]
    fn test_remove_local_edge() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (a, _) = graph.add_vertex(root).unwrap();
        let (b, _) = graph.add_vertex(root).unwrap();
        let (e, g1) = graph.add_edge(root, a, b).unwrap();
        let (_, g2) = graph.add_edge(root, a, b).unwrap();

        let mut removed = Vec::new();
        graph.remove_edge(root, e, |r| removed.push(r)).unwrap();
        assert_eq!(removed, vec![Removed::Edge(g1), Removed::Edge(g2)]);
        assert_eq!(graph.remove_edge(root, e, |_| {}), Err(Error::InvalidLocalEdge(e)));
    }

    #[test]
    fn test_removing_cluster_vertex_removes_cluster() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (child, cv) = graph.create_subcluster(root).unwrap();

        graph.remove_vertex(root, cv, |_| {}).unwrap();
        assert!(!graph.contains_cluster(child));
        assert_eq!(graph.num_clusters(root), 0);
    }
}
