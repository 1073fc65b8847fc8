//! Creating, navigating, and tearing down clusters.

use super::{ClusterGraph, Removed};
use crate::attribute::Changed;
use clustergraph_common::types::{ClusterId, GlobalEdge, GlobalVertex, LocalVertex};
use clustergraph_common::utils::error::{ClusterError, Error, Result};
use clustergraph_common::utils::hash::FxHashSet;

impl ClusterGraph {
    // === Navigation ===

    /// The root cluster of this tree.
    #[must_use]
    pub fn root(&self) -> ClusterId {
        self.root
    }

    /// Returns true if `cluster` is the root.
    #[must_use]
    pub fn is_root(&self, cluster: ClusterId) -> bool {
        cluster == self.root
    }

    /// Parent of a cluster, `None` for the root or a dead cluster.
    #[must_use]
    pub fn parent(&self, cluster: ClusterId) -> Option<ClusterId> {
        self.clusters.get(&cluster).and_then(|c| c.parent)
    }

    /// Returns true if `ancestor` lies on the path from `cluster` to the root,
    /// `cluster` itself included.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ClusterId, cluster: ClusterId) -> bool {
        let mut current = Some(cluster);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Returns true if `v` is a cluster vertex of `cluster`.
    #[must_use]
    pub fn is_cluster(&self, cluster: ClusterId, v: LocalVertex) -> bool {
        self.clusters
            .get(&cluster)
            .is_some_and(|c| c.children.contains_key(&v))
    }

    /// The child cluster represented by vertex `v` of `cluster`.
    #[must_use]
    pub fn cluster_of(&self, cluster: ClusterId, v: LocalVertex) -> Option<ClusterId> {
        self.clusters
            .get(&cluster)
            .and_then(|c| c.children.get(&v).copied())
    }

    /// The vertex representing `child` in its parent's storage.
    #[must_use]
    pub fn cluster_vertex(&self, child: ClusterId) -> Option<LocalVertex> {
        self.clusters.get(&child).and_then(|c| c.vertex)
    }

    /// Direct children of a cluster as `(cluster vertex, child)` pairs.
    pub fn clusters(&self, cluster: ClusterId) -> impl Iterator<Item = (LocalVertex, ClusterId)> + '_ {
        self.clusters
            .get(&cluster)
            .into_iter()
            .flat_map(|c| c.children())
    }

    /// Number of direct children of a cluster.
    #[must_use]
    pub fn num_clusters(&self, cluster: ClusterId) -> usize {
        self.clusters.get(&cluster).map_or(0, |c| c.children.len())
    }

    // === Change Tracking ===

    /// Returns the changed flag of a cluster.
    #[must_use]
    pub fn is_changed(&self, cluster: ClusterId) -> bool {
        self.cluster_property::<Changed>(cluster)
            .copied()
            .unwrap_or(false)
    }

    /// Marks a cluster as changed, unless copy mode is active.
    pub fn set_changed(&mut self, cluster: ClusterId) -> Result<()> {
        self.get(cluster)?;
        self.mark_changed(cluster);
        Ok(())
    }

    /// Clears the changed flag of a cluster.
    pub fn reset_changed(&mut self, cluster: ClusterId) -> Result<()> {
        self.set_cluster_property::<Changed>(cluster, false)
    }

    /// Enables or disables copy mode, which suppresses change marking.
    pub fn set_copy_mode(&mut self, cluster: ClusterId, on: bool) -> Result<()> {
        self.get_mut(cluster)?.copy_mode = on;
        Ok(())
    }

    /// Returns true if copy mode is active on a cluster.
    #[must_use]
    pub fn is_copy_mode(&self, cluster: ClusterId) -> bool {
        self.clusters.get(&cluster).is_some_and(|c| c.copy_mode)
    }

    // === Structure ===

    /// Creates an empty child of `parent`.
    ///
    /// The child shares this tree's id generator and is represented in the
    /// parent by a new cluster vertex with its own global id.
    pub fn create_subcluster(&mut self, parent: ClusterId) -> Result<(ClusterId, LocalVertex)> {
        self.get(parent)?;
        let global = GlobalVertex::new(self.ids.generate());
        let bundle = self.vertex_bundle(global);
        let v = self.get_mut(parent)?.storage.add_vertex(bundle);
        let child = self.alloc_cluster(Some(parent), Some(v));
        if let Some(p) = self.clusters.get_mut(&parent) {
            p.children.insert(v, child);
        }
        self.mark_changed(parent);

        tracing::debug!("created cluster {} under {} at {}", child, parent, v);
        Ok((child, v))
    }

    /// Removes a child cluster with everything it owns.
    ///
    /// `on_removed` sees, depth first, every global edge and ordinary vertex
    /// inside `child`, each nested cluster after its content, then `child`
    /// itself, then every global edge that connected `child` to the rest of
    /// the tree.
    pub fn remove_cluster(
        &mut self,
        parent: ClusterId,
        child: ClusterId,
        mut on_removed: impl FnMut(Removed),
    ) -> Result<()> {
        let v = self.child_vertex(parent, child)?;
        self.detach_cluster(parent, v, child, &mut on_removed);
        Ok(())
    }

    /// Removes the child cluster represented by vertex `v` of `parent`.
    pub fn remove_cluster_at(
        &mut self,
        parent: ClusterId,
        v: LocalVertex,
        on_removed: impl FnMut(Removed),
    ) -> Result<()> {
        let child = self
            .cluster_of(parent, v)
            .ok_or(Error::InvalidLocalVertex(v))?;
        self.remove_cluster(parent, child, on_removed)
    }

    /// Removes every child cluster of `cluster`.
    pub fn clear_clusters(&mut self, cluster: ClusterId, mut on_removed: impl FnMut(Removed)) -> Result<()> {
        let children: Vec<(LocalVertex, ClusterId)> = self.get(cluster)?.children().collect();
        for (v, child) in children {
            self.detach_cluster(cluster, v, child, &mut on_removed);
        }
        Ok(())
    }

    // === Internal Helpers ===

    /// Validates the parent/child relation and returns the child's vertex.
    pub(super) fn child_vertex(&self, parent: ClusterId, child: ClusterId) -> Result<LocalVertex> {
        let p = self.get(parent)?;
        let c = self.get(child)?;
        let not_child = Error::NotASubcluster { parent, child };
        if c.parent != Some(parent) {
            return Err(not_child);
        }
        let v = c.vertex.ok_or(not_child)?;
        if p.children.get(&v) != Some(&child) || !p.storage.contains_vertex(v) {
            tracing::warn!("cluster map of {} disagrees with vertex {}", parent, v);
            return Err(ClusterError::MapMismatch(v).into());
        }
        Ok(v)
    }

    /// Detaches `child` (vertex `v` of `parent`) and drops its whole subtree.
    pub(super) fn detach_cluster(
        &mut self,
        parent: ClusterId,
        v: LocalVertex,
        child: ClusterId,
        on_removed: &mut dyn FnMut(Removed),
    ) {
        let mut inside = self.subtree_globals(child);
        if let Some(global) = self.global_vertex(parent, v) {
            inside.insert(global);
        }

        self.teardown(child, on_removed);

        if let Some(p) = self.clusters.get_mut(&parent) {
            for e in p.storage.incident_edges(v) {
                if let Some(bundle) = p.storage.remove_edge(e) {
                    for single in bundle.singles {
                        on_removed(Removed::Edge(single.global));
                    }
                }
            }
            p.storage.remove_vertex(v);
            p.children.shift_remove(&v);
        }
        self.purge_above(parent, &|e| inside.contains(&e.source) || inside.contains(&e.target), on_removed);
        self.mark_changed(parent);

        tracing::debug!("removed cluster {} from {}", child, parent);
    }

    /// Drops a cluster and its descendants from the arena, reporting content.
    pub(super) fn teardown(&mut self, cluster: ClusterId, on_removed: &mut dyn FnMut(Removed)) {
        let children: Vec<ClusterId> = match self.clusters.get(&cluster) {
            Some(c) => c.children.values().copied().collect(),
            None => return,
        };
        for child in children {
            self.teardown(child, on_removed);
        }

        let Some(removed) = self.clusters.remove(&cluster) else {
            return;
        };
        let storage = &removed.storage;
        for e in storage.edges() {
            if let Some(bundle) = storage.edge(e) {
                for single in &bundle.singles {
                    on_removed(Removed::Edge(single.global));
                }
            }
        }
        for v in storage.vertices() {
            if removed.children.contains_key(&v) {
                continue;
            }
            if let Some(bundle) = storage.vertex(v) {
                on_removed(Removed::Vertex(bundle.global));
            }
        }
        on_removed(Removed::Cluster(cluster));
    }

    /// Every global vertex stored in `cluster` or below, cluster vertices included.
    pub(super) fn subtree_globals(&self, cluster: ClusterId) -> FxHashSet<GlobalVertex> {
        let mut globals = FxHashSet::default();
        let mut stack = vec![cluster];
        while let Some(c) = stack.pop() {
            let Some(c) = self.clusters.get(&c) else {
                continue;
            };
            for v in c.storage.vertices() {
                if let Some(bundle) = c.storage.vertex(v) {
                    globals.insert(bundle.global);
                }
            }
            stack.extend(c.children.values().copied());
        }
        globals
    }

    /// Removes global edges matching `pred` from every ancestor level of `cluster`.
    ///
    /// At each ancestor, only edges incident to the vertex representing the
    /// path down to `cluster` can hold such edges.
    pub(super) fn purge_above(
        &mut self,
        cluster: ClusterId,
        pred: &dyn Fn(&GlobalEdge) -> bool,
        on_removed: &mut dyn FnMut(Removed),
    ) {
        let mut current = cluster;
        while let Some((parent, v)) = self
            .clusters
            .get(&current)
            .and_then(|c| c.parent.zip(c.vertex))
        {
            let mut touched = false;
            if let Some(p) = self.clusters.get_mut(&parent) {
                for e in p.storage.incident_edges(v) {
                    let Some(bundle) = p.storage.edge_mut(e) else {
                        continue;
                    };
                    let taken = bundle.take_where(|g| pred(g));
                    if taken.is_empty() {
                        continue;
                    }
                    touched = true;
                    let now_empty = bundle.singles.is_empty();
                    for single in taken {
                        on_removed(Removed::Edge(single.global));
                    }
                    if now_empty {
                        p.storage.remove_edge(e);
                    }
                }
            }
            if touched {
                self.mark_changed(parent);
            }
            current = parent;
        }
    }
}
