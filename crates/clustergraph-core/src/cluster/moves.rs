//! Moving vertices between a cluster and its neighbours in the tree.
//!
//! A move keeps every global descriptor intact. Only local handles change:
//! the moved vertex gets a new handle in its destination, and each global
//! edge is re-homed at the lowest cluster in which its endpoints are distinct.

use super::ClusterGraph;
use crate::attribute::PropertySlots;
use crate::graph::{EdgeBundle, EdgeSingle};
use clustergraph_common::types::{ClusterId, GlobalEdge, GlobalVertex, LocalVertex};
use clustergraph_common::utils::error::{ClusterError, Error, Result};
use clustergraph_common::utils::hash::{FxHashMap, FxHashSet};

impl ClusterGraph {
    /// Moves vertex `v` of `cluster` into the direct child `child`.
    ///
    /// Edges from `v` to other vertices of `cluster` now attach to the
    /// child's cluster vertex. Edges between `v` and the child's content
    /// move into the child. Moving a cluster vertex moves its whole subtree.
    /// Returns the vertex's handle inside `child`.
    ///
    /// On `Err` the tree is left unchanged.
    pub fn move_to_subcluster(
        &mut self,
        cluster: ClusterId,
        v: LocalVertex,
        child: ClusterId,
    ) -> Result<LocalVertex> {
        let cv = self.child_vertex(cluster, child)?;
        self.require_vertex(cluster, v)?;
        if v == cv {
            return Err(Error::InvalidLocalVertex(v));
        }
        let moving = self.moving_globals(cluster, v);
        let targets = self.inward_targets(cluster, v, cv, child, &moving)?;

        let c = self.get_mut(cluster)?;
        let mut outward: Vec<(LocalVertex, EdgeBundle)> = Vec::new();
        let mut inward: Vec<(PropertySlots, EdgeSingle)> = Vec::new();
        for e in c.storage.incident_edges(v) {
            let Some(w) = c.storage.opposite(e, v) else {
                continue;
            };
            let Some(mut bundle) = c.storage.remove_edge(e) else {
                continue;
            };
            if w == cv {
                let singles = std::mem::take(&mut bundle.singles);
                inward.extend(singles.into_iter().map(|single| (bundle.properties.clone(), single)));
            } else {
                outward.push((w, bundle));
            }
        }
        let bundle = c.storage.remove_vertex(v).ok_or(Error::InvalidLocalVertex(v))?;
        let nested = c.children.shift_remove(&v);

        for (w, bundle) in outward {
            self.attach_all(cluster, w, cv, Some(bundle.properties), bundle.singles)?;
        }

        let nv = self.get_mut(child)?.storage.add_vertex(bundle);
        if let Some(nested) = nested {
            self.reparent(nested, child, nv)?;
        }

        for (properties, single) in inward {
            let global = single.global;
            let w = *targets
                .get(&global)
                .ok_or(ClusterError::UnresolvedEdge(global))?;
            self.attach_all(child, nv, w, Some(properties), [single])?;
        }

        self.mark_changed(cluster);
        self.mark_changed(child);

        tracing::trace!("moved {} of {} into {} as {}", v, cluster, child, nv);
        Ok(nv)
    }

    /// Moves vertex `v` into the child represented by `cluster_vertex`.
    pub fn move_to_subcluster_at(
        &mut self,
        cluster: ClusterId,
        v: LocalVertex,
        cluster_vertex: LocalVertex,
    ) -> Result<LocalVertex> {
        let child = self
            .cluster_of(cluster, cluster_vertex)
            .ok_or(Error::InvalidLocalVertex(cluster_vertex))?;
        self.move_to_subcluster(cluster, v, child)
    }

    /// Moves vertex `v` of `cluster` up into the parent cluster.
    ///
    /// Edges from `v` to the rest of `cluster` now attach, in the parent, to
    /// the cluster vertex of `cluster`. Edges that reached `v` from outside
    /// through that cluster vertex now attach to `v` directly. Returns the
    /// vertex's handle in the parent.
    ///
    /// Every check runs before the first change, so on `Err` the tree is
    /// left unchanged.
    pub fn move_to_parent(&mut self, cluster: ClusterId, v: LocalVertex) -> Result<LocalVertex> {
        let c = self.require_vertex(cluster, v)?;
        let (parent, cv) = c.parent.zip(c.vertex).ok_or(Error::RootHasNoParent)?;
        if !self.clusters.contains_key(&parent) {
            tracing::warn!("cluster {} points at missing parent {}", cluster, parent);
            return Err(ClusterError::DanglingParent(cluster).into());
        }

        let moving = self.moving_globals(cluster, v);

        // Edges reaching v from outside, currently aggregated at cv
        let p = self.get_mut(parent)?;
        let mut lifted: Vec<(LocalVertex, PropertySlots, Vec<EdgeSingle>)> = Vec::new();
        for e in p.storage.incident_edges(cv) {
            let Some(w) = p.storage.opposite(e, cv) else {
                continue;
            };
            let Some(bundle) = p.storage.edge_mut(e) else {
                continue;
            };
            let taken = bundle.take_where(|g| moving.contains(&g.source) || moving.contains(&g.target));
            if taken.is_empty() {
                continue;
            }
            lifted.push((w, bundle.properties.clone(), taken));
            if bundle.singles.is_empty() {
                p.storage.remove_edge(e);
            }
        }

        let c = self.get_mut(cluster)?;
        let mut outward: Vec<EdgeBundle> = Vec::new();
        for e in c.storage.incident_edges(v) {
            if let Some(bundle) = c.storage.remove_edge(e) {
                outward.push(bundle);
            }
        }
        let bundle = c.storage.remove_vertex(v).ok_or(Error::InvalidLocalVertex(v))?;
        let nested = c.children.shift_remove(&v);

        let nv = self.get_mut(parent)?.storage.add_vertex(bundle);
        if let Some(nested) = nested {
            self.reparent(nested, parent, nv)?;
        }
        for bundle in outward {
            self.attach_all(parent, nv, cv, Some(bundle.properties), bundle.singles)?;
        }
        for (w, properties, singles) in lifted {
            self.attach_all(parent, nv, w, Some(properties), singles)?;
        }

        self.mark_changed(cluster);
        self.mark_changed(parent);

        tracing::trace!("moved {} of {} up into {} as {}", v, cluster, parent, nv);
        Ok(nv)
    }

    /// Global vertices that travel with `v`: its own id and, for a cluster
    /// vertex, every vertex of the represented subtree.
    fn moving_globals(&self, cluster: ClusterId, v: LocalVertex) -> FxHashSet<GlobalVertex> {
        let mut moving = match self.cluster_of(cluster, v) {
            Some(nested) => self.subtree_globals(nested),
            None => FxHashSet::default(),
        };
        if let Some(global) = self.global_vertex(cluster, v) {
            moving.insert(global);
        }
        moving
    }

    /// Resolves, inside `child`, the far endpoint of every global edge
    /// aggregated between `v` and the child's cluster vertex `cv`.
    fn inward_targets(
        &self,
        cluster: ClusterId,
        v: LocalVertex,
        cv: LocalVertex,
        child: ClusterId,
        moving: &FxHashSet<GlobalVertex>,
    ) -> Result<FxHashMap<GlobalEdge, LocalVertex>> {
        let c = self.get(cluster)?;
        let mut targets = FxHashMap::default();
        for e in c.storage.incident_edges(v) {
            if c.storage.opposite(e, v) != Some(cv) {
                continue;
            }
            let Some(bundle) = c.storage.edge(e) else {
                continue;
            };
            for global in bundle.globals() {
                let inside = match (moving.contains(&global.source), moving.contains(&global.target)) {
                    (true, false) => Some(global.target),
                    (false, true) => Some(global.source),
                    _ => None,
                };
                let Some(w) = inside.and_then(|g| self.local_vertex(child, g, true)) else {
                    tracing::warn!("edge {} has no endpoint inside {}", global, child);
                    return Err(ClusterError::UnresolvedEdge(global).into());
                };
                targets.insert(global, w);
            }
        }
        Ok(targets)
    }

    /// Hangs `nested` under `parent`, represented there by vertex `v`.
    fn reparent(&mut self, nested: ClusterId, parent: ClusterId, v: LocalVertex) -> Result<()> {
        self.get_mut(parent)?.children.insert(v, nested);
        let n = self.get_mut(nested)?;
        n.parent = Some(parent);
        n.vertex = Some(v);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_keeps_outside_edge_on_cluster_vertex() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (v1, g1) = graph.add_vertex(root).unwrap();
        let (v2, _) = graph.add_vertex(root).unwrap();
        let (_, ge) = graph.add_edge(root, v1, v2).unwrap();
        let (child, cv) = graph.create_subcluster(root).unwrap();

        let nv = graph.move_to_subcluster(root, v1, child).unwrap();

        assert_eq!(graph.global_vertex(child, nv), Some(g1));
        assert_eq!(graph.local_vertex(root, g1, false), None);
        assert_eq!(graph.local_vertex(root, g1, true), Some(cv));
        let e = graph.edge(root, cv, v2).unwrap();
        assert_eq!(graph.global_edges(root, e).collect::<Vec<_>>(), vec![ge]);
        assert_eq!(graph.edge_count(child), 0);
    }

    #[test]
    fn test_move_brings_edge_into_child() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (child, cv) = graph.create_subcluster(root).unwrap();
        let (x, _) = graph.add_vertex(child).unwrap();
        let (v, gv) = graph.add_vertex(root).unwrap();
        let gx = graph.global_vertex(child, x).unwrap();
        let (_, ge, scope) = graph.add_edge_global(root, gv, gx).unwrap();
        assert!(scope);
        assert!(graph.edge(root, v, cv).is_some());

        let nv = graph.move_to_subcluster(root, v, child).unwrap();

        assert_eq!(graph.edge_count(root), 0);
        assert_eq!(graph.edge_owner(root, ge), Some((child, graph.edge(child, nv, x).unwrap())));
    }

    #[test]
    fn test_move_cluster_vertex_into_sibling() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (a, av) = graph.create_subcluster(root).unwrap();
        let (b, _) = graph.create_subcluster(root).unwrap();
        let (_, inside) = graph.add_vertex(a).unwrap();

        let nv = graph.move_to_subcluster(root, av, b).unwrap();

        assert_eq!(graph.parent(a), Some(b));
        assert_eq!(graph.cluster_vertex(a), Some(nv));
        assert_eq!(graph.cluster_of(b, nv), Some(a));
        assert_eq!(graph.num_clusters(root), 1);
        assert_eq!(graph.vertex_owner(root, inside).map(|(c, _)| c), Some(a));
    }

    #[test]
    fn test_move_rejects_invalid_targets() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (child, cv) = graph.create_subcluster(root).unwrap();
        let (v, _) = graph.add_vertex(root).unwrap();

        assert_eq!(graph.move_to_subcluster(root, cv, child), Err(Error::InvalidLocalVertex(cv)));
        assert_eq!(graph.move_to_subcluster_at(root, cv, v), Err(Error::InvalidLocalVertex(v)));
        assert_eq!(graph.move_to_parent(root, v), Err(Error::RootHasNoParent));
        assert!(matches!(
            graph.move_to_subcluster(child, v, root),
            Err(Error::NotASubcluster { .. })
        ));
    }

    #[test]
    fn test_edge_to_cluster_vertex_is_rejected() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (v, gv) = graph.add_vertex(root).unwrap();
        let (child, cv) = graph.create_subcluster(root).unwrap();
        let gcv = graph.global_vertex(root, cv).unwrap();

        assert_eq!(graph.add_edge(root, v, cv), Err(Error::ClusterEndpoint(gcv)));
        assert_eq!(graph.add_edge_global(root, gv, gcv), Err(Error::ClusterEndpoint(gcv)));
        assert_eq!(graph.edge_count(root), 0);

        let nv = graph.move_to_subcluster(root, v, child).unwrap();
        assert_eq!(graph.vertex_owner(root, gv), Some((child, nv)));
    }

    #[test]
    fn test_failed_move_leaves_tree_unchanged() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (v, gv) = graph.add_vertex(root).unwrap();
        let (child, cv) = graph.create_subcluster(root).unwrap();
        let (_, gx) = graph.add_vertex(child).unwrap();
        let gcv = graph.global_vertex(root, cv).unwrap();

        // An aggregated edge whose far end does not live inside the child
        let broken = GlobalEdge::new(gv, gcv, 99);
        let single = graph.edge_single(broken);
        let e = graph.attach(root, v, cv, single).unwrap();
        let good = GlobalEdge::new(gv, gx, 100);
        let single = graph.edge_single(good);
        graph.attach(root, v, cv, single).unwrap();

        assert_eq!(
            graph.move_to_subcluster(root, v, child),
            Err(Error::Cluster(ClusterError::UnresolvedEdge(broken)))
        );
        assert_eq!(graph.vertex_count(root), 2);
        assert_eq!(graph.vertex_count(child), 1);
        assert_eq!(graph.vertex_owner(root, gv), Some((root, v)));
        assert_eq!(graph.edge_owner(root, broken), Some((root, e)));
        assert_eq!(graph.edge_owner(root, good), Some((root, e)));
    }

    #[test]
    fn test_move_to_parent_lifts_edges() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (child, cv) = graph.create_subcluster(root).unwrap();
        let (x, gx) = graph.add_vertex(child).unwrap();
        let (y, _) = graph.add_vertex(child).unwrap();
        let (_, inner) = graph.add_edge(child, x, y).unwrap();
        let (r, gr) = graph.add_vertex(root).unwrap();
        let (_, cross, _) = graph.add_edge_global(root, gx, gr).unwrap();

        let nx = graph.move_to_parent(child, x).unwrap();

        assert_eq!(graph.local_vertex(root, gx, false), Some(nx));
        assert_eq!(graph.edge_count(child), 0);
        let e = graph.edge(root, nx, r).unwrap();
        assert_eq!(graph.global_edges(root, e).collect::<Vec<_>>(), vec![cross]);
        let e = graph.edge(root, nx, cv).unwrap();
        assert_eq!(graph.global_edges(root, e).collect::<Vec<_>>(), vec![inner]);
        assert!(graph.edge(root, cv, r).is_none());
    }

    #[test]
    fn test_move_round_trip_restores_layout() {
        let mut graph = ClusterGraph::default();
        let root = graph.root();
        let (v1, g1) = graph.add_vertex(root).unwrap();
        let (v2, g2) = graph.add_vertex(root).unwrap();
        let (_, ge) = graph.add_edge(root, v1, v2).unwrap();
        let (child, _) = graph.create_subcluster(root).unwrap();

        let inside = graph.move_to_subcluster(root, v1, child).unwrap();
        let back = graph.move_to_parent(child, inside).unwrap();

        assert_eq!(graph.global_vertex(root, back), Some(g1));
        assert_eq!(graph.vertex_count(child), 0);
        let e = graph.edge(root, back, v2).unwrap();
        let globals: Vec<_> = graph.global_edges(root, e).collect();
        assert_eq!(globals, vec![ge]);
        assert_eq!((globals[0].source, globals[0].target), (g1, g2));
    }
}
