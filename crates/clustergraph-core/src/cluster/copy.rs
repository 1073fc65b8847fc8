//! Deep copies of cluster subtrees.

use super::ClusterGraph;
use crate::attribute::SharedObject;
use crate::graph::{EdgeBundle, EdgeSingle, VertexBundle};
use clustergraph_common::types::{ClusterId, IdGenerator, LocalVertex};
use clustergraph_common::utils::error::{ClusterError, Error, Result};
use clustergraph_common::utils::hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Produces the object stored in a copy from the original's object.
///
/// Implemented for every `FnMut(&SharedObject) -> SharedObject`.
pub trait ObjectCloner {
    /// Returns the object to store in the copy.
    fn clone_object(&mut self, object: &SharedObject) -> SharedObject;
}

impl<F> ObjectCloner for F
where
    F: FnMut(&SharedObject) -> SharedObject,
{
    fn clone_object(&mut self, object: &SharedObject) -> SharedObject {
        self(object)
    }
}

/// Copies objects by reference: original and copy share every object.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareObjects;

impl ObjectCloner for ShareObjects {
    fn clone_object(&mut self, object: &SharedObject) -> SharedObject {
        Arc::clone(object)
    }
}

impl ClusterGraph {
    /// Replaces the content of cluster `into` of `target` with a copy of
    /// cluster `source` of this tree.
    ///
    /// Vertices, edges with all aggregated global edges, properties and the
    /// whole subcluster structure are copied; global descriptors are kept.
    /// Objects go through `cloner`. Copying does not mark clusters changed,
    /// and the target's id generator is moved past every copied id.
    ///
    /// # Errors
    ///
    /// [`Error::IncompatibleConfig`] if the two trees declare different
    /// attributes. [`Error::DuplicateGlobalId`] if a copied global id is
    /// already used by the part of `target` that survives clearing `into`;
    /// the target is left unchanged in both cases.
    pub fn copy_into(
        &self,
        source: ClusterId,
        target: &mut ClusterGraph,
        into: ClusterId,
        mut cloner: impl ObjectCloner,
    ) -> Result<()> {
        if !self.config.is_compatible(&target.config) {
            return Err(Error::IncompatibleConfig);
        }
        self.get(source)?;
        let copy_mode = target.get(into)?.copy_mode;
        let kept = target.kept_ids(into);
        if let Some(id) = self.first_id_in(source, &kept) {
            return Err(Error::DuplicateGlobalId(id));
        }

        target.clear_content(into);
        target.ids.set_count(self.ids.count());
        target.set_copy_mode(into, true)?;
        let result = self.copy_cluster(source, target, into, &mut cloner);
        target.set_copy_mode(into, copy_mode)?;
        result?;

        tracing::debug!("copied cluster {} into {}", source, into);
        Ok(())
    }

    /// A new tree over the same configuration holding a copy of this one.
    ///
    /// Objects are shared with this tree.
    pub fn duplicate(&self) -> Result<ClusterGraph> {
        self.duplicate_with(ShareObjects)
    }

    /// Like [`duplicate`](Self::duplicate), passing objects through `cloner`.
    pub fn duplicate_with(&self, cloner: impl ObjectCloner) -> Result<ClusterGraph> {
        let ids = IdGenerator::starting_at(self.ids.count());
        let mut copy = ClusterGraph::with_shared(Arc::clone(&self.config), Arc::new(ids));
        let root = copy.root();
        self.copy_into(self.root, &mut copy, root, cloner)?;
        Ok(copy)
    }

    fn copy_cluster(
        &self,
        source: ClusterId,
        target: &mut ClusterGraph,
        into: ClusterId,
        cloner: &mut dyn ObjectCloner,
    ) -> Result<()> {
        let src = self.get(source)?;
        let dst = target.get_mut(into)?;
        dst.properties = src.properties.clone();

        let mut map: FxHashMap<LocalVertex, LocalVertex> = FxHashMap::default();
        for v in src.storage.vertices() {
            let Some(bundle) = src.storage.vertex(v) else {
                continue;
            };
            let objects = bundle.objects.map(|o| cloner.clone_object(o));
            let copy = VertexBundle::new(bundle.global, bundle.properties.clone(), objects);
            map.insert(v, dst.storage.add_vertex(copy));
        }

        for e in src.storage.edges() {
            let (Some(bundle), Some((a, b))) = (src.storage.edge(e), src.storage.endpoints(e)) else {
                continue;
            };
            let (Some(&a), Some(&b)) = (map.get(&a), map.get(&b)) else {
                continue;
            };
            let mut copy = EdgeBundle::new(bundle.properties.clone());
            for single in &bundle.singles {
                let objects = single.objects.map(|o| cloner.clone_object(o));
                copy.singles.push(EdgeSingle::new(single.global, objects));
            }
            dst.storage.add_edge(a, b, copy).ok_or(ClusterError::MapMismatch(a))?;
        }

        for (v, child) in &src.children {
            let Some(&nv) = map.get(v) else {
                continue;
            };
            let copy = target.alloc_cluster(Some(into), Some(nv));
            target.get_mut(into)?.children.insert(nv, copy);
            self.copy_cluster(*child, target, copy, cloner)?;
        }
        Ok(())
    }

    /// Global ids that outlive clearing `into`: everything outside its
    /// subtree except ancestor edges reaching into it.
    fn kept_ids(&self, into: ClusterId) -> FxHashSet<u64> {
        let inside = self.subtree_globals(into);
        let mut kept = FxHashSet::default();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if id == into {
                continue;
            }
            let Some(c) = self.clusters.get(&id) else {
                continue;
            };
            kept.extend(c.storage.vertices().filter_map(|v| c.storage.vertex(v)).map(|b| b.global.as_u64()));
            for bundle in c.storage.edges().filter_map(|e| c.storage.edge(e)) {
                kept.extend(
                    bundle
                        .globals()
                        .filter(|g| !inside.contains(&g.source) && !inside.contains(&g.target))
                        .map(|g| g.id),
                );
            }
            stack.extend(c.children.values().copied());
        }
        kept
    }

    /// The first global id of `cluster`'s subtree that is also in `ids`.
    fn first_id_in(&self, cluster: ClusterId, ids: &FxHashSet<u64>) -> Option<u64> {
        let mut stack = vec![cluster];
        while let Some(id) = stack.pop() {
            let Some(c) = self.clusters.get(&id) else {
                continue;
            };
            let vertices = c.storage.vertices().filter_map(|v| c.storage.vertex(v)).map(|b| b.global.as_u64());
            let edges = c
                .storage
                .edges()
                .filter_map(|e| c.storage.edge(e))
                .flat_map(|b| b.globals().map(|g| g.id));
            if let Some(shared) = vertices.chain(edges).find(|id| ids.contains(id)) {
                return Some(shared);
            }
            stack.extend(c.children.values().copied());
        }
        None
    }

    /// Drops everything a cluster owns without reporting it.
    ///
    /// Ancestor edges reaching into the cleared content are dropped too.
    fn clear_content(&mut self, cluster: ClusterId) {
        let inside = self.subtree_globals(cluster);
        self.purge_above(
            cluster,
            &|e| inside.contains(&e.source) || inside.contains(&e.target),
            &mut |_| {},
        );

        let children: Vec<ClusterId> = match self.clusters.get(&cluster) {
            Some(c) => c.children.values().copied().collect(),
            None => return,
        };
        for child in children {
            self.teardown(child, &mut |_| {});
        }
        if let Some(c) = self.clusters.get_mut(&cluster) {
            c.storage.clear();
            c.children.clear();
        }
    }
}
