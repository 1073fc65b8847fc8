//! Object iteration and index maps.

use super::ClusterGraph;
use crate::attribute::{EdgeIndex, SharedObject, VertexIndex};
use clustergraph_common::types::ClusterId;
use clustergraph_common::utils::error::Result;
use std::sync::Arc;

/// One step of an object walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit<O> {
    /// A subcluster, reported before its content.
    Cluster(ClusterId),
    /// A non-empty object slot.
    Object(O),
}

impl ClusterGraph {
    /// Visits every object of type `T` in a cluster.
    ///
    /// Vertices come first, then the global edges of every local edge. With
    /// `recursive`, each subcluster follows as [`Visit::Cluster`] and then
    /// its own content, depth first.
    pub fn for_each<T: Send + Sync + 'static>(
        &self,
        cluster: ClusterId,
        mut f: impl FnMut(Visit<Arc<T>>),
        recursive: bool,
    ) -> Result<()> {
        let slot = self.config.objects().require::<T>()?;
        self.get(cluster)?;
        self.walk(
            cluster,
            Some(slot),
            &mut |visit| match visit {
                Visit::Cluster(c) => f(Visit::Cluster(c)),
                Visit::Object(object) => {
                    if let Ok(object) = Arc::clone(object).downcast::<T>() {
                        f(Visit::Object(object));
                    }
                }
            },
            recursive,
        );
        Ok(())
    }

    /// Visits every non-empty object slot in a cluster, in the order of
    /// [`for_each`](Self::for_each).
    pub fn for_each_object(
        &self,
        cluster: ClusterId,
        mut f: impl FnMut(Visit<&SharedObject>),
        recursive: bool,
    ) -> Result<()> {
        self.get(cluster)?;
        self.walk(cluster, None, &mut f, recursive);
        Ok(())
    }

    /// Renumbers the vertex and edge index properties of a cluster as dense
    /// `0..n` ranges in storage order.
    ///
    /// The numbering holds until the next structural change.
    pub fn recompute_index_maps(&mut self, cluster: ClusterId) -> Result<()> {
        let config = Arc::clone(&self.config);
        let storage = &mut self.get_mut(cluster)?.storage;

        let vertices: Vec<_> = storage.vertices().collect();
        for (index, v) in vertices.into_iter().enumerate() {
            if let Some(bundle) = storage.vertex_mut(v) {
                config
                    .vertex_properties()
                    .write::<VertexIndex>(&mut bundle.properties, index)?;
            }
        }

        let edges: Vec<_> = storage.edges().collect();
        for (index, e) in edges.into_iter().enumerate() {
            if let Some(bundle) = storage.edge_mut(e) {
                config
                    .edge_properties()
                    .write::<EdgeIndex>(&mut bundle.properties, index)?;
            }
        }

        tracing::trace!("recomputed index maps of {}", cluster);
        Ok(())
    }

    fn walk(
        &self,
        cluster: ClusterId,
        slot: Option<usize>,
        f: &mut dyn FnMut(Visit<&SharedObject>),
        recursive: bool,
    ) {
        let Some(c) = self.clusters.get(&cluster) else {
            return;
        };

        let storage = &c.storage;
        for v in storage.vertices() {
            if let Some(bundle) = storage.vertex(v) {
                match slot {
                    Some(slot) => bundle.objects.get(slot).into_iter().for_each(|o| f(Visit::Object(o))),
                    None => bundle.objects.iter().for_each(|o| f(Visit::Object(o))),
                }
            }
        }
        for e in storage.edges() {
            let Some(bundle) = storage.edge(e) else {
                continue;
            };
            for single in &bundle.singles {
                match slot {
                    Some(slot) => single.objects.get(slot).into_iter().for_each(|o| f(Visit::Object(o))),
                    None => single.objects.iter().for_each(|o| f(Visit::Object(o))),
                }
            }
        }

        if recursive {
            for &child in c.children.values() {
                f(Visit::Cluster(child));
                self.walk(child, slot, f, recursive);
            }
        }
    }
}
