//! Typed property and object access.
//!
//! Vertices and edges are addressed through an [`AttributeKey`]. Global keys
//! are resolved to the cluster that stores the entity directly, so a global
//! descriptor reaches its attributes from any ancestor scope.
//!
//! A local edge aggregates several global edges. Its properties are shared,
//! while each aggregated global edge has its own object slots; a local-edge
//! key addresses the first aggregated global edge's objects.

use super::ClusterGraph;
use crate::attribute::{AttributeKey, Property};
use crate::graph::EdgeSingle;
use clustergraph_common::types::{ClusterId, GlobalEdge, LocalEdge, LocalVertex};
use clustergraph_common::utils::error::{Error, Result};
use std::sync::Arc;

/// A resolved attribute location.
#[derive(Debug, Clone, Copy)]
enum Target {
    Vertex(ClusterId, LocalVertex),
    /// Local edge, plus the addressed global edge (`None` for the first one).
    Edge(ClusterId, LocalEdge, Option<GlobalEdge>),
}

impl ClusterGraph {
    // === Properties ===

    /// Reads property `P` of a vertex or edge.
    ///
    /// Properties always exist, holding their default until written.
    pub fn property<P: Property>(&self, cluster: ClusterId, key: impl Into<AttributeKey>) -> Result<&P::Value> {
        match self.locate(cluster, key.into())? {
            Target::Vertex(owner, v) => {
                let bundle = self.get(owner)?.storage.vertex(v).ok_or(Error::InvalidLocalVertex(v))?;
                self.config.vertex_properties().read::<P>(&bundle.properties)
            }
            Target::Edge(owner, e, _) => {
                let bundle = self.get(owner)?.storage.edge(e).ok_or(Error::InvalidLocalEdge(e))?;
                self.config.edge_properties().read::<P>(&bundle.properties)
            }
        }
    }

    /// Overwrites property `P` of a vertex or edge.
    pub fn set_property<P: Property>(
        &mut self,
        cluster: ClusterId,
        key: impl Into<AttributeKey>,
        value: P::Value,
    ) -> Result<()> {
        let target = self.locate(cluster, key.into())?;
        let config = Arc::clone(&self.config);
        match target {
            Target::Vertex(owner, v) => {
                let bundle = self
                    .get_mut(owner)?
                    .storage
                    .vertex_mut(v)
                    .ok_or(Error::InvalidLocalVertex(v))?;
                config.vertex_properties().write::<P>(&mut bundle.properties, value)
            }
            Target::Edge(owner, e, _) => {
                let bundle = self
                    .get_mut(owner)?
                    .storage
                    .edge_mut(e)
                    .ok_or(Error::InvalidLocalEdge(e))?;
                config.edge_properties().write::<P>(&mut bundle.properties, value)
            }
        }
    }

    /// Reads cluster property `P`.
    pub fn cluster_property<P: Property>(&self, cluster: ClusterId) -> Result<&P::Value> {
        let c = self.get(cluster)?;
        self.config.cluster_properties().read::<P>(&c.properties)
    }

    /// Overwrites cluster property `P`.
    pub fn set_cluster_property<P: Property>(&mut self, cluster: ClusterId, value: P::Value) -> Result<()> {
        let config = Arc::clone(&self.config);
        let c = self.get_mut(cluster)?;
        config.cluster_properties().write::<P>(&mut c.properties, value)
    }

    /// Reads cluster property `P` of the child represented by vertex `v`.
    pub fn subcluster_property<P: Property>(&self, cluster: ClusterId, v: LocalVertex) -> Result<&P::Value> {
        let child = self.cluster_of(cluster, v).ok_or(Error::InvalidLocalVertex(v))?;
        self.cluster_property::<P>(child)
    }

    /// Overwrites cluster property `P` of the child represented by vertex `v`.
    pub fn set_subcluster_property<P: Property>(
        &mut self,
        cluster: ClusterId,
        v: LocalVertex,
        value: P::Value,
    ) -> Result<()> {
        let child = self.cluster_of(cluster, v).ok_or(Error::InvalidLocalVertex(v))?;
        self.set_cluster_property::<P>(child, value)
    }

    // === Objects ===

    /// Reads object `T` of a vertex or global edge, `None` if the slot is empty.
    pub fn object<T: Send + Sync + 'static>(
        &self,
        cluster: ClusterId,
        key: impl Into<AttributeKey>,
    ) -> Result<Option<Arc<T>>> {
        let objects = self.config.objects();
        match self.locate(cluster, key.into())? {
            Target::Vertex(owner, v) => {
                let bundle = self.get(owner)?.storage.vertex(v).ok_or(Error::InvalidLocalVertex(v))?;
                objects.read_object::<T>(&bundle.objects)
            }
            Target::Edge(owner, e, global) => {
                let bundle = self.get(owner)?.storage.edge(e).ok_or(Error::InvalidLocalEdge(e))?;
                let single = Self::single(&bundle.singles, e, global)?;
                objects.read_object::<T>(&single.objects)
            }
        }
    }

    /// Stores object `T` on a vertex or global edge, replacing any previous one.
    pub fn set_object<T: Send + Sync + 'static>(
        &mut self,
        cluster: ClusterId,
        key: impl Into<AttributeKey>,
        object: Arc<T>,
    ) -> Result<()> {
        self.write_object(cluster, key.into(), Some(object))
    }

    /// Empties the object slot `T` of a vertex or global edge.
    pub fn clear_object<T: Send + Sync + 'static>(
        &mut self,
        cluster: ClusterId,
        key: impl Into<AttributeKey>,
    ) -> Result<()> {
        self.write_object::<T>(cluster, key.into(), None)
    }

    /// Object `T` of every global edge aggregated by a local edge, in order.
    pub fn objects<T: Send + Sync + 'static>(
        &self,
        cluster: ClusterId,
        e: LocalEdge,
    ) -> Result<Vec<(GlobalEdge, Option<Arc<T>>)>> {
        let objects = self.config.objects();
        let bundle = self.get(cluster)?.storage.edge(e).ok_or(Error::InvalidLocalEdge(e))?;
        bundle
            .singles
            .iter()
            .map(|single| Ok((single.global, objects.read_object::<T>(&single.objects)?)))
            .collect()
    }

    // === Internal Helpers ===

    fn write_object<T: Send + Sync + 'static>(
        &mut self,
        cluster: ClusterId,
        key: AttributeKey,
        object: Option<Arc<T>>,
    ) -> Result<()> {
        let target = self.locate(cluster, key)?;
        let config = Arc::clone(&self.config);
        match target {
            Target::Vertex(owner, v) => {
                let bundle = self
                    .get_mut(owner)?
                    .storage
                    .vertex_mut(v)
                    .ok_or(Error::InvalidLocalVertex(v))?;
                config.objects().write_object(&mut bundle.objects, object)
            }
            Target::Edge(owner, e, global) => {
                let bundle = self
                    .get_mut(owner)?
                    .storage
                    .edge_mut(e)
                    .ok_or(Error::InvalidLocalEdge(e))?;
                let index = match global {
                    Some(global) => bundle.position(global).ok_or(Error::EdgeNotFound(global))?,
                    None => 0,
                };
                let single = bundle.singles.get_mut(index).ok_or(Error::InvalidLocalEdge(e))?;
                config.objects().write_object(&mut single.objects, object)
            }
        }
    }

    fn single(singles: &[EdgeSingle], e: LocalEdge, global: Option<GlobalEdge>) -> Result<&EdgeSingle> {
        match global {
            Some(global) => singles
                .iter()
                .find(|single| single.global == global)
                .ok_or(Error::EdgeNotFound(global)),
            None => singles.first().ok_or(Error::InvalidLocalEdge(e)),
        }
    }

    fn locate(&self, cluster: ClusterId, key: AttributeKey) -> Result<Target> {
        match key {
            AttributeKey::LocalVertex(v) => {
                self.require_vertex(cluster, v)?;
                Ok(Target::Vertex(cluster, v))
            }
            AttributeKey::LocalEdge(e) => {
                if self.get(cluster)?.storage.contains_edge(e) {
                    Ok(Target::Edge(cluster, e, None))
                } else {
                    Err(Error::InvalidLocalEdge(e))
                }
            }
            AttributeKey::GlobalVertex(g) => {
                self.get(cluster)?;
                let (owner, v) = self.vertex_owner(cluster, g).ok_or(Error::VertexNotFound(g))?;
                Ok(Target::Vertex(owner, v))
            }
            AttributeKey::GlobalEdge(g) => {
                self.get(cluster)?;
                let (owner, e) = self.edge_owner(cluster, g).ok_or(Error::EdgeNotFound(g))?;
                Ok(Target::Edge(owner, e, Some(g)))
            }
        }
    }
}
