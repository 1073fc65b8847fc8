//! The cluster tree.
//!
//! A [`ClusterGraph`] owns every cluster of one tree in an arena addressed by
//! [`ClusterId`]. Each [`Cluster`] owns one [`LocalGraph`]; a child cluster is
//! represented in its parent's storage by a *cluster vertex*, and the parent
//! keeps a map from that vertex to the child.
//!
//! ## Modules
//!
//! - `hierarchy` - creating, navigating and tearing down clusters
//! - `translate` - local/global descriptor translation
//! - `mutate` - adding and removing vertices and edges
//! - `moves` - moving vertices between a cluster and its children
//! - `access` - property and object access
//! - `visit` - object iteration and index maps
//! - `copy` - deep copies of (sub)trees

mod access;
mod copy;
mod hierarchy;
mod moves;
mod mutate;
mod translate;
mod visit;

pub use copy::{ObjectCloner, ShareObjects};
pub use visit::Visit;

use crate::attribute::{GraphConfig, PropertySlots};
use crate::graph::LocalGraph;
use clustergraph_common::types::{ClusterId, GlobalEdge, GlobalVertex, IdGenerator, LocalVertex};
use clustergraph_common::utils::error::{Error, Result};
use clustergraph_common::utils::hash::FxHashMap;
use indexmap::IndexMap;
use std::sync::Arc;

/// Something removed from the tree, reported to removal callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    /// An ordinary vertex.
    Vertex(GlobalVertex),
    /// A global edge.
    Edge(GlobalEdge),
    /// A whole cluster, reported after its content.
    Cluster(ClusterId),
}

/// One node of the cluster tree.
#[derive(Debug)]
pub struct Cluster {
    /// Local storage.
    storage: LocalGraph,
    /// Cluster vertex -> child cluster.
    children: IndexMap<LocalVertex, ClusterId>,
    /// Parent cluster, `None` for the root.
    parent: Option<ClusterId>,
    /// This cluster's vertex in the parent's storage.
    vertex: Option<LocalVertex>,
    /// Cluster properties.
    properties: PropertySlots,
    /// Suppresses change marking while set.
    copy_mode: bool,
}

impl Cluster {
    fn new(config: &GraphConfig, parent: Option<ClusterId>, vertex: Option<LocalVertex>) -> Self {
        Self {
            storage: LocalGraph::with_capacity(
                config.initial_vertex_capacity,
                config.initial_edge_capacity,
            ),
            children: IndexMap::new(),
            parent,
            vertex,
            properties: config.cluster_properties().new_properties(),
            copy_mode: false,
        }
    }

    /// Local storage of this cluster.
    #[must_use]
    pub fn storage(&self) -> &LocalGraph {
        &self.storage
    }

    /// Parent cluster, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<ClusterId> {
        self.parent
    }

    /// This cluster's vertex in its parent, `None` for the root.
    #[must_use]
    pub fn vertex(&self) -> Option<LocalVertex> {
        self.vertex
    }

    /// Child clusters keyed by their cluster vertex, in creation order.
    pub fn children(&self) -> impl Iterator<Item = (LocalVertex, ClusterId)> + '_ {
        self.children.iter().map(|(&v, &c)| (v, c))
    }
}

/// A tree of clusters sharing one attribute registry and one id generator.
///
/// Every operation addresses a cluster by [`ClusterId`]; local descriptors
/// passed alongside are interpreted in that cluster.
///
/// # Example
///
/// ```
/// use clustergraph_core::ClusterGraph;
///
/// let mut graph = ClusterGraph::default();
/// let root = graph.root();
///
/// let (v1, g1) = graph.add_vertex(root).unwrap();
/// let (v2, _) = graph.add_vertex(root).unwrap();
/// graph.add_edge(root, v1, v2).unwrap();
///
/// let (child, _) = graph.create_subcluster(root).unwrap();
/// graph.move_to_subcluster(root, v1, child).unwrap();
/// assert_eq!(graph.vertex_owner(root, g1).map(|(c, _)| c), Some(child));
/// ```
#[derive(Debug)]
pub struct ClusterGraph {
    /// Attribute registry and sizing hints.
    config: Arc<GraphConfig>,
    /// Global id source shared by every cluster.
    ids: Arc<IdGenerator>,
    /// Arena of live clusters.
    clusters: FxHashMap<ClusterId, Cluster>,
    /// Next cluster id to hand out.
    next_cluster: u64,
    /// The root cluster.
    root: ClusterId,
}

impl ClusterGraph {
    /// Creates a tree holding an empty root cluster and a fresh id generator.
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self::with_shared(Arc::new(config), Arc::new(IdGenerator::new()))
    }

    /// Creates a tree over an existing configuration and id generator.
    ///
    /// Trees sharing a generator never hand out colliding global ids.
    #[must_use]
    pub fn with_shared(config: Arc<GraphConfig>, ids: Arc<IdGenerator>) -> Self {
        let root = ClusterId::new(0);
        let mut clusters = FxHashMap::default();
        clusters.insert(root, Cluster::new(&config, None, None));
        Self {
            config,
            ids,
            clusters,
            next_cluster: 1,
            root,
        }
    }

    /// The attribute registry of this tree.
    #[must_use]
    pub fn config(&self) -> &Arc<GraphConfig> {
        &self.config
    }

    /// The id generator shared by every cluster of this tree.
    #[must_use]
    pub fn id_generator(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// Returns the cluster, if it is alive.
    #[must_use]
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    /// Returns the local storage of a cluster.
    #[must_use]
    pub fn local_graph(&self, id: ClusterId) -> Option<&LocalGraph> {
        self.clusters.get(&id).map(|c| &c.storage)
    }

    /// Returns true if the cluster is alive.
    #[must_use]
    pub fn contains_cluster(&self, id: ClusterId) -> bool {
        self.clusters.contains_key(&id)
    }

    /// Number of live clusters, root included.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    // === Internal Helpers ===

    fn get(&self, id: ClusterId) -> Result<&Cluster> {
        self.clusters.get(&id).ok_or(Error::ClusterNotFound(id))
    }

    fn get_mut(&mut self, id: ClusterId) -> Result<&mut Cluster> {
        self.clusters.get_mut(&id).ok_or(Error::ClusterNotFound(id))
    }

    fn alloc_cluster(&mut self, parent: Option<ClusterId>, vertex: Option<LocalVertex>) -> ClusterId {
        let id = ClusterId::new(self.next_cluster);
        self.next_cluster += 1;
        let cluster = Cluster::new(&self.config, parent, vertex);
        self.clusters.insert(id, cluster);
        id
    }

    fn require_vertex(&self, cluster: ClusterId, v: LocalVertex) -> Result<&Cluster> {
        let c = self.get(cluster)?;
        if c.storage.contains_vertex(v) {
            Ok(c)
        } else {
            Err(Error::InvalidLocalVertex(v))
        }
    }

    /// Sets the changed flag unless copy mode is active.
    fn mark_changed(&mut self, cluster: ClusterId) {
        let Some(index) = self.config.cluster_properties().position::<crate::attribute::Changed>()
        else {
            return;
        };
        if let Some(c) = self.clusters.get_mut(&cluster) {
            if !c.copy_mode {
                c.properties.set(index, true);
            }
        }
    }

    /// Marks `from` and every ancestor up to and including `to` as changed.
    fn mark_changed_upwards(&mut self, from: ClusterId, to: ClusterId) {
        let mut current = Some(from);
        while let Some(c) = current {
            self.mark_changed(c);
            if c == to {
                break;
            }
            current = self.clusters.get(&c).and_then(|c| c.parent);
        }
    }
}

impl Default for ClusterGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}
