//! Attribute registry and graph configuration.

use super::slots::{ObjectSlots, PropertySlots, Slot, SlotFactory};
use super::{Changed, EdgeIndex, Property, SharedObject, VertexIndex};
use clustergraph_common::utils::error::{Error, Result};
use clustergraph_common::utils::hash::FxHashMap;
use std::any::{TypeId, type_name};
use std::sync::Arc;

/// Default initial vertex capacity of a cluster's storage.
const DEFAULT_VERTEX_CAPACITY: usize = 16;

/// Default initial edge capacity of a cluster's storage.
const DEFAULT_EDGE_CAPACITY: usize = 32;

fn default_slot<P: Property>() -> Box<dyn Slot> {
    Box::new(P::Value::default())
}

fn no_slot() -> Box<dyn Slot> {
    Box::new(())
}

/// An ordered, duplicate-free list of attribute types.
///
/// The position of a type in the list is its slot index in every bundle.
#[derive(Debug, Clone)]
pub struct TypeList {
    kind: &'static str,
    types: Vec<TypeId>,
    names: Vec<&'static str>,
    factories: Vec<SlotFactory>,
    index: FxHashMap<TypeId, usize>,
}

impl TypeList {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            types: Vec::new(),
            names: Vec::new(),
            factories: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    fn push(&mut self, id: TypeId, name: &'static str, factory: SlotFactory) -> Result<()> {
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateType {
                kind: self.kind,
                name,
            });
        }
        self.insert(id, name, factory);
        Ok(())
    }

    fn insert(&mut self, id: TypeId, name: &'static str, factory: SlotFactory) {
        self.index.insert(id, self.types.len());
        self.types.push(id);
        self.names.push(name);
        self.factories.push(factory);
    }

    /// Appends `P` unless it is already registered.
    fn ensure<P: Property>(&mut self) {
        if !self.contains::<P>() {
            self.insert(TypeId::of::<P>(), type_name::<P>(), default_slot::<P>);
        }
    }

    /// Returns the slot index of `T`, if registered.
    #[must_use]
    pub fn position<T: 'static>(&self) -> Option<usize> {
        self.index.get(&TypeId::of::<T>()).copied()
    }

    /// Returns true if `T` is registered.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type names in slot order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Returns the slot index of `T` or an `UnregisteredType` error.
    pub(crate) fn require<T: 'static>(&self) -> Result<usize> {
        self.position::<T>().ok_or_else(|| self.unregistered::<T>())
    }

    /// Reads property `P` from slots laid out by this list.
    pub(crate) fn read<'a, P: Property>(&self, slots: &'a PropertySlots) -> Result<&'a P::Value> {
        let index = self.require::<P>()?;
        slots
            .get::<P::Value>(index)
            .ok_or_else(|| self.unregistered::<P>())
    }

    /// Overwrites property `P` in slots laid out by this list.
    pub(crate) fn write<P: Property>(&self, slots: &mut PropertySlots, value: P::Value) -> Result<()> {
        let index = self.require::<P>()?;
        if slots.set(index, value) {
            Ok(())
        } else {
            Err(self.unregistered::<P>())
        }
    }

    /// Reads object `T` from slots laid out by this list.
    pub(crate) fn read_object<T: Send + Sync + 'static>(&self, slots: &ObjectSlots) -> Result<Option<Arc<T>>> {
        let index = self.require::<T>()?;
        Ok(slots
            .get(index)
            .and_then(|object| Arc::clone(object).downcast::<T>().ok()))
    }

    /// Overwrites object `T` in slots laid out by this list.
    pub(crate) fn write_object<T: Send + Sync + 'static>(
        &self,
        slots: &mut ObjectSlots,
        object: Option<Arc<T>>,
    ) -> Result<()> {
        let index = self.require::<T>()?;
        let object = object.map(|o| o as SharedObject);
        if slots.set(index, object) {
            Ok(())
        } else {
            Err(self.unregistered::<T>())
        }
    }

    fn unregistered<T: 'static>(&self) -> Error {
        Error::UnregisteredType {
            kind: self.kind,
            name: type_name::<T>(),
        }
    }

    pub(crate) fn new_properties(&self) -> PropertySlots {
        PropertySlots::from_factories(&self.factories)
    }

    pub(crate) fn new_objects(&self) -> ObjectSlots {
        ObjectSlots::empty(self.types.len())
    }

    fn same_layout(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

/// Configuration of a cluster tree.
///
/// Holds the attribute registry shared by every cluster of a tree, plus
/// storage sizing hints. Built with [`GraphConfig::builder`]; the vertex index,
/// edge index and changed properties are always present.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    vertex_properties: TypeList,
    edge_properties: TypeList,
    cluster_properties: TypeList,
    objects: TypeList,
    /// Initial vertex capacity of each cluster's storage.
    pub initial_vertex_capacity: usize,
    /// Initial edge capacity of each cluster's storage.
    pub initial_edge_capacity: usize,
}

impl GraphConfig {
    /// Starts building a configuration.
    #[must_use]
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::new()
    }

    /// Registered vertex properties.
    #[must_use]
    pub fn vertex_properties(&self) -> &TypeList {
        &self.vertex_properties
    }

    /// Registered edge properties.
    #[must_use]
    pub fn edge_properties(&self) -> &TypeList {
        &self.edge_properties
    }

    /// Registered cluster properties.
    #[must_use]
    pub fn cluster_properties(&self) -> &TypeList {
        &self.cluster_properties
    }

    /// Registered object types.
    #[must_use]
    pub fn objects(&self) -> &TypeList {
        &self.objects
    }

    /// Returns true if bundles of both configurations share one slot layout.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.vertex_properties.same_layout(&other.vertex_properties)
            && self.edge_properties.same_layout(&other.edge_properties)
            && self.cluster_properties.same_layout(&other.cluster_properties)
            && self.objects.same_layout(&other.objects)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        // An empty builder cannot contain duplicates
        GraphConfigBuilder::new().finish()
    }
}

/// Builder for [`GraphConfig`].
///
/// Registration order is slot order. Registering a type twice in the same
/// list makes [`build`](Self::build) fail.
#[derive(Debug)]
pub struct GraphConfigBuilder {
    config: GraphConfig,
    error: Option<Error>,
}

impl GraphConfigBuilder {
    fn new() -> Self {
        Self {
            config: GraphConfig {
                vertex_properties: TypeList::new("vertex property"),
                edge_properties: TypeList::new("edge property"),
                cluster_properties: TypeList::new("cluster property"),
                objects: TypeList::new("object"),
                initial_vertex_capacity: DEFAULT_VERTEX_CAPACITY,
                initial_edge_capacity: DEFAULT_EDGE_CAPACITY,
            },
            error: None,
        }
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }

    /// Declares a vertex property.
    #[must_use]
    pub fn vertex_property<P: Property>(mut self) -> Self {
        let result = self.config.vertex_properties.push(
            TypeId::of::<P>(),
            type_name::<P>(),
            default_slot::<P>,
        );
        self.record(result);
        self
    }

    /// Declares an edge property.
    #[must_use]
    pub fn edge_property<P: Property>(mut self) -> Self {
        let result = self.config.edge_properties.push(
            TypeId::of::<P>(),
            type_name::<P>(),
            default_slot::<P>,
        );
        self.record(result);
        self
    }

    /// Declares a cluster property.
    #[must_use]
    pub fn cluster_property<P: Property>(mut self) -> Self {
        let result = self.config.cluster_properties.push(
            TypeId::of::<P>(),
            type_name::<P>(),
            default_slot::<P>,
        );
        self.record(result);
        self
    }

    /// Declares an object type stored on vertices and global edges.
    #[must_use]
    pub fn object<T: Send + Sync + 'static>(mut self) -> Self {
        let result = self
            .config
            .objects
            .push(TypeId::of::<T>(), type_name::<T>(), no_slot);
        self.record(result);
        self
    }

    /// Sets the initial vertex capacity of each cluster.
    #[must_use]
    pub fn with_initial_vertex_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_vertex_capacity = capacity;
        self
    }

    /// Sets the initial edge capacity of each cluster.
    #[must_use]
    pub fn with_initial_edge_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_edge_capacity = capacity;
        self
    }

    /// Finishes the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] for the first type declared twice.
    pub fn build(self) -> Result<GraphConfig> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(self.finish())
    }

    fn finish(mut self) -> GraphConfig {
        self.config.vertex_properties.ensure::<VertexIndex>();
        self.config.edge_properties.ensure::<EdgeIndex>();
        self.config.cluster_properties.ensure::<Changed>();
        self.config
    }
}
