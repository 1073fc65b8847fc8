//! Bundles attached to local vertices and edges.

use crate::attribute::{ObjectSlots, PropertySlots};
use clustergraph_common::types::{GlobalEdge, GlobalVertex};
use smallvec::SmallVec;

/// Data of one local vertex: its global id, properties and objects.
#[derive(Debug, Clone)]
pub struct VertexBundle {
    pub(crate) global: GlobalVertex,
    pub(crate) properties: PropertySlots,
    pub(crate) objects: ObjectSlots,
}

impl VertexBundle {
    pub(crate) fn new(
        global: GlobalVertex,
        properties: PropertySlots,
        objects: ObjectSlots,
    ) -> Self {
        Self {
            global,
            properties,
            objects,
        }
    }

    /// Returns the global vertex held by this bundle.
    #[must_use]
    pub fn global(&self) -> GlobalVertex {
        self.global
    }
}

/// One aggregated global edge: its objects and descriptor.
///
/// Global edges carry no properties of their own; those live on the local
/// edge holding them.
#[derive(Debug, Clone)]
pub struct EdgeSingle {
    pub(crate) objects: ObjectSlots,
    pub(crate) global: GlobalEdge,
}

impl EdgeSingle {
    pub(crate) fn new(global: GlobalEdge, objects: ObjectSlots) -> Self {
        Self { objects, global }
    }

    /// Returns the global edge descriptor.
    #[must_use]
    pub fn global(&self) -> GlobalEdge {
        self.global
    }
}

/// Data of one local edge: its properties and the global edges it aggregates.
///
/// The aggregated list is never empty while the local edge exists.
#[derive(Debug, Clone)]
pub struct EdgeBundle {
    pub(crate) properties: PropertySlots,
    pub(crate) singles: SmallVec<[EdgeSingle; 1]>,
}

impl EdgeBundle {
    pub(crate) fn new(properties: PropertySlots) -> Self {
        Self {
            properties,
            singles: SmallVec::new(),
        }
    }

    /// Iterates over the aggregated global edges in insertion order.
    pub fn globals(&self) -> impl Iterator<Item = GlobalEdge> + '_ {
        self.singles.iter().map(|s| s.global)
    }

    /// Number of aggregated global edges.
    #[must_use]
    pub fn global_count(&self) -> usize {
        self.singles.len()
    }

    /// Position of `edge` in the aggregated list.
    pub(crate) fn position(&self, edge: GlobalEdge) -> Option<usize> {
        self.singles.iter().position(|s| s.global == edge)
    }

    /// Splits off every single matching `pred`, keeping the rest in order.
    pub(crate) fn take_where(&mut self, mut pred: impl FnMut(&GlobalEdge) -> bool) -> Vec<EdgeSingle> {
        let mut taken = Vec::new();
        let mut kept = SmallVec::new();
        for single in self.singles.drain(..) {
            if pred(&single.global) {
                taken.push(single);
            } else {
                kept.push(single);
            }
        }
        self.singles = kept;
        taken
    }
}
