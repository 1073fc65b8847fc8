//! Typed attribute storage for vertices, edges, and clusters.
//!
//! Attributes come in two flavours:
//!
//! - **Properties** are mandatory slots. Every declared property exists on every
//!   entity from creation on, holding its default value until overwritten.
//! - **Objects** are optional shared slots holding an `Arc` to a value, empty
//!   until set.
//!
//! Which properties and objects exist is declared once per tree in a
//! [`GraphConfig`]. Each declared type gets a stable slot index, and bundles
//! store their slots in arrays indexed the same way.
//!
//! ```
//! use clustergraph_core::attribute::{GraphConfig, Property};
//!
//! struct Weight;
//! impl Property for Weight {
//!     type Value = f64;
//! }
//!
//! let config = GraphConfig::builder()
//!     .edge_property::<Weight>()
//!     .build()
//!     .unwrap();
//! assert!(config.edge_properties().contains::<Weight>());
//! ```

mod key;
mod registry;
mod slots;

pub use key::AttributeKey;
pub use registry::{GraphConfig, GraphConfigBuilder, TypeList};
pub(crate) use slots::{ObjectSlots, PropertySlots};

use std::any::Any;
use std::sync::Arc;

/// A property tag.
///
/// The implementing type is only used as a key; the stored data has type
/// [`Property::Value`].
pub trait Property: 'static {
    /// Type of the stored value.
    type Value: Clone + Default + 'static;
}

/// Type-erased object stored in an object slot.
pub type SharedObject = Arc<dyn Any + Send + Sync>;

/// Dense vertex index, maintained by `recompute_index_maps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexIndex;

impl Property for VertexIndex {
    type Value = usize;
}

/// Dense edge index, maintained by `recompute_index_maps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeIndex;

impl Property for EdgeIndex {
    type Value = usize;
}

/// Cluster dirty marker, set by structural mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Changed;

impl Property for Changed {
    type Value = bool;
}
