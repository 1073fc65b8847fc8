//! Identifier types.
//!
//! Two kinds of descriptors exist side by side:
//!
//! - **Global** descriptors ([`GlobalVertex`], [`GlobalEdge`]) are unique over a
//!   whole cluster tree and survive moves between clusters and copies.
//! - **Local** descriptors ([`LocalVertex`], [`LocalEdge`]) are handles into one
//!   cluster's storage. They stay valid until that cluster's storage removes the
//!   entity, and mean nothing in any other cluster.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Ids up to and including this value are never handed out.
pub const RESERVED_IDS: u64 = 9;

/// Tree-wide identifier of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalVertex(pub u64);

impl GlobalVertex {
    /// Creates a global vertex descriptor from a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true if the id is outside the reserved range.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > RESERVED_IDS
    }
}

impl fmt::Display for GlobalVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for GlobalVertex {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Tree-wide identifier of an edge.
///
/// Carries its endpoints as global vertices. Equality, hashing and ordering
/// only look at `id`: two descriptors with the same id name the same edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlobalEdge {
    /// First endpoint.
    pub source: GlobalVertex,
    /// Second endpoint.
    pub target: GlobalVertex,
    /// Unique id of this edge.
    pub id: u64,
}

impl GlobalEdge {
    /// Creates a global edge descriptor.
    #[inline]
    #[must_use]
    pub const fn new(source: GlobalVertex, target: GlobalVertex, id: u64) -> Self {
        Self { source, target, id }
    }

    /// Returns true if the id is outside the reserved range.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.id > RESERVED_IDS
    }

    /// Returns the endpoint opposite to `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn opposite(&self, v: GlobalVertex) -> Option<GlobalVertex> {
        if self.source == v {
            Some(self.target)
        } else if self.target == v {
            Some(self.source)
        } else {
            None
        }
    }
}

impl PartialEq for GlobalEdge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GlobalEdge {}

impl Hash for GlobalEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for GlobalEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GlobalEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for GlobalEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}({}, {})", self.id, self.source, self.target)
    }
}

/// Handle of a vertex inside one cluster's storage.
///
/// Storage slots are reused after removal; the generation tells a stale
/// handle apart from the vertex that took over its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalVertex {
    index: u32,
    generation: u32,
}

impl LocalVertex {
    /// Creates a handle from a storage index and slot generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the storage index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the slot generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for LocalVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "lv{}", self.index)
        } else {
            write!(f, "lv{}#{}", self.index, self.generation)
        }
    }
}

/// Handle of an edge inside one cluster's storage.
///
/// Storage slots are reused after removal; the generation tells a stale
/// handle apart from the edge that took over its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalEdge {
    index: u32,
    generation: u32,
}

impl LocalEdge {
    /// Creates a handle from a storage index and slot generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the storage index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the slot generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for LocalEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "le{}", self.index)
        } else {
            write!(f, "le{}#{}", self.index, self.generation)
        }
    }
}

/// Address of a cluster within its tree.
///
/// Cluster ids are never reused inside one tree, so a removed cluster's id
/// simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a cluster id.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}
