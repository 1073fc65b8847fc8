//! Fixed-size slot arrays backing property and object storage.

use super::SharedObject;
use std::any::Any;
use std::fmt;

/// A type-erased, clonable property value.
pub(crate) trait Slot: Any {
    fn clone_slot(&self) -> Box<dyn Slot>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any + Clone> Slot for T {
    fn clone_slot(&self) -> Box<dyn Slot> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Creates the default slot for a property value type.
pub(crate) type SlotFactory = fn() -> Box<dyn Slot>;

/// Property values of one entity, indexed by registry position.
pub(crate) struct PropertySlots(Box<[Box<dyn Slot>]>);

impl PropertySlots {
    pub(crate) fn from_factories(factories: &[SlotFactory]) -> Self {
        Self(factories.iter().map(|make| make()).collect())
    }

    pub(crate) fn get<V: 'static>(&self, index: usize) -> Option<&V> {
        self.0.get(index).and_then(|slot| (**slot).as_any().downcast_ref())
    }

    pub(crate) fn get_mut<V: 'static>(&mut self, index: usize) -> Option<&mut V> {
        self.0
            .get_mut(index)
            .and_then(|slot| (**slot).as_any_mut().downcast_mut())
    }

    /// Overwrites a slot. Returns false if the index or type does not match.
    pub(crate) fn set<V: 'static>(&mut self, index: usize, value: V) -> bool {
        match self.get_mut::<V>(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl Clone for PropertySlots {
    fn clone(&self) -> Self {
        Self(self.0.iter().map(|slot| (**slot).clone_slot()).collect())
    }
}

impl fmt::Debug for PropertySlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySlots")
            .field("len", &self.0.len())
            .finish()
    }
}

/// Object slots of one entity, indexed by registry position.
#[derive(Clone)]
pub(crate) struct ObjectSlots(Box<[Option<SharedObject>]>);

impl ObjectSlots {
    pub(crate) fn empty(len: usize) -> Self {
        Self(vec![None; len].into_boxed_slice())
    }

    pub(crate) fn get(&self, index: usize) -> Option<&SharedObject> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Overwrites a slot. Returns false if the index is out of range.
    pub(crate) fn set(&mut self, index: usize, object: Option<SharedObject>) -> bool {
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = object;
                true
            }
            None => false,
        }
    }

    /// Iterates over all non-empty slots.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &SharedObject> {
        self.0.iter().flatten()
    }

    /// Produces new slots by passing every non-empty object through `f`.
    pub(crate) fn map(&self, mut f: impl FnMut(&SharedObject) -> SharedObject) -> Self {
        Self(self.0.iter().map(|slot| slot.as_ref().map(&mut f)).collect())
    }
}

impl fmt::Debug for ObjectSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSlots")
            .field("len", &self.0.len())
            .field("set", &self.iter().count())
            .finish()
    }
}
