//! Slot table: a flat arena of stored values plus a LIFO free list.
//!
//! Slot 0 is reserved as the empty sentinel and never holds a value, so a
//! coordinate index can use `SlotId(0)` to mean "nothing here". Slots are
//! recycled, never deallocated: the table only ever grows.

use super::error::{Result, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl SlotId {
    /// The sentinel. Never refers to a stored value.
    pub const EMPTY: SlotId = SlotId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

pub(crate) struct SlotTable<T> {
    /// `values[0]` is the sentinel and stays `None`.
    values: Vec<Option<T>>,
    /// Reclaimed ids, reused most-recent first.
    free: Vec<SlotId>,
}

impl<T> SlotTable<T> {
    pub fn new() -> Self {
        Self {
            values: vec![None],
            free: Vec::new(),
        }
    }

    /// Number of slots holding a value.
    #[inline]
    pub fn len_live(&self) -> usize {
        self.values.len() - 1 - self.free.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Option<T>] {
        &self.values
    }

    #[inline]
    pub fn free_slots(&self) -> &[SlotId] {
        &self.free
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.values.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.values.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Store `value` in a recycled slot if one is free, else in a new
    /// trailing slot.
    pub fn alloc(&mut self, value: T) -> Result<SlotId> {
        if let Some(recycled) = self.free.pop() {
            debug_assert!(self.values[recycled.index()].is_none());
            tracing::trace!(slot = recycled.0, "recycling freed slot");
            self.values[recycled.index()] = Some(value);
            return Ok(recycled);
        }
        let next = u32::try_from(self.values.len()).map_err(|_| StoreError::SlotsExhausted)?;
        self.values.push(Some(value));
        Ok(SlotId(next))
    }

    /// Overwrite a live slot in place, returning the old value.
    #[inline]
    pub fn replace(&mut self, id: SlotId, value: T) -> Option<T> {
        debug_assert!(!id.is_empty(), "replace on the sentinel slot");
        self.values[id.index()].replace(value)
    }

    /// Take the value out of a live slot and push the id onto the free list.
    /// Releasing the sentinel or an already-free slot does nothing.
    pub fn release(&mut self, id: SlotId) -> Option<T> {
        if id.is_empty() {
            return None;
        }
        let value = self.values.get_mut(id.index())?.take()?;
        self.free.push(id);
        Some(value)
    }
}
