//! `Memory2D<T>`: the store itself, tying the coordinate index to the slot
//! table.

use super::config::{Memory2DConfig, resolve_index_backend, resolve_max_dense_cells};
use super::error::{Result, StoreError};
use super::extents::{Extents, GrowthPolicy};
use super::index::{CoordIndex, IndexBackend};
use super::slot::{SlotId, SlotTable};

/// Sparse, grow-only 2D store mapping `(x, y)` to values of type `T`.
///
/// Coordinates resolve through a coordinate index to slots in a flat slot
/// table. Removing a value recycles its slot; reserved extents and the slot
/// table never shrink.
pub struct Memory2D<T> {
    index: CoordIndex,
    slots: SlotTable<T>,
    growth: GrowthPolicy,
    max_dense_cells: usize,
}

impl<T> Default for Memory2D<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Memory2D<T> {
    /// Empty store with nothing reserved.
    pub fn new() -> Self {
        Self::unreserved(&Memory2DConfig::default())
    }

    /// Store with `x` and `y` reserved on each axis up front.
    pub fn with_prealloc(x: u64, y: u64) -> Self {
        Self::with_config(Memory2DConfig::default().prealloc(x, y))
    }

    /// Create a store with explicit configuration.
    pub fn with_config(config: Memory2DConfig) -> Self {
        let mut store = Self::unreserved(&config);
        let (x, y) = config.prealloc;
        store.grow_to(Extents::ZERO.grown(x, y), None);
        store
    }

    fn unreserved(config: &Memory2DConfig) -> Self {
        Self {
            index: CoordIndex::new(resolve_index_backend(config)),
            slots: SlotTable::new(),
            growth: config.growth,
            max_dense_cells: resolve_max_dense_cells(config),
        }
    }

    #[inline]
    pub fn extents(&self) -> Extents {
        self.index.extents()
    }

    #[inline]
    pub fn backend(&self) -> IndexBackend {
        self.index.backend()
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len_live()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow the reserved extents by `extra_x` and `extra_y`. Negative deltas
    /// are rejected and leave the store unchanged.
    pub fn reserve(&mut self, extra_x: i64, extra_y: i64) -> Result<()> {
        if extra_x < 0 || extra_y < 0 {
            tracing::warn!(extra_x, extra_y, "refusing negative reservation");
            return Err(StoreError::NegativeGrowth { extra_x, extra_y });
        }
        let target = self.extents().grown(extra_x as u64, extra_y as u64);
        self.grow_to(target, None);
        Ok(())
    }

    fn grow_to(&mut self, target: Extents, trigger: Option<(i64, i64)>) {
        let from = self.extents();
        if target == from {
            return;
        }
        self.index.grow(target, self.max_dense_cells);
        tracing::debug!(
            backend = self.backend().as_str(),
            from_x = from.x_limit,
            from_y = from.y_limit,
            to_x = target.x_limit,
            to_y = target.y_limit,
            ?trigger,
            "reserved extents grown"
        );
    }

    /// Store `value` at `(x, y)` and return its slot.
    ///
    /// An existing value at the same coordinate is overwritten in place and
    /// keeps its slot. Otherwise the most recently freed slot is reused, or a
    /// new one appended. Coordinates outside the reserved extents grow them
    /// first, per the configured `GrowthPolicy`. Fails only once every `u32`
    /// slot id is live.
    pub fn set(&mut self, x: i64, y: i64, value: T) -> Result<SlotId> {
        let extents = self.extents();
        if !extents.contains(x, y) {
            let amount = self.growth.grow_amount(extents, x, y);
            self.grow_to(extents.grown(amount, amount), Some((x, y)));
            debug_assert!(self.extents().contains(x, y));
        }

        if let Some(id) = self.index.get(x, y) {
            self.slots.replace(id, value);
            return Ok(id);
        }
        let id = self.slots.alloc(value)?;
        self.index.bind(x, y, id);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<&T> {
        self.slots.get(self.index.get(x, y)?)
    }

    #[inline]
    pub fn get_mut(&mut self, x: i64, y: i64) -> Option<&mut T> {
        let id = self.index.get(x, y)?;
        self.slots.get_mut(id)
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.index.get(x, y).is_some()
    }

    /// Slot currently bound to `(x, y)`.
    #[inline]
    pub fn slot_of(&self, x: i64, y: i64) -> Option<SlotId> {
        self.index.get(x, y)
    }

    /// Remove and return the value at `(x, y)`. Its slot goes onto the free
    /// list; the extents are untouched.
    pub fn unset(&mut self, x: i64, y: i64) -> Option<T> {
        let id = self.index.clear(x, y)?;
        let value = self.slots.release(id);
        debug_assert!(value.is_some(), "index bound ({x},{y}) to free slot {}", id.0);
        value
    }

    /// Values stored in the closed square
    /// `[ox - radius, ox + radius] × [oy - radius, oy + radius]`, in no
    /// particular order.
    pub fn near(&self, ox: i64, oy: i64, radius: u64) -> Vec<&T> {
        let mut found = Vec::new();
        self.scan_near(ox, oy, radius, |_, value| found.push(value));
        found
    }

    /// Like `near`, with each value's coordinate.
    pub fn near_entries(&self, ox: i64, oy: i64, radius: u64) -> Vec<((i64, i64), &T)> {
        let mut found = Vec::new();
        self.scan_near(ox, oy, radius, |coord, value| found.push((coord, value)));
        found
    }

    fn scan_near<'a>(
        &'a self,
        ox: i64,
        oy: i64,
        radius: u64,
        mut f: impl FnMut((i64, i64), &'a T),
    ) {
        let xs = (ox.saturating_sub_unsigned(radius), ox.saturating_add_unsigned(radius));
        let ys = (oy.saturating_sub_unsigned(radius), oy.saturating_add_unsigned(radius));
        let slots = &self.slots;
        self.index.scan_box(xs, ys, |x, y, id| {
            if let Some(value) = slots.get(id) {
                f((x, y), value);
            }
        });
    }

    /// Every stored value with its coordinate, in index order.
    pub fn iter(&self) -> impl Iterator<Item = ((i64, i64), &T)> + '_ {
        self.index
            .iter()
            .filter_map(|(coord, id)| self.slots.get(id).map(|value| (coord, value)))
    }

    /// Read-only view of the coordinate index.
    pub fn space(&self) -> SpaceView<'_> {
        SpaceView { index: &self.index }
    }

    /// Read-only view of the slot table. Index 0 is the sentinel; freed
    /// slots read `None`.
    #[inline]
    pub fn storage(&self) -> &[Option<T>] {
        self.slots.as_slice()
    }

    /// Freed slots, in the order they will be handed out last-first.
    #[inline]
    pub fn free_slots(&self) -> &[SlotId] {
        self.slots.free_slots()
    }
}

/// Borrowed view of a store's coordinate index, for diagnostics.
pub struct SpaceView<'a> {
    index: &'a CoordIndex,
}

impl<'a> SpaceView<'a> {
    pub fn extents(&self) -> Extents {
        self.index.extents()
    }

    pub fn backend(&self) -> IndexBackend {
        self.index.backend()
    }

    /// Slot bound at `(x, y)`. `None` for empty or uncovered coordinates.
    pub fn slot_at(&self, x: i64, y: i64) -> Option<SlotId> {
        self.index.get(x, y)
    }

    /// Whether `(x, y)` is inside the reserved extents.
    pub fn covers(&self, x: i64, y: i64) -> bool {
        self.index.extents().contains(x, y)
    }

    /// All `(coordinate, slot)` bindings.
    pub fn bindings(&self) -> impl Iterator<Item = ((i64, i64), SlotId)> + 'a {
        self.index.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stores() -> [Memory2D<&'static str>; 2] {
        [IndexBackend::Dense, IndexBackend::Sparse]
            .map(|b| Memory2D::with_config(Memory2DConfig::default().index(b)))
    }

    #[test]
    fn first_write_grows_by_minimum_quantum() {
        for mut mem in stores() {
            assert_eq!(mem.extents(), Extents::ZERO);
            mem.set(3, -4, "a").unwrap();
            assert_eq!(mem.extents(), Extents::new(100, 100));
            mem.set(-250, 0, "b").unwrap();
            assert_eq!(mem.extents(), Extents::new(251, 251));
        }
    }

    #[test]
    fn overwrite_keeps_slot() {
        for mut mem in stores() {
            let a = mem.set(1, 1, "a").unwrap();
            let b = mem.set(1, 1, "b").unwrap();
            assert_eq!(a, b);
            assert_eq!(mem.get(1, 1), Some(&"b"));
            assert_eq!(mem.storage().len(), 2);
            assert_eq!(mem.len(), 1);
        }
    }

    #[test]
    fn unset_pushes_slot_and_set_pops_it() {
        for mut mem in stores() {
            mem.set(0, 0, "a").unwrap();
            let b = mem.set(5, 5, "b").unwrap();
            mem.set(-5, -5, "c").unwrap();

            assert_eq!(mem.unset(5, 5), Some("b"));
            assert_eq!(mem.free_slots(), &[b]);
            assert_eq!(mem.storage()[b.index()], None);
            assert_eq!(mem.space().slot_at(5, 5), None);

            assert_eq!(mem.set(7, -7, "d").unwrap(), b);
            assert!(mem.free_slots().is_empty());
        }
    }

    #[test]
    fn unset_outside_extents_is_silent() {
        for mut mem in stores() {
            assert_eq!(mem.unset(10_000, 0), None);
            assert_eq!(mem.extents(), Extents::ZERO);
            mem.set(0, 0, "a").unwrap();
            assert_eq!(mem.unset(1, 1), None);
            assert!(mem.free_slots().is_empty());
        }
    }

    #[test]
    fn negative_reserve_is_rejected() {
        for mut mem in stores() {
            mem.reserve(4, 4).unwrap();
            let err = mem.reserve(-1, 3).unwrap_err();
            assert_eq!(err, StoreError::NegativeGrowth { extra_x: -1, extra_y: 3 });
            assert_eq!(mem.extents(), Extents::new(4, 4));
            mem.reserve(0, 0).unwrap();
            assert_eq!(mem.extents(), Extents::new(4, 4));
        }
    }

    #[test]
    fn dense_store_past_cell_cap_keeps_its_contents() {
        let config = Memory2DConfig::default()
            .index(IndexBackend::Dense)
            .max_dense_cells(100_000);
        let mut mem = Memory2D::with_config(config);
        mem.set(0, 0, 1u8).unwrap();
        mem.set(-99, 99, 2).unwrap();
        assert_eq!(mem.backend(), IndexBackend::Dense);

        mem.set(1_000_000, 0, 3).unwrap();
        assert_eq!(mem.backend(), IndexBackend::Sparse);
        assert!(mem.extents().contains(1_000_000, 0));
        assert_eq!(mem.get(0, 0), Some(&1));
        assert_eq!(mem.get(-99, 99), Some(&2));
        assert_eq!(mem.get(1_000_000, 0), Some(&3));
        assert_eq!(mem.len(), 3);
        assert_eq!(mem.near(0, 0, 100).len(), 2);
    }

    #[test]
    fn default_store_takes_moderate_coordinates() {
        let mut mem = Memory2D::<u8>::new();
        mem.set(9000, 0, 1).unwrap();
        assert_eq!(mem.get(9000, 0), Some(&1));
        mem.reserve(20_000, 20_000).unwrap();
        assert!(mem.extents().contains(-29_000, 29_000));
        assert_eq!(mem.get(9000, 0), Some(&1));
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut mem = Memory2D::new();
        mem.set(2, 3, vec![1]).unwrap();
        mem.get_mut(2, 3).unwrap().push(2);
        assert_eq!(mem.get(2, 3), Some(&vec![1, 2]));
        assert!(mem.get_mut(3, 2).is_none());
    }

    #[test]
    fn near_handles_extreme_origin() {
        let config = Memory2DConfig::default().index(IndexBackend::Sparse);
        let mut mem = Memory2D::with_config(config);
        mem.set(i64::MAX, i64::MIN, "corner").unwrap();
        assert_eq!(mem.near(i64::MAX, i64::MIN, 3), vec![&"corner"]);
        assert_eq!(mem.near(i64::MAX - 5, i64::MIN, 4), Vec::<&&str>::new());
        assert_eq!(mem.near(0, 0, u64::MAX).len(), 1);
    }

    #[test]
    fn space_view_reports_bindings() {
        for mut mem in stores() {
            let id = mem.set(-3, 8, "x").unwrap();
            let space = mem.space();
            assert!(space.covers(99, -99));
            assert!(!space.covers(100, 0));
            assert_eq!(space.slot_at(-3, 8), Some(id));
            assert_eq!(space.bindings().collect::<Vec<_>>(), vec![((-3, 8), id)]);
        }
    }
}
