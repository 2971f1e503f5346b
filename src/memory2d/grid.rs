//! `DenseGrid`: contiguous offset-addressed coordinate index.
//!
//! One `SlotId` per covered coordinate, laid out in x-major columns:
//! `cells[(x + x_limit - 1) * height + (y + y_limit - 1)]`, where
//! `width = 2·x_limit - 1` and `height = 2·y_limit - 1`. Growing re-lays the
//! grid so that the old block lands centred in the new one.

use super::extents::Extents;
use super::slot::SlotId;

pub(crate) struct DenseGrid {
    cells: Vec<SlotId>,
    extents: Extents,
    height: usize,
}

impl DenseGrid {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            extents: Extents::ZERO,
            height: 0,
        }
    }

    #[inline]
    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// Cell offset of a covered coordinate.
    #[inline(always)]
    fn offset(&self, x: i64, y: i64) -> usize {
        debug_assert!(self.extents.contains(x, y));
        // Exact modulo 2^64: the true offsets are below `cells.len()`.
        let col = (x as u64).wrapping_add(self.extents.x_limit - 1) as usize;
        let row = (y as u64).wrapping_add(self.extents.y_limit - 1) as usize;
        col * self.height + row
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<SlotId> {
        if !self.extents.contains(x, y) {
            return None;
        }
        let id = self.cells[self.offset(x, y)];
        (!id.is_empty()).then_some(id)
    }

    /// Bind a covered coordinate to `id`.
    #[inline]
    pub fn bind(&mut self, x: i64, y: i64, id: SlotId) {
        let at = self.offset(x, y);
        self.cells[at] = id;
    }

    /// Reset a coordinate to empty, returning what was bound there.
    pub fn clear(&mut self, x: i64, y: i64) -> Option<SlotId> {
        if !self.extents.contains(x, y) {
            return None;
        }
        let at = self.offset(x, y);
        let id = std::mem::replace(&mut self.cells[at], SlotId::EMPTY);
        (!id.is_empty()).then_some(id)
    }

    /// Cell count for `target`, or `None` past `max_cells`.
    pub fn cells_for(target: Extents, max_cells: usize) -> Option<usize> {
        usize::try_from(target.cells())
            .ok()
            .filter(|&n| n <= max_cells)
    }

    /// Grow to cover `target`. The caller validates the size first with
    /// `cells_for`; existing bindings keep their coordinates.
    pub fn grow(&mut self, target: Extents, cells: usize) {
        debug_assert!(target.x_limit >= self.extents.x_limit);
        debug_assert!(target.y_limit >= self.extents.y_limit);
        debug_assert_eq!(cells as u128, target.cells());
        if target == self.extents {
            return;
        }

        let height = if target.is_empty() {
            0
        } else {
            (2 * target.y_limit - 1) as usize
        };
        let mut next = vec![SlotId::EMPTY; cells];

        if !self.cells.is_empty() {
            let dx = (target.x_limit - self.extents.x_limit) as usize;
            let dy = (target.y_limit - self.extents.y_limit) as usize;
            for (col, column) in self.cells.chunks_exact(self.height).enumerate() {
                let start = (col + dx) * height + dy;
                next[start..start + self.height].copy_from_slice(column);
            }
        }

        self.cells = next;
        self.height = height;
        self.extents = target;
    }

    /// Visit every binding inside the closed box `[x0, x1] × [y0, y1]`,
    /// which must already be clipped to the extents.
    pub fn scan(
        &self,
        (x0, x1): (i64, i64),
        (y0, y1): (i64, i64),
        mut f: impl FnMut(i64, i64, SlotId),
    ) {
        for x in x0..=x1 {
            let base = self.offset(x, y0);
            let span = (y1 - y0) as usize + 1;
            for (dy, &id) in self.cells[base..base + span].iter().enumerate() {
                if !id.is_empty() {
                    f(x, y0 + dy as i64, id);
                }
            }
        }
    }

    /// All bindings, column by column.
    pub fn iter(&self) -> impl Iterator<Item = ((i64, i64), SlotId)> + '_ {
        let x_base = 1i64.wrapping_sub(self.extents.x_limit as i64);
        let y_base = 1i64.wrapping_sub(self.extents.y_limit as i64);
        let height = self.height.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, id)| !id.is_empty())
            .map(move |(i, &id)| {
                let x = x_base + (i / height) as i64;
                let y = y_base + (i % height) as i64;
                ((x, y), id)
            })
    }
}
