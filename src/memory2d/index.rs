//! Coordinate index: resolves `(x, y)` to a `SlotId` inside the reserved
//! extents, backed either by a dense offset grid or a sparse hash map.

use super::coord_map::CoordMap;
use super::extents::Extents;
use super::grid::DenseGrid;
use super::slot::SlotId;

/// Coordinate index representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexBackend {
    /// Contiguous grid with one cell per covered coordinate. Reserving costs
    /// memory proportional to the covered area; lookups are a single load.
    /// Growth past the dense cell cap switches the index to `Sparse`.
    Dense,
    /// Hash map holding only bound coordinates. Reserving is free; suited to
    /// widely scattered data.
    Sparse,
}

impl IndexBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexBackend::Dense => "dense",
            IndexBackend::Sparse => "sparse",
        }
    }
}

impl std::str::FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dense" => Ok(IndexBackend::Dense),
            "sparse" => Ok(IndexBackend::Sparse),
            other => Err(format!("unknown index backend: {other} (expected dense or sparse)")),
        }
    }
}

pub(crate) enum CoordIndex {
    Dense(DenseGrid),
    Sparse { map: CoordMap, extents: Extents },
}

impl CoordIndex {
    pub fn new(backend: IndexBackend) -> Self {
        match backend {
            IndexBackend::Dense => CoordIndex::Dense(DenseGrid::new()),
            IndexBackend::Sparse => CoordIndex::Sparse {
                map: CoordMap::with_capacity(0),
                extents: Extents::ZERO,
            },
        }
    }

    #[inline]
    pub fn backend(&self) -> IndexBackend {
        match self {
            CoordIndex::Dense(_) => IndexBackend::Dense,
            CoordIndex::Sparse { .. } => IndexBackend::Sparse,
        }
    }

    #[inline]
    pub fn extents(&self) -> Extents {
        match self {
            CoordIndex::Dense(grid) => grid.extents(),
            CoordIndex::Sparse { extents, .. } => *extents,
        }
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<SlotId> {
        match self {
            CoordIndex::Dense(grid) => grid.get(x, y),
            CoordIndex::Sparse { map, extents } => {
                if extents.contains(x, y) {
                    map.get(x, y)
                } else {
                    None
                }
            }
        }
    }

    /// Bind a covered coordinate.
    #[inline]
    pub fn bind(&mut self, x: i64, y: i64, id: SlotId) {
        debug_assert!(self.extents().contains(x, y));
        debug_assert!(!id.is_empty());
        match self {
            CoordIndex::Dense(grid) => grid.bind(x, y, id),
            CoordIndex::Sparse { map, .. } => {
                map.insert(x, y, id);
            }
        }
    }

    #[inline]
    pub fn clear(&mut self, x: i64, y: i64) -> Option<SlotId> {
        match self {
            CoordIndex::Dense(grid) => grid.clear(x, y),
            CoordIndex::Sparse { map, extents } => {
                if extents.contains(x, y) {
                    map.remove(x, y)
                } else {
                    None
                }
            }
        }
    }

    /// Extend coverage to `target`. A dense grid that would outgrow
    /// `max_dense_cells` is rebuilt as a sparse map holding the same
    /// bindings, so growth always succeeds.
    pub fn grow(&mut self, target: Extents, max_dense_cells: usize) {
        let migrated = match self {
            CoordIndex::Dense(grid) => match DenseGrid::cells_for(target, max_dense_cells) {
                Some(cells) => {
                    grid.grow(target, cells);
                    None
                }
                None => {
                    let bindings: Vec<_> = grid.iter().collect();
                    tracing::info!(
                        cells = %target.cells(),
                        max = max_dense_cells,
                        bindings = bindings.len(),
                        "dense index over its cell cap, switching to sparse"
                    );
                    let mut map = CoordMap::with_capacity(bindings.len());
                    for ((x, y), id) in bindings {
                        map.insert(x, y, id);
                    }
                    Some(CoordIndex::Sparse {
                        map,
                        extents: target,
                    })
                }
            },
            CoordIndex::Sparse { extents, .. } => {
                *extents = target;
                None
            }
        };
        if let Some(next) = migrated {
            *self = next;
        }
    }

    /// Visit every binding in the closed box `[x0, x1] × [y0, y1]`. Parts of
    /// the box outside the extents are skipped.
    pub fn scan_box(
        &self,
        (x0, x1): (i64, i64),
        (y0, y1): (i64, i64),
        mut f: impl FnMut(i64, i64, SlotId),
    ) {
        let extents = self.extents();
        let (Some(xs), Some(ys)) = (extents.clip_x(x0, x1), extents.clip_y(y0, y1)) else {
            return;
        };
        match self {
            CoordIndex::Dense(grid) => grid.scan(xs, ys, f),
            CoordIndex::Sparse { map, .. } => {
                let width = (xs.1 as i128 - xs.0 as i128 + 1) as u128;
                let height = (ys.1 as i128 - ys.0 as i128 + 1) as u128;
                if width.saturating_mul(height) <= map.len() as u128 {
                    for x in xs.0..=xs.1 {
                        for y in ys.0..=ys.1 {
                            if let Some(id) = map.get(x, y) {
                                f(x, y, id);
                            }
                        }
                    }
                } else {
                    // Fewer bindings than cells: filter the bindings instead.
                    for ((x, y), id) in map.iter() {
                        if (xs.0..=xs.1).contains(&x) && (ys.0..=ys.1).contains(&y) {
                            f(x, y, id);
                        }
                    }
                }
            }
        }
    }

    /// All bindings, in backend order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = ((i64, i64), SlotId)> + '_> {
        match self {
            CoordIndex::Dense(grid) => Box::new(grid.iter()),
            CoordIndex::Sparse { map, .. } => Box::new(map.iter()),
        }
    }
}
