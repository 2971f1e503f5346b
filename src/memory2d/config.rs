//! `Memory2DConfig`: per-instance knobs, with an environment fallback for
//! the index backend.

use super::extents::GrowthPolicy;
use super::index::IndexBackend;

/// Dense grid cell cap when none is configured (64 MiB of `SlotId`s).
/// Growing past it moves the index to the sparse backend.
pub const DEFAULT_MAX_DENSE_CELLS: usize = 1 << 24;

/// Configuration for a `Memory2D` instance.
///
/// Use `Memory2DConfig::default()` for the defaults, or adjust individual
/// knobs via the builder methods.
#[derive(Clone, Debug, Default)]
pub struct Memory2DConfig {
    /// Coordinate index backend.
    /// `None` reads `MEMORY2D_INDEX` (`dense` or `sparse`) and falls back to
    /// `Dense`.
    pub index: Option<IndexBackend>,
    /// Growth applied when `set` lands outside the reserved extents.
    pub growth: GrowthPolicy,
    /// Extents reserved at construction, per axis.
    pub prealloc: (u64, u64),
    /// Cell cap for the dense grid before it switches to sparse. `None`
    /// means `DEFAULT_MAX_DENSE_CELLS`.
    pub max_dense_cells: Option<usize>,
}

impl Memory2DConfig {
    /// Force a specific index backend.
    pub fn index(mut self, backend: IndexBackend) -> Self {
        self.index = Some(backend);
        self
    }

    pub fn growth(mut self, policy: GrowthPolicy) -> Self {
        self.growth = policy;
        self
    }

    /// Reserve `x` and `y` on each axis up front.
    pub fn prealloc(mut self, x: u64, y: u64) -> Self {
        self.prealloc = (x, y);
        self
    }

    pub fn max_dense_cells(mut self, n: usize) -> Self {
        self.max_dense_cells = Some(n);
        self
    }
}

/// Resolve the index backend from a config, falling back to the environment
/// and then to `Dense`.
pub(crate) fn resolve_index_backend(config: &Memory2DConfig) -> IndexBackend {
    if let Some(backend) = config.index {
        return backend;
    }
    match std::env::var("MEMORY2D_INDEX") {
        Ok(v) if !v.trim().is_empty() => v.parse().unwrap_or_else(|err| {
            tracing::warn!("ignoring MEMORY2D_INDEX: {err}");
            IndexBackend::Dense
        }),
        _ => IndexBackend::Dense,
    }
}

#[inline]
pub(crate) fn resolve_max_dense_cells(config: &Memory2DConfig) -> usize {
    config.max_dense_cells.unwrap_or(DEFAULT_MAX_DENSE_CELLS)
}
