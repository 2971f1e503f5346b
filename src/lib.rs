//! Sparse, grow-only two-dimensional store keyed by integer coordinates.
//!
//! `Memory2D<T>` maps `(x, y)` pairs, positive or negative, to values of
//! type `T`. Coordinates resolve through a coordinate index (a dense offset
//! grid or a sparse hash map) to slots in a flat slot table; freed slots are
//! recycled and reserved space is never released.

pub mod memory2d;
pub use memory2d::{
    Extents, GrowthPolicy, IndexBackend, Memory2D, Memory2DConfig, SlotId, SpaceView, StoreError,
};
