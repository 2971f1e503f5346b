//! Memory2D store internals and public API.

mod config;
mod coord_map;
mod error;
mod extents;
mod grid;
mod index;
mod slot;
mod store;

pub use config::{DEFAULT_MAX_DENSE_CELLS, Memory2DConfig};
pub use error::{Result, StoreError};
pub use extents::{Extents, GrowthPolicy, MAX_LIMIT, MINIMUM_ALLOC};
pub use index::IndexBackend;
pub use slot::SlotId;
pub use store::{Memory2D, SpaceView};
