//! Error type for the fallible store operations.
//!
//! Reads never fail: out-of-extent or empty coordinates come back as `None`.
//! Only a negative reservation and slot exhaustion refuse a request.

/// Errors raised by `Memory2D`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// `reserve` was called with a negative delta on at least one axis.
    #[error("reserved extents only grow: got extra_x={extra_x}, extra_y={extra_y}")]
    NegativeGrowth { extra_x: i64, extra_y: i64 },

    /// Every `u32` slot identifier is live.
    #[error("slot table exhausted: all {} slot identifiers are live", u32::MAX)]
    SlotsExhausted,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
