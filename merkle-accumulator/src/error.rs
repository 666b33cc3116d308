use thiserror::Error;

use crate::config::MAX_HEIGHT;

/// Alias for `core::result::Result<T, AccumulatorError>`.
pub type Result<T> = core::result::Result<T, AccumulatorError>;

/// Errors from accumulator operations.
///
/// Every variant is a programming or protocol error. Nothing here is
/// transient, so callers should not retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("capacity exceeded: {requested} leaves requested, capacity {capacity}")]
    CapacityExceeded { requested: u128, capacity: u128 },
    #[error("invalid level {level} (limit {limit})")]
    InvalidLevel { level: usize, limit: usize },
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    #[error("index {index} out of range at level {level} (width {width})")]
    IndexOutOfRange { index: u64, level: u8, width: u128 },
    #[error("value does not fit in 32 bytes ({bits} bits)")]
    ValueTooLarge { bits: u64 },
    #[error("value is not a field element")]
    InvalidFieldElement,
    #[error("root mismatch: expected {expected}, got {actual}")]
    RootMismatch { expected: String, actual: String },
    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Validate that a tree height can be served by the default table.
///
/// A tree of height `h` needs `defaults[h]`, so `h` must not exceed
/// [`MAX_HEIGHT`]. A taller tree is reported as asking for more leaves than
/// the tallest supported one holds.
pub(crate) fn validate_height(height: u8) -> Result<()> {
    if height > MAX_HEIGHT {
        return Err(AccumulatorError::CapacityExceeded {
            requested: 1u128.checked_shl(height.into()).unwrap_or(u128::MAX),
            capacity: capacity_for_height(MAX_HEIGHT.into()),
        });
    }
    Ok(())
}

/// Number of leaves a tree (or proof) of the given height can address.
pub(crate) fn capacity_for_height(height: usize) -> u128 {
    1u128 << height
}
