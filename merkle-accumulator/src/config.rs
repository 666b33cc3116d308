use crate::{error::validate_height, Result};

/// Tallest tree that can be built; `defaults[height]` must exist.
pub const MAX_HEIGHT: u8 = 63;

/// Height used when none is configured; matches the depth of the shielded
/// pool's note tree.
pub const DEFAULT_HEIGHT: u8 = 48;

/// Tree construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccumulatorConfig {
    /// Number of levels below the root (proof length). Capacity is
    /// `2^height` leaves.
    pub height: u8,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
        }
    }
}

impl AccumulatorConfig {
    /// Config for a tree of the given height.
    pub fn with_height(height: u8) -> Self {
        Self { height }
    }

    /// Check the settings without building a tree.
    pub fn validate(&self) -> Result<()> {
        validate_height(self.height)
    }
}
