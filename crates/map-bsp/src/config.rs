//! Tunables of a BSP build.

use crate::error::{BuildError, Result};

/// Default weight of split and near-miss penalties.
pub const DEFAULT_SPLIT_COST_FACTOR: i32 = 7;

/// Settings for a [`Partitioner`](crate::Partitioner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionerConfig {
    /// Scales the penalty for splitting a segment and for passing close to
    /// a segment's endpoint. Higher values favour fewer splits over balance.
    pub split_cost_factor: i32,
}

impl Default for PartitionerConfig {
    fn default() -> Self {
        Self {
            split_cost_factor: DEFAULT_SPLIT_COST_FACTOR,
        }
    }
}

impl PartitionerConfig {
    /// Sets the split cost factor (builder pattern).
    pub fn with_split_cost_factor(mut self, factor: i32) -> Self {
        self.split_cost_factor = factor;
        self
    }

    /// Checks the settings before a build.
    pub fn validate(&self) -> Result<()> {
        if self.split_cost_factor < 0 {
            return Err(BuildError::InvalidSplitCostFactor(self.split_cost_factor));
        }
        Ok(())
    }
}
