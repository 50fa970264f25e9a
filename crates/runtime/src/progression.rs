//! Character level curve.

use serde::{Deserialize, Serialize};

/// Cumulative experience thresholds. Reaching `thresholds[n]` means level `n + 2`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCurve {
    thresholds: Vec<u64>,
}

impl LevelCurve {
    /// Builds a curve; thresholds are sorted so lookups stay monotonic.
    pub fn new(mut thresholds: Vec<u64>) -> Self {
        thresholds.sort_unstable();
        thresholds.dedup();
        Self { thresholds }
    }

    /// Level reached with `total` experience. Never below 1.
    pub fn level_for(&self, total: u64) -> u32 {
        let reached = self.thresholds.partition_point(|&threshold| threshold <= total);
        u32::try_from(reached).map_or(u32::MAX, |reached| reached.saturating_add(1))
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::new(vec![100, 250, 450, 700, 1000])
    }
}
