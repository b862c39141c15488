//! Drive speed tiers.

use crate::config::SpeedThresholds;

/// Drive speed selected from the size of the next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedTier {
    /// Large moves far from the target.
    Coarse,
    /// Intermediate moves.
    Medium,
    /// Near-target moves, slowest to avoid overshoot.
    Fine,
}

impl SpeedTier {
    /// Pick the tier for a move of `steps` (sign ignored).
    pub fn for_steps(steps: i64, thresholds: &SpeedThresholds) -> Self {
        let magnitude = steps.unsigned_abs();
        if magnitude > u64::from(thresholds.coarse_above) {
            SpeedTier::Coarse
        } else if magnitude > u64::from(thresholds.medium_above) {
            SpeedTier::Medium
        } else {
            SpeedTier::Fine
        }
    }

    /// Tier name for display/debugging.
    pub const fn name(self) -> &'static str {
        match self {
            SpeedTier::Coarse => "coarse",
            SpeedTier::Medium => "medium",
            SpeedTier::Fine => "fine",
        }
    }
}
