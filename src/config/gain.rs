//! Magnitude-dependent step gain.

use heapless::Vec;
use serde::Deserialize;

use crate::error::ConfigError;

/// Maximum number of gain breakpoints per axis.
pub const MAX_BREAKPOINTS: usize = 4;

/// A finer gain that takes over once `|error|` drops below `below`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GainBreakpoint {
    /// Error magnitude (physical units) under which this gain applies.
    pub below: f64,
    /// Steps per physical unit.
    pub gain: f64,
}

/// Steps-per-unit gain, coarse far from the target and finer close to it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GainSchedule {
    /// Gain used when no breakpoint applies.
    pub base: f64,

    /// Optional finer gains, in any order.
    #[serde(default)]
    pub breakpoints: Vec<GainBreakpoint, MAX_BREAKPOINTS>,
}

impl GainSchedule {
    /// Single-tier schedule.
    pub fn constant(base: f64) -> Self {
        Self {
            base,
            breakpoints: Vec::new(),
        }
    }

    /// Add a breakpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooManyBreakpoints`] once the table holds
    /// [`MAX_BREAKPOINTS`] entries.
    pub fn with_breakpoint(mut self, below: f64, gain: f64) -> Result<Self, ConfigError> {
        self.breakpoints
            .push(GainBreakpoint { below, gain })
            .map_err(|_| ConfigError::TooManyBreakpoints {
                max: MAX_BREAKPOINTS,
            })?;
        Ok(self)
    }

    /// Gain for an error of magnitude `abs_error`.
    ///
    /// The tightest breakpoint whose threshold exceeds `abs_error` wins.
    pub fn gain_for(&self, abs_error: f64) -> f64 {
        self.breakpoints
            .iter()
            .filter(|bp| abs_error < bp.below)
            .min_by(|a, b| a.below.total_cmp(&b.below))
            .map(|bp| bp.gain)
            .unwrap_or(self.base)
    }

    /// Gain in force just above a breakpoint threshold.
    pub fn coarser_gain(&self, below: f64) -> f64 {
        self.breakpoints
            .iter()
            .filter(|bp| bp.below > below)
            .min_by(|a, b| a.below.total_cmp(&b.below))
            .map(|bp| bp.gain)
            .unwrap_or(self.base)
    }
}
