//! Axis configuration from TOML.

use core::time::Duration;

use heapless::String;
use serde::Deserialize;

use super::gain::GainSchedule;
use super::limits::SafeRange;
use super::units::{Millis, PhysicalUnit};

/// Complete per-axis configuration.
///
/// Created once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Unit positions are measured in.
    #[serde(default)]
    pub unit: PhysicalUnit,

    /// Lowest position the axis may reach.
    pub safe_min: f64,

    /// Highest position the axis may reach.
    pub safe_max: f64,

    /// Convergence threshold in physical units.
    pub tolerance: f64,

    /// Proposals smaller than this many steps count as converged.
    #[serde(default = "default_step_tolerance")]
    pub step_tolerance: u32,

    /// Steps of lost motion taken up when the drive reverses.
    #[serde(default)]
    pub hysteresis_offset: u32,

    /// Size of the trailing move that relieves backlash preload.
    #[serde(default = "default_anti_creep_steps")]
    pub anti_creep_steps: u32,

    /// Steps-per-unit gain schedule.
    pub gain: GainSchedule,

    /// Drive speed selection thresholds.
    #[serde(default)]
    pub speed: SpeedThresholds,

    /// Optional settle-and-halve window near the target.
    #[serde(default)]
    pub fine_approach: Option<FineApproach>,

    /// Largest magnitude a single relative move may request. Unlimited
    /// when absent.
    #[serde(default)]
    pub max_relative_move: Option<f64>,

    /// Moves allowed per `set_position` call.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Longest wait for a single move before re-sampling.
    #[serde(default = "default_per_move_timeout", rename = "per_move_timeout_ms")]
    pub per_move_timeout: Millis,

    /// Interval between motion polls.
    #[serde(default = "default_poll_interval", rename = "poll_interval_ms")]
    pub poll_interval: Millis,

    /// Attempts per single driver call.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u8,

    /// Upper bound for a reference mark search.
    #[serde(default = "default_reference_timeout", rename = "reference_timeout_ms")]
    pub reference_timeout: Millis,
}

/// Step magnitudes at which the drive switches speed tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpeedThresholds {
    /// Moves larger than this run at coarse speed.
    pub coarse_above: u32,
    /// Moves larger than this (and not coarse) run at medium speed.
    pub medium_above: u32,
}

impl Default for SpeedThresholds {
    fn default() -> Self {
        Self {
            coarse_above: 5000,
            medium_above: 500,
        }
    }
}

/// Window close to the target where the axis is allowed to settle and
/// the proposal is damped.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FineApproach {
    /// Window lower bound on `|error|` (exclusive).
    pub lower: f64,
    /// Window upper bound on `|error|` (exclusive).
    pub upper: f64,
    /// Settle time before re-reading the position.
    #[serde(rename = "settle_ms")]
    pub settle: Millis,
    /// Divisor applied to the proposal inside the window.
    #[serde(default = "default_divisor")]
    pub divisor: i64,
}

impl FineApproach {
    /// Whether `abs_error` falls in the window.
    pub fn contains(&self, abs_error: f64) -> bool {
        self.lower < abs_error && abs_error < self.upper
    }
}

fn default_step_tolerance() -> u32 {
    1
}

fn default_anti_creep_steps() -> u32 {
    10
}

fn default_max_iterations() -> u32 {
    25
}

fn default_per_move_timeout() -> Millis {
    Millis(60_000)
}

fn default_poll_interval() -> Millis {
    Millis(100)
}

fn default_retry_attempts() -> u8 {
    3
}

fn default_reference_timeout() -> Millis {
    Millis(120_000)
}

fn default_divisor() -> i64 {
    2
}

impl AxisConfig {
    /// Configuration with defaults for everything but the essentials.
    pub fn new(name: &str, safe_min: f64, safe_max: f64, tolerance: f64, gain: GainSchedule) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            unit: PhysicalUnit::default(),
            safe_min,
            safe_max,
            tolerance,
            step_tolerance: default_step_tolerance(),
            hysteresis_offset: 0,
            anti_creep_steps: default_anti_creep_steps(),
            gain,
            speed: SpeedThresholds::default(),
            fine_approach: None,
            max_relative_move: None,
            max_iterations: default_max_iterations(),
            per_move_timeout: default_per_move_timeout(),
            poll_interval: default_poll_interval(),
            retry_attempts: default_retry_attempts(),
            reference_timeout: default_reference_timeout(),
        }
    }

    /// The safe envelope.
    #[inline]
    pub fn safe_range(&self) -> SafeRange {
        SafeRange::new(self.safe_min, self.safe_max)
    }

    /// Poll interval as a `Duration`.
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.as_duration()
    }

    /// Per-move timeout as a `Duration`.
    #[inline]
    pub fn per_move_timeout(&self) -> Duration {
        self.per_move_timeout.as_duration()
    }
}
