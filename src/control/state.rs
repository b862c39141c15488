//! Mutable per-axis loop state.

use core::time::Duration;

use super::speed::SpeedTier;

/// Phase of the convergence loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No operation running.
    #[default]
    Idle,
    /// Reading the encoder.
    Sampling,
    /// Computing the next move.
    Proposing,
    /// Commanding the drive.
    Moving,
    /// Polling a running move.
    Waiting,
    /// Last operation reached tolerance.
    Converged,
    /// Last operation was cancelled.
    Aborted,
    /// Last operation failed.
    Failed,
}

impl Phase {
    /// Phase name for display/debugging.
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Sampling => "Sampling",
            Phase::Proposing => "Proposing",
            Phase::Moving => "Moving",
            Phase::Waiting => "Waiting",
            Phase::Converged => "Converged",
            Phase::Aborted => "Aborted",
            Phase::Failed => "Failed",
        }
    }

    /// Whether the phase ends an operation.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Converged | Phase::Aborted | Phase::Failed)
    }
}

/// One absolute position reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Position in physical units.
    pub value: f64,
    /// Operation time at which the reading was taken.
    pub timestamp: Duration,
}

/// State owned by exactly one axis controller.
#[derive(Debug, Clone, Default)]
pub struct AxisState {
    /// Last commanded move; its sign remembers the backlash direction.
    pub last_commanded_steps: i64,
    /// Speed tier last sent to the drive, if any.
    pub current_speed_tier: Option<SpeedTier>,
    /// Moves issued by the running (or last) operation.
    pub iteration_count: u32,
    /// Current loop phase.
    pub phase: Phase,
    /// Last position observed, for status displays only.
    pub last_sample: Option<PositionSample>,
}

impl AxisState {
    /// Fresh state for a new controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commanded move. Called once per physical move.
    #[inline]
    pub fn record_move(&mut self, steps: i64) {
        self.last_commanded_steps = steps;
    }
}
