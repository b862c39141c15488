//! Error types for axis-servo.
//!
//! Configuration mistakes, mechanical faults, communication faults and
//! operator cancellation are kept apart so that orchestration code can
//! decide whether to retry, alert, or silently stop.

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all axis-servo operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Configuration parsing or validation error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Runtime axis error
    #[error("Axis error: {0}")]
    Axis(#[from] AxisError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    #[error("Parse error: {0}")]
    ParseError(heapless::String<128>),
    /// Axis name not found in configuration
    #[error("Axis '{0}' not found")]
    AxisNotFound(heapless::String<32>),
    /// A controller already exists for this axis
    #[error("Axis '{0}' already has a controller")]
    AxisInUse(heapless::String<32>),
    /// Safe range is empty or inverted
    #[error("Invalid safe range: min ({min}) must be < max ({max})")]
    InvalidSafeRange {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Tolerance must be strictly positive
    #[error("Invalid tolerance: {0}. Must be > 0")]
    InvalidTolerance(f64),
    /// Gain must be strictly positive
    #[error("Invalid gain: {0}. Must be > 0")]
    InvalidGain(f64),
    /// Gain table has no room for another breakpoint
    #[error("Too many gain breakpoints (max {max})")]
    TooManyBreakpoints {
        /// Table capacity
        max: usize,
    },
    /// Gain breakpoints must not raise the gain closer to the target
    #[error("Gain breakpoint below {below} uses gain {gain}, larger than the coarser gain {coarser}")]
    GainNotDecreasing {
        /// Breakpoint threshold
        below: f64,
        /// Gain of the breakpoint
        gain: f64,
        /// Gain that applies just above the breakpoint
        coarser: f64,
    },
    /// At least one convergence iteration is required
    #[error("max_iterations must be at least 1")]
    InvalidIterations,
    /// Poll interval must be non-zero
    #[error("poll_interval_ms must be > 0")]
    InvalidPollInterval,
    /// Per-move timeout must cover at least one poll
    #[error("per_move_timeout_ms ({timeout_ms}) is shorter than poll_interval_ms ({poll_ms})")]
    InvalidTimeout {
        /// Configured timeout
        timeout_ms: u32,
        /// Configured poll interval
        poll_ms: u32,
    },
    /// Speed tier thresholds are out of order
    #[error("Invalid speed thresholds: medium_above ({medium}) must be <= coarse_above ({coarse})")]
    InvalidSpeedThresholds {
        /// Coarse threshold
        coarse: u32,
        /// Medium threshold
        medium: u32,
    },
    /// Retry count must allow at least one attempt
    #[error("retry_attempts must be at least 1")]
    InvalidRetryAttempts,
    /// Relative move cap must be finite and positive
    #[error("Invalid max_relative_move: {0}. Must be > 0")]
    InvalidMaxRelativeMove(f64),
    /// Fine-approach window is malformed
    #[error("Invalid fine approach window ({lower}, {upper}) with divisor {divisor}")]
    InvalidFineApproach {
        /// Lower bound of the window
        lower: f64,
        /// Upper bound of the window
        upper: f64,
        /// Proposal divisor
        divisor: i64,
    },
    /// A builder was finished without a required component
    #[error("{0} is required")]
    MissingComponent(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    IoError(heapless::String<128>),
}

/// Transient I/O fault talking to a drive or encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommError {
    /// Device did not answer in time
    #[error("device did not respond")]
    Timeout,
    /// Serial or bus link fault
    #[error("communication link fault")]
    Link,
    /// Device answered with an error or garbled frame
    #[error("device rejected the command")]
    Rejected,
}

/// Position encoder session and read errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderError {
    /// Read attempted outside a connected session
    #[error("encoder is not connected")]
    NotConnected,
    /// Another owner holds the encoder session lock
    #[error("encoder is already in use")]
    Busy,
    /// Transient communication fault
    #[error("encoder communication fault: {0}")]
    Comm(#[from] CommError),
}

/// Errors surfaced by an axis controller.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisError {
    /// Requested target lies outside the safe envelope; nothing was moved
    #[error("target {target} outside safe range [{min}, {max}]")]
    OutOfRange {
        /// Requested target
        target: f64,
        /// Safe minimum
        min: f64,
        /// Safe maximum
        max: f64,
    },
    /// Relative move larger than the axis allows in one call; nothing was moved
    #[error("relative move of {magnitude} exceeds the limit of {max}")]
    MoveTooLarge {
        /// Requested magnitude
        magnitude: f64,
        /// Configured limit
        max: f64,
    },
    /// The axis left its safe envelope while moving
    #[error("position {position} left safe range [{min}, {max}], motor stopped")]
    RangeViolation {
        /// Observed position
        position: f64,
        /// Safe minimum
        min: f64,
        /// Safe maximum
        max: f64,
    },
    /// Iteration budget exhausted before reaching tolerance
    #[error("no convergence after {iterations} moves, residual error {residual}")]
    ConvergenceExceeded {
        /// Moves issued
        iterations: u32,
        /// Last measured error
        residual: f64,
    },
    /// Drive communication failed after retries
    #[error("motor drive: {0}")]
    Comm(#[from] CommError),
    /// Encoder session or read failed
    #[error("position encoder: {0}")]
    Encoder(#[from] EncoderError),
    /// Cancellation requested by the operator
    #[error("operation cancelled")]
    Cancelled,
    /// Reference search ran out of time
    #[error("reference mark not found")]
    ReferenceNotFound,
}

/// Coarse classification of an [`AxisError`] for upstream orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorClass {
    /// Caller asked for something the configuration forbids
    Configuration,
    /// Physical fault or failure to converge
    Mechanical,
    /// Drive or encoder could not be reached
    Communication,
    /// Normal abnormal termination
    Cancelled,
}

impl AxisError {
    /// Classify the error.
    pub fn class(&self) -> ErrorClass {
        match self {
            AxisError::OutOfRange { .. } | AxisError::MoveTooLarge { .. } => {
                ErrorClass::Configuration
            }
            AxisError::RangeViolation { .. }
            | AxisError::ConvergenceExceeded { .. }
            | AxisError::ReferenceNotFound => ErrorClass::Mechanical,
            AxisError::Comm(_) | AxisError::Encoder(_) => ErrorClass::Communication,
            AxisError::Cancelled => ErrorClass::Cancelled,
        }
    }

    /// Whether calling the same operation again from scratch may succeed.
    ///
    /// A range violation needs an operator; a bad target stays bad.
    pub fn is_retryable(&self) -> bool {
        match self {
            AxisError::OutOfRange { .. }
            | AxisError::MoveTooLarge { .. }
            | AxisError::RangeViolation { .. } => false,
            AxisError::Encoder(EncoderError::Busy) => false,
            AxisError::ConvergenceExceeded { .. }
            | AxisError::Comm(_)
            | AxisError::Encoder(_)
            | AxisError::Cancelled
            | AxisError::ReferenceNotFound => true,
        }
    }
}

/// Marks errors worth retrying on a single driver call.
pub trait Transient {
    /// Whether the fault may go away on its own.
    fn is_transient(&self) -> bool;
}

impl Transient for CommError {
    fn is_transient(&self) -> bool {
        true
    }
}

impl Transient for EncoderError {
    fn is_transient(&self) -> bool {
        matches!(self, EncoderError::Comm(_))
    }
}
