//! Configuration validation.

use crate::error::{ConfigError, Result};

use super::{AxisConfig, SystemConfig};

/// Validate a system configuration.
///
/// Every axis must pass [`validate_axis`].
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_, axis) in config.axes.iter() {
        validate_axis(axis)?;
    }

    Ok(())
}

/// Validate a single axis configuration.
///
/// Checks:
/// - Safe range is finite and non-empty
/// - Tolerance and every gain are positive
/// - Finer gain breakpoints never raise the gain (keeps proposals
///   monotonic in the error)
/// - Iteration, poll, timeout and retry budgets are usable
/// - Speed thresholds and fine-approach window are ordered
/// - The relative move cap, when set, is finite and positive
pub fn validate_axis(config: &AxisConfig) -> core::result::Result<(), ConfigError> {
    let range = config.safe_range();
    if !range.is_valid() {
        return Err(ConfigError::InvalidSafeRange {
            min: config.safe_min,
            max: config.safe_max,
        });
    }

    if !(config.tolerance > 0.0) {
        return Err(ConfigError::InvalidTolerance(config.tolerance));
    }

    if !(config.gain.base > 0.0) {
        return Err(ConfigError::InvalidGain(config.gain.base));
    }

    for bp in config.gain.breakpoints.iter() {
        if !(bp.gain > 0.0) {
            return Err(ConfigError::InvalidGain(bp.gain));
        }
        if !(bp.below > 0.0) {
            return Err(ConfigError::InvalidTolerance(bp.below));
        }
        let coarser = config.gain.coarser_gain(bp.below);
        if bp.gain > coarser {
            return Err(ConfigError::GainNotDecreasing {
                below: bp.below,
                gain: bp.gain,
                coarser,
            });
        }
    }

    if config.max_iterations == 0 {
        return Err(ConfigError::InvalidIterations);
    }

    if config.poll_interval.is_zero() {
        return Err(ConfigError::InvalidPollInterval);
    }

    if config.per_move_timeout < config.poll_interval {
        return Err(ConfigError::InvalidTimeout {
            timeout_ms: config.per_move_timeout.value(),
            poll_ms: config.poll_interval.value(),
        });
    }

    if config.speed.medium_above > config.speed.coarse_above {
        return Err(ConfigError::InvalidSpeedThresholds {
            coarse: config.speed.coarse_above,
            medium: config.speed.medium_above,
        });
    }

    if config.retry_attempts == 0 {
        return Err(ConfigError::InvalidRetryAttempts);
    }

    if let Some(max) = config.max_relative_move {
        if !(max > 0.0) || !max.is_finite() {
            return Err(ConfigError::InvalidMaxRelativeMove(max));
        }
    }

    if let Some(window) = config.fine_approach {
        if !(window.lower >= 0.0) || !(window.upper > window.lower) || window.divisor < 1 {
            return Err(ConfigError::InvalidFineApproach {
                lower: window.lower,
                upper: window.upper,
                divisor: window.divisor,
            });
        }
    }

    Ok(())
}
