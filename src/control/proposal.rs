//! Step proposal: position error to signed step count.
//!
//! Pure computation, no I/O. The drive's step direction is opposite to the
//! encoder's positive direction, hence the leading minus sign.

use libm::{fabs, round};

use crate::config::AxisConfig;

/// A computed step proposal with its parts kept for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposal {
    /// Gain that was applied (steps per physical unit).
    pub gain: f64,
    /// Steps before backlash compensation.
    pub raw: i64,
    /// Extra steps taking up backlash on a reversal (signed).
    pub hysteresis: i64,
}

impl Proposal {
    /// The corrected step count to command.
    #[inline]
    pub fn steps(&self) -> i64 {
        self.raw.saturating_add(self.hysteresis)
    }
}

/// Map a position error to a signed step count.
///
/// `error` is `target - current`; `last_steps` is the previous commanded
/// move, used only to detect a reversal.
pub fn propose(error: f64, last_steps: i64, config: &AxisConfig) -> i64 {
    proposal(error, last_steps, config, 1).steps()
}

/// Like [`propose`], dividing the raw estimate by `damping` before backlash
/// compensation is added.
pub fn proposal(error: f64, last_steps: i64, config: &AxisConfig, damping: i64) -> Proposal {
    let gain = config.gain.gain_for(fabs(error));
    let raw = (round(error * gain) as i64).saturating_neg() / damping.max(1);
    let hysteresis = backlash_correction(raw, last_steps, config.hysteresis_offset);

    Proposal {
        gain,
        raw,
        hysteresis,
    }
}

/// Extra steps needed when `raw` reverses the direction of `last_steps`.
///
/// No previous move means no known backlash state, so no correction.
pub fn backlash_correction(raw: i64, last_steps: i64, hysteresis_offset: u32) -> i64 {
    if last_steps != 0 && raw.signum() != last_steps.signum() {
        raw.signum() * i64::from(hysteresis_offset)
    } else {
        0
    }
}
