//! Closed-loop axis controller.
//!
//! Generic over the drive, the encoder, the poll delay provider and the
//! cancellation token. One controller per physical axis; it owns its state
//! and never shares it.

use embedded_hal::delay::DelayNs;
use libm::fabs;
use tracing::{info, info_span, warn};

use crate::config::AxisConfig;
use crate::control::{
    check_target, AxisState, Convergence, ConvergenceLoop, Direction, Phase, PositionSample,
    SpeedTier,
};
use crate::error::AxisError;
use crate::hal::{EncoderSession, MotorDrive, PositionEncoder};
use crate::interrupt::{Cancellable, InterruptibleDelay};
use crate::retry::{retry, RetryPolicy};

/// Position controller for one stepper axis with encoder feedback.
pub struct AxisController<M, E, D, C>
where
    M: MotorDrive,
    E: PositionEncoder,
    D: DelayNs,
    C: Cancellable,
{
    /// Immutable axis constants.
    pub(super) config: AxisConfig,

    /// Loop state, written only by this controller.
    pub(super) state: AxisState,

    /// Stepper drive.
    pub(super) motor: M,

    /// Absolute encoder.
    pub(super) encoder: E,

    /// Poll timer carrying the cancellation token.
    pub(super) timer: InterruptibleDelay<D, C>,
}

impl<M, E, D, C> AxisController<M, E, D, C>
where
    M: MotorDrive,
    E: PositionEncoder,
    D: DelayNs,
    C: Cancellable,
{
    /// Create a controller. Use [`AxisControllerBuilder`](super::AxisControllerBuilder)
    /// to get a validated configuration.
    pub(crate) fn new(config: AxisConfig, motor: M, encoder: E, delay: D, token: C) -> Self {
        Self {
            config,
            state: AxisState::new(),
            motor,
            encoder,
            timer: InterruptibleDelay::new(delay, token),
        }
    }

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.config.name.as_str()
    }

    /// Get the axis configuration.
    #[inline]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Get the loop state.
    #[inline]
    pub fn state(&self) -> &AxisState {
        &self.state
    }

    /// Phase the last operation ended in.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Last position observed by any operation.
    #[inline]
    pub fn last_sample(&self) -> Option<PositionSample> {
        self.state.last_sample
    }

    /// The cancellation token.
    #[inline]
    pub fn interruptor(&self) -> &C {
        self.timer.token()
    }

    /// Get the drive.
    #[inline]
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// Get the encoder.
    #[inline]
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Take the hardware back.
    pub fn release(self) -> (M, E) {
        (self.motor, self.encoder)
    }

    #[inline]
    fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.config.retry_attempts)
    }

    /// Read the current position once, inside its own encoder session.
    ///
    /// The recorded sample is stamped relative to the start of this call.
    pub fn get_position(&mut self) -> Result<f64, AxisError> {
        let policy = self.policy();

        self.timer.restart();
        self.timer.checkpoint()?;
        let mut session = EncoderSession::open(&mut self.encoder, policy)?;
        let encoder = session.encoder();
        let value = retry(policy, "encoder read", || encoder.get_position())?;
        drop(session);
        self.timer.checkpoint()?;

        self.state.last_sample = Some(PositionSample {
            value,
            timestamp: self.timer.elapsed(),
        });
        Ok(value)
    }

    /// Move to `target` and report how convergence went.
    ///
    /// The target is checked against the safe range before the encoder is
    /// touched or anything moves.
    pub fn move_to(&mut self, target: f64) -> Result<Convergence, AxisError> {
        let span = info_span!(
            "set_position",
            axis = self.config.name.as_str(),
            unit = self.config.unit.symbol(),
            goal = target
        );
        let _enter = span.enter();

        if let Err(e) = check_target(&self.config, target) {
            warn!(error = %e, "target rejected");
            self.state.phase = Phase::Failed;
            return Err(e);
        }

        let policy = self.policy();
        let mut session = match EncoderSession::open(&mut self.encoder, policy) {
            Ok(session) => session,
            Err(e) => {
                self.state.phase = Phase::Failed;
                return Err(e.into());
            }
        };

        let result = ConvergenceLoop::new(
            &self.config,
            &mut self.state,
            &mut self.motor,
            session.encoder(),
            &mut self.timer,
        )
        .run(target);

        drop(session);
        result
    }

    /// Move to `target`.
    pub fn set_position(&mut self, target: f64) -> Result<(), AxisError> {
        self.move_to(target).map(|_| ())
    }

    /// Move by `magnitude` (sign ignored) in `direction` from the current
    /// position.
    ///
    /// Magnitudes above `max_relative_move` are rejected before the encoder
    /// is touched.
    pub fn move_by(&mut self, direction: Direction, magnitude: f64) -> Result<(), AxisError> {
        let magnitude = fabs(magnitude);
        if let Some(max) = self.config.max_relative_move {
            if !(magnitude <= max) {
                warn!(axis = self.config.name.as_str(), magnitude, max, "relative move rejected");
                return Err(AxisError::MoveTooLarge { magnitude, max });
            }
        }

        let current = self.get_position()?;
        let target = current + direction.sign() * magnitude;
        info!(current, goal = target, "relative move");
        self.set_position(target)
    }

    /// Move towards larger positions by `magnitude`.
    pub fn move_positive(&mut self, magnitude: f64) -> Result<(), AxisError> {
        self.move_by(Direction::Positive, magnitude)
    }

    /// Move towards smaller positions by `magnitude`.
    pub fn move_negative(&mut self, magnitude: f64) -> Result<(), AxisError> {
        self.move_by(Direction::Negative, magnitude)
    }

    /// Stop the drive now, whatever the loop was doing.
    pub fn stop(&mut self) -> Result<(), AxisError> {
        let policy = self.policy();
        let motor = &mut self.motor;
        retry(policy, "stop", || motor.stop())?;
        Ok(())
    }

    /// Force a drive speed. The loop re-selects its own tier on the next
    /// move that needs a different one.
    pub fn set_speed(&mut self, tier: SpeedTier) -> Result<(), AxisError> {
        let policy = self.policy();
        let motor = &mut self.motor;
        retry(policy, "set_speed", || motor.set_speed(tier))?;
        self.state.current_speed_tier = Some(tier);
        Ok(())
    }
}
