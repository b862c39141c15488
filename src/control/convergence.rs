//! Closed-loop convergence: read, propose, move, wait, repeat.
//!
//! One `run` drives the axis until the measured position is within
//! tolerance of the target, a safety limit trips, the operator cancels, or
//! the iteration budget is spent. Every failure after the target check stops
//! the drive exactly once before the error is returned.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use libm::fabs;
use tracing::{debug, error, info, trace, warn};

use crate::config::AxisConfig;
use crate::error::AxisError;
use crate::hal::{MotorDrive, PositionEncoder};
use crate::interrupt::{Cancellable, InterruptibleDelay};
use crate::retry::{retry, RetryPolicy};

use super::proposal::proposal;
use super::speed::SpeedTier;
use super::state::{AxisState, Phase, PositionSample};

/// Successful outcome of a convergence run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    /// Moves issued before tolerance was reached.
    pub iterations: u32,
    /// The reading that satisfied the tolerance.
    pub final_sample: PositionSample,
    /// `|target - final_sample.value|`.
    pub residual: f64,
}

/// How a single wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitOutcome {
    /// Drive reported the move finished.
    Settled,
    /// Per-move timeout hit; drive was stopped.
    TimedOut,
}

/// Reject a target outside the safe envelope before anything moves.
pub fn check_target(config: &AxisConfig, target: f64) -> Result<(), AxisError> {
    if config.safe_range().contains(target) {
        Ok(())
    } else {
        Err(AxisError::OutOfRange {
            target,
            min: config.safe_min,
            max: config.safe_max,
        })
    }
}

/// The convergence loop for one axis, borrowing everything it drives.
///
/// The encoder must already be inside a connected session.
pub struct ConvergenceLoop<'a, M, E, D, C> {
    config: &'a AxisConfig,
    state: &'a mut AxisState,
    motor: &'a mut M,
    encoder: &'a mut E,
    timer: &'a mut InterruptibleDelay<D, C>,
    policy: RetryPolicy,
}

impl<'a, M, E, D, C> ConvergenceLoop<'a, M, E, D, C>
where
    M: MotorDrive,
    E: PositionEncoder,
    D: DelayNs,
    C: Cancellable,
{
    /// Assemble a loop over borrowed parts.
    pub fn new(
        config: &'a AxisConfig,
        state: &'a mut AxisState,
        motor: &'a mut M,
        encoder: &'a mut E,
        timer: &'a mut InterruptibleDelay<D, C>,
    ) -> Self {
        Self {
            policy: RetryPolicy::new(config.retry_attempts),
            config,
            state,
            motor,
            encoder,
            timer,
        }
    }

    /// Drive the axis to `target`.
    ///
    /// # Errors
    ///
    /// - [`AxisError::OutOfRange`] if `target` is outside the safe range
    ///   (nothing is moved)
    /// - [`AxisError::RangeViolation`] if a reading leaves the safe range
    /// - [`AxisError::ConvergenceExceeded`] once `max_iterations` moves did
    ///   not reach tolerance
    /// - [`AxisError::Cancelled`] on operator request
    /// - [`AxisError::Comm`] / [`AxisError::Encoder`] after retries
    pub fn run(mut self, target: f64) -> Result<Convergence, AxisError> {
        if let Err(e) = check_target(self.config, target) {
            self.enter(Phase::Failed);
            return Err(e);
        }

        self.state.iteration_count = 0;
        self.timer.restart();

        let result = self.converge(target);

        match result {
            Ok(ref done) => {
                info!(
                    iterations = done.iterations,
                    position = done.final_sample.value,
                    residual = done.residual,
                    "converged"
                );
                self.enter(Phase::Converged);
            }
            Err(AxisError::Cancelled) => {
                warn!("cancelled, stopping drive");
                self.halt();
                self.enter(Phase::Aborted);
            }
            Err(ref e) => {
                error!(error = %e, "move failed, stopping drive");
                self.halt();
                self.enter(Phase::Failed);
            }
        }

        result
    }

    fn converge(&mut self, target: f64) -> Result<Convergence, AxisError> {
        loop {
            self.enter(Phase::Sampling);
            let mut sample = self.sample()?;
            let mut error = target - sample.value;

            self.enter(Phase::Proposing);
            let mut damping = 1;
            if let Some(window) = self.config.fine_approach {
                if window.contains(fabs(error)) {
                    debug!(error, "close to target, settling before re-reading");
                    self.timer.sleep(window.settle.as_duration())?;
                    sample = self.sample()?;
                    error = target - sample.value;
                    damping = window.divisor;
                }
            }

            let p = proposal(error, self.state.last_commanded_steps, self.config, damping);
            let steps = p.steps();
            info!(
                goal = target,
                current = sample.value,
                error,
                last_steps = self.state.last_commanded_steps,
                raw = p.raw,
                hysteresis = p.hysteresis,
                steps,
                "proposal"
            );

            if fabs(error) < self.config.tolerance
                || steps.unsigned_abs() < u64::from(self.config.step_tolerance)
            {
                self.relieve_preload();
                return Ok(Convergence {
                    iterations: self.state.iteration_count,
                    final_sample: sample,
                    residual: fabs(error),
                });
            }

            if self.state.iteration_count >= self.config.max_iterations {
                return Err(AxisError::ConvergenceExceeded {
                    iterations: self.state.iteration_count,
                    residual: fabs(error),
                });
            }

            self.enter(Phase::Moving);
            self.command_move(steps)?;

            self.enter(Phase::Waiting);
            if self.wait_for_motion()? == WaitOutcome::TimedOut {
                warn!(
                    timeout_ms = self.config.per_move_timeout.value(),
                    "move exceeded waiting time, re-sampling"
                );
            }

            self.state.iteration_count += 1;
        }
    }

    /// Read the encoder; every reading must lie in the safe envelope.
    fn sample(&mut self) -> Result<PositionSample, AxisError> {
        self.timer.checkpoint()?;
        let encoder = &mut *self.encoder;
        let value = retry(self.policy, "encoder read", || encoder.get_position())?;
        self.timer.checkpoint()?;

        let sample = PositionSample {
            value,
            timestamp: self.timer.elapsed(),
        };
        self.state.last_sample = Some(sample);

        if !self.config.safe_range().contains(value) {
            error!(
                position = value,
                min = self.config.safe_min,
                max = self.config.safe_max,
                "axis left its safe range"
            );
            return Err(AxisError::RangeViolation {
                position: value,
                min: self.config.safe_min,
                max: self.config.safe_max,
            });
        }

        Ok(sample)
    }

    fn command_move(&mut self, steps: i64) -> Result<(), AxisError> {
        self.select_speed(SpeedTier::for_steps(steps, &self.config.speed))?;

        let motor = &mut *self.motor;
        retry(self.policy, "move_relative", || motor.move_relative(steps))?;
        self.state.record_move(steps);
        Ok(())
    }

    fn select_speed(&mut self, tier: SpeedTier) -> Result<(), AxisError> {
        if self.state.current_speed_tier == Some(tier) {
            return Ok(());
        }

        let motor = &mut *self.motor;
        retry(self.policy, "set_speed", || motor.set_speed(tier))?;
        debug!(tier = tier.name(), "speed tier changed");
        self.state.current_speed_tier = Some(tier);
        Ok(())
    }

    fn wait_for_motion(&mut self) -> Result<WaitOutcome, AxisError> {
        let poll = self.config.poll_interval();
        let timeout = self.config.per_move_timeout();
        let mut waited = Duration::ZERO;

        loop {
            self.timer.checkpoint()?;
            let sample = self.sample()?;

            if waited >= timeout {
                let motor = &mut *self.motor;
                retry(self.policy, "stop", || motor.stop())?;
                return Ok(WaitOutcome::TimedOut);
            }

            let motor = &mut *self.motor;
            if !retry(self.policy, "is_moving", || motor.is_moving())? {
                return Ok(WaitOutcome::Settled);
            }

            debug!(position = sample.value, waited_ms = waited.as_millis() as u64, "moving");
            self.timer.sleep(poll)?;
            waited += poll;
        }
    }

    /// Small counter-move after convergence so the gear train does not
    /// stay loaded against the backlash. Fire-and-forget.
    fn relieve_preload(&mut self) {
        let last = self.state.last_commanded_steps;
        if self.state.iteration_count == 0 || last == 0 || self.config.anti_creep_steps == 0 {
            return;
        }

        let steps = -last.signum() * i64::from(self.config.anti_creep_steps);
        let sent = self
            .select_speed(SpeedTier::for_steps(steps, &self.config.speed))
            .and_then(|()| {
                let motor = &mut *self.motor;
                retry(self.policy, "anti-creep move", || motor.move_relative(steps))
                    .map_err(AxisError::from)
            });

        match sent {
            Ok(()) => {
                self.state.record_move(steps);
                debug!(steps, "anti-creep move issued");
            }
            Err(e) => warn!(error = %e, "anti-creep move failed"),
        }
    }

    /// Stop the drive after a failure. The original error wins over a
    /// failing stop.
    fn halt(&mut self) {
        let motor = &mut *self.motor;
        if let Err(e) = retry(self.policy, "stop", || motor.stop()) {
            error!(error = %e, "could not stop drive");
        }
    }

    fn enter(&mut self, phase: Phase) {
        trace!(phase = phase.name(), "phase");
        self.state.phase = phase;
    }
}
