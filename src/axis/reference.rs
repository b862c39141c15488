//! Reference mark search and encoder calibration.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use tracing::{debug, info, info_span, warn};

use crate::error::AxisError;
use crate::hal::{Calibrated, EncoderSession, MotorDrive, ReferenceMarks};
use crate::interrupt::{Cancellable, InterruptibleDelay};
use crate::retry::{retry, RetryPolicy};

use super::controller::AxisController;

impl<M, E, D, C> AxisController<M, E, D, C>
where
    M: MotorDrive,
    E: ReferenceMarks,
    D: DelayNs,
    C: Cancellable,
{
    /// Put the encoder in reference mode and wait until it has seen its
    /// reference mark.
    ///
    /// The axis is moved by hand (or by a separate jog) meanwhile; this
    /// call only watches. Reference mode is left on every exit path.
    ///
    /// # Errors
    ///
    /// - [`AxisError::ReferenceNotFound`] after `reference_timeout_ms`
    /// - [`AxisError::Cancelled`] on operator request
    pub fn search_reference(&mut self) -> Result<(), AxisError> {
        let span = info_span!("search_reference", axis = self.config.name.as_str());
        let _enter = span.enter();

        let policy = RetryPolicy::new(self.config.retry_attempts);
        let poll = self.config.poll_interval();
        let limit = self.config.reference_timeout.as_duration();

        let mut session = EncoderSession::open(&mut self.encoder, policy)?;
        let encoder = session.encoder();

        retry(policy, "start reference", || encoder.start_reference())?;
        info!("reference search started");

        let found = await_reference(encoder, &mut self.timer, policy, poll, limit);

        if let Err(e) = retry(policy, "stop reference", || encoder.stop_reference()) {
            warn!(error = %e, "could not leave reference mode");
            found?;
            return Err(e.into());
        }

        found
    }
}

fn await_reference<E, D, C>(
    encoder: &mut E,
    timer: &mut InterruptibleDelay<D, C>,
    policy: RetryPolicy,
    poll: Duration,
    limit: Duration,
) -> Result<(), AxisError>
where
    E: ReferenceMarks,
    D: DelayNs,
    C: Cancellable,
{
    timer.restart();

    loop {
        timer.checkpoint()?;
        if retry(policy, "has_reference", || encoder.has_reference())? {
            info!(waited_ms = timer.elapsed().as_millis() as u64, "reference mark found");
            return Ok(());
        }

        if timer.elapsed() >= limit {
            warn!(limit_ms = limit.as_millis() as u64, "no reference mark seen");
            return Err(AxisError::ReferenceNotFound);
        }

        debug!("waiting for reference mark");
        timer.sleep(poll)?;
    }
}

impl<M, E, D, C> AxisController<M, E, D, C>
where
    M: MotorDrive,
    E: Calibrated,
    D: DelayNs,
    C: Cancellable,
{
    /// Offset that makes the current reading equal `actual`.
    ///
    /// Nothing is changed; pass the result to
    /// [`apply_calibration`](Self::apply_calibration) to install it.
    pub fn compute_calibration(&mut self, actual: f64) -> Result<f64, AxisError> {
        let reading = self.get_position()?;
        let offset = reading + self.encoder.calibration() - actual;
        debug!(reading, actual, offset, "calibration computed");
        Ok(offset)
    }

    /// Install a calibration offset on the encoder.
    pub fn apply_calibration(&mut self, offset: f64) {
        let previous = self.encoder.calibration();
        self.encoder.set_calibration(offset);
        info!(
            axis = self.config.name.as_str(),
            previous,
            offset,
            "calibration applied"
        );
    }
}
