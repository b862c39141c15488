//! Absolute position encoder interface and scoped sessions.

use tracing::warn;

use crate::error::EncoderError;
use crate::retry::{retry, RetryPolicy};

/// An absolute position encoder read over a connect/disconnect session.
pub trait PositionEncoder {
    /// Open the session.
    fn connect(&mut self) -> Result<(), EncoderError>;

    /// Close the session and release the hardware.
    fn disconnect(&mut self) -> Result<(), EncoderError>;

    /// Whether a session is open.
    fn is_connected(&self) -> bool;

    /// Current position in physical units, calibration offset applied.
    ///
    /// Fails with [`EncoderError::NotConnected`] outside a session.
    fn get_position(&mut self) -> Result<f64, EncoderError>;
}

/// Encoders that can search for their reference mark.
pub trait ReferenceMarks: PositionEncoder {
    /// Enter reference search mode.
    fn start_reference(&mut self) -> Result<(), EncoderError>;

    /// Leave reference search mode.
    fn stop_reference(&mut self) -> Result<(), EncoderError>;

    /// Whether a reference mark has been seen.
    fn has_reference(&mut self) -> Result<bool, EncoderError>;
}

/// Encoders carrying a persisted calibration offset.
pub trait Calibrated: PositionEncoder {
    /// Offset currently subtracted from raw readings.
    fn calibration(&self) -> f64;

    /// Install a new offset.
    fn set_calibration(&mut self, offset: f64);
}

/// Scoped encoder session.
///
/// Connects on creation unless a session is already open, and disconnects
/// on drop only if it opened the session itself. Every exit path of the
/// owning scope therefore releases the encoder.
pub struct EncoderSession<'a, E: PositionEncoder> {
    encoder: &'a mut E,
    owned: bool,
}

impl<'a, E: PositionEncoder> EncoderSession<'a, E> {
    /// Open a session, retrying transient connection faults.
    pub fn open(encoder: &'a mut E, policy: RetryPolicy) -> Result<Self, EncoderError> {
        let owned = if encoder.is_connected() {
            false
        } else {
            retry(policy, "encoder connect", || encoder.connect())?;
            true
        };

        Ok(Self { encoder, owned })
    }

    /// Whether this session opened the connection.
    #[inline]
    pub fn is_owner(&self) -> bool {
        self.owned
    }

    /// Access the connected encoder.
    #[inline]
    pub fn encoder(&mut self) -> &mut E {
        &mut *self.encoder
    }

    /// Close the session, reporting a failed disconnect.
    pub fn close(mut self) -> Result<(), EncoderError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), EncoderError> {
        if !self.owned {
            return Ok(());
        }
        self.owned = false;
        self.encoder.disconnect()
    }
}

impl<E: PositionEncoder> Drop for EncoderSession<'_, E> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "encoder disconnect failed");
        }
    }
}
