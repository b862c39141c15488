//! Stepper drive interface.

use crate::control::SpeedTier;
use crate::error::CommError;

/// An open-loop stepper drive that executes relative moves.
///
/// Implementations talk to the physical driver; every call may fail with a
/// transient [`CommError`].
pub trait MotorDrive {
    /// Start a relative move of `steps` (signed). Returns once the command
    /// is accepted, not when the move finishes.
    fn move_relative(&mut self, steps: i64) -> Result<(), CommError>;

    /// Stop any motion immediately.
    fn stop(&mut self) -> Result<(), CommError>;

    /// Whether the drive is still executing a move.
    fn is_moving(&mut self) -> Result<bool, CommError>;

    /// Select the drive speed.
    fn set_speed(&mut self, tier: SpeedTier) -> Result<(), CommError>;
}

impl<T: MotorDrive + ?Sized> MotorDrive for &mut T {
    #[inline]
    fn move_relative(&mut self, steps: i64) -> Result<(), CommError> {
        T::move_relative(self, steps)
    }

    #[inline]
    fn stop(&mut self) -> Result<(), CommError> {
        T::stop(self)
    }

    #[inline]
    fn is_moving(&mut self) -> Result<bool, CommError> {
        T::is_moving(self)
    }

    #[inline]
    fn set_speed(&mut self, tier: SpeedTier) -> Result<(), CommError> {
        T::set_speed(self, tier)
    }
}
