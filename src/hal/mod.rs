//! Hardware collaborator interfaces.
//!
//! The drive and encoder protocols live elsewhere; this module defines the
//! contracts the controller depends on.

mod encoder;
mod lock;
mod motor;

pub use encoder::{Calibrated, EncoderSession, PositionEncoder, ReferenceMarks};
pub use lock::EncoderLock;
pub use motor::MotorDrive;
