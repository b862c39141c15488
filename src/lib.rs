//! # axis-servo
//!
//! Closed-loop position control for stepper-driven stages with absolute
//! encoder feedback.
//!
//! ## Features
//!
//! - **Encoder feedback**: Every move is corrected against the measured position
//! - **Gain scheduling**: Smaller gain close to the target to avoid overshoot
//! - **Backlash compensation**: Extra steps on every direction reversal
//! - **Safety envelope**: Targets and readings outside the safe range stop the axis
//! - **Cancellable**: Operator requests are honoured within one poll interval
//! - **Configuration-driven**: Define axes in TOML files
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axis_servo::{AxisControllerBuilder, Interruptor};
//!
//! static STOP: Interruptor = Interruptor::new();
//!
//! let config = axis_servo::load_config("axes.toml")?;
//!
//! let mut theta = AxisControllerBuilder::new()
//!     .from_config(&config, "theta")?
//!     .motor(drive)
//!     .encoder(encoder)
//!     .delay(delay)
//!     .interruptor(&STOP)
//!     .build()?;
//!
//! theta.set_position(2.5)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod axis;
pub mod config;
pub mod control;
pub mod error;
pub mod hal;
pub mod interrupt;
pub mod retry;

// Re-exports for ergonomic API
pub use axis::{AxisController, AxisControllerBuilder, AxisSystem};
pub use config::{validate_config, AxisConfig, GainSchedule, SystemConfig};
pub use control::{Convergence, Direction, Phase, PositionSample, SpeedTier};
pub use error::{AxisError, CommError, EncoderError, Error, ErrorClass, Result};
pub use hal::{Calibrated, EncoderLock, MotorDrive, PositionEncoder, ReferenceMarks};
pub use interrupt::{Cancellable, Interruptor};
pub use retry::RetryPolicy;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Millis, PhysicalUnit};
