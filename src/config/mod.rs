//! Configuration module for axis-servo.
//!
//! Provides types for loading and validating axis configurations from TOML
//! files (with `std` feature) or pre-parsed data.

mod axis;
mod gain;
mod limits;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{AxisConfig, FineApproach, SpeedThresholds};
pub use gain::{GainBreakpoint, GainSchedule, MAX_BREAKPOINTS};
pub use limits::SafeRange;
pub use system::{SystemConfig, MAX_AXES};
pub use validation::{validate_axis, validate_config};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

pub use units::{Millis, PhysicalUnit};
