//! Axis module for axis-servo.
//!
//! The per-axis controller, its builder, the multi-axis facade, and
//! reference search and calibration for encoders that support them.

mod builder;
mod controller;
mod reference;
mod system;

pub use builder::AxisControllerBuilder;
pub use controller::AxisController;
pub use system::AxisSystem;
