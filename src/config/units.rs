//! Unit types for configuration values.
//!
//! Physical positions are plain `f64` in the axis' own unit; this module
//! covers the unit tag and the millisecond timings found in TOML.

use core::time::Duration;

use serde::Deserialize;

/// Physical unit an axis is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhysicalUnit {
    /// Rotation stage, degrees.
    #[default]
    Degree,
    /// Translation stage, millimetres.
    Millimeter,
}

impl PhysicalUnit {
    /// Short symbol for log output.
    pub const fn symbol(self) -> &'static str {
        match self {
            PhysicalUnit::Degree => "deg",
            PhysicalUnit::Millimeter => "mm",
        }
    }
}

/// A duration in whole milliseconds, as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Millis(pub u32);

impl Millis {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Convert to a `Duration`.
    #[inline]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0 as u64)
    }

    /// Check for a zero duration.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<Millis> for Duration {
    fn from(value: Millis) -> Self {
        value.as_duration()
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Millis.
    fn millis(self) -> Millis;
}

impl UnitExt for u32 {
    #[inline]
    fn millis(self) -> Millis {
        Millis(self)
    }
}
