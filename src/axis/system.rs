//! Axis system facade for multi-axis configuration.
//!
//! Hands out at most one controller per configured axis.

use embedded_hal::delay::DelayNs;
use heapless::{FnvIndexSet, String};

use crate::config::{AxisConfig, SystemConfig, MAX_AXES};
use crate::error::{ConfigError, Error, Result};
use crate::hal::{MotorDrive, PositionEncoder};
use crate::interrupt::Cancellable;

use super::builder::AxisControllerBuilder;
use super::controller::AxisController;

/// A facade for building axis controllers from one configuration.
///
/// # Example
///
/// ```rust,ignore
/// use axis_servo::{load_config, AxisSystem, Interruptor};
///
/// let mut system = AxisSystem::from_config(load_config("axes.toml")?);
/// let theta = system.build_axis("theta", drive, encoder, delay, &STOP_THETA)?;
/// ```
pub struct AxisSystem {
    /// The system configuration.
    config: SystemConfig,
    /// Axes that already have a controller.
    claimed: FnvIndexSet<String<32>, MAX_AXES>,
}

impl AxisSystem {
    /// Create a new axis system from configuration.
    ///
    /// No controller is built until `build_axis()` is called.
    pub fn from_config(config: SystemConfig) -> Self {
        Self {
            config,
            claimed: FnvIndexSet::new(),
        }
    }

    /// Get the system configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Get an axis configuration by name.
    pub fn axis_config(&self, name: &str) -> Option<&AxisConfig> {
        self.config.axis(name)
    }

    /// Check if an axis name exists in the configuration.
    pub fn has_axis(&self, name: &str) -> bool {
        self.config.axis(name).is_some()
    }

    /// List all configured axis names.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.config.axis_names()
    }

    /// Check if a controller was already built for an axis.
    pub fn is_claimed(&self, name: &str) -> bool {
        self.claimed.iter().any(|k| k.as_str() == name)
    }

    /// Number of axes with a controller.
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    /// Build the controller for a configured axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is not configured, already has a
    /// controller, or its configuration does not validate.
    pub fn build_axis<M, E, D, C>(
        &mut self,
        name: &str,
        motor: M,
        encoder: E,
        delay: D,
        interruptor: C,
    ) -> Result<AxisController<M, E, D, C>>
    where
        M: MotorDrive,
        E: PositionEncoder,
        D: DelayNs,
        C: Cancellable,
    {
        let key: String<32> = String::try_from(name).unwrap_or_default();
        if self.is_claimed(name) {
            return Err(Error::Config(ConfigError::AxisInUse(key)));
        }

        let controller = AxisControllerBuilder::new()
            .motor(motor)
            .encoder(encoder)
            .delay(delay)
            .interruptor(interruptor)
            .from_config(&self.config, name)?
            .build()?;

        // capacity matches the config map, so a configured axis always fits
        let _ = self.claimed.insert(key);
        Ok(controller)
    }

    /// Give an axis back so a new controller can be built for it.
    ///
    /// Returns `true` if the axis was claimed.
    pub fn release_axis(&mut self, name: &str) -> bool {
        let key: String<32> = String::try_from(name).unwrap_or_default();
        self.claimed.remove(&key)
    }
}
