//! Builder pattern for AxisController.

use embedded_hal::delay::DelayNs;

use crate::config::{validate_axis, AxisConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};
use crate::hal::{MotorDrive, PositionEncoder};
use crate::interrupt::Cancellable;

use super::controller::AxisController;

/// Builder for creating AxisController instances.
pub struct AxisControllerBuilder<M, E, D, C>
where
    M: MotorDrive,
    E: PositionEncoder,
    D: DelayNs,
    C: Cancellable,
{
    motor: Option<M>,
    encoder: Option<E>,
    delay: Option<D>,
    interruptor: Option<C>,
    config: Option<AxisConfig>,
}

impl<M, E, D, C> Default for AxisControllerBuilder<M, E, D, C>
where
    M: MotorDrive,
    E: PositionEncoder,
    D: DelayNs,
    C: Cancellable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M, E, D, C> AxisControllerBuilder<M, E, D, C>
where
    M: MotorDrive,
    E: PositionEncoder,
    D: DelayNs,
    C: Cancellable,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            motor: None,
            encoder: None,
            delay: None,
            interruptor: None,
            config: None,
        }
    }

    /// Set the stepper drive.
    pub fn motor(mut self, motor: M) -> Self {
        self.motor = Some(motor);
        self
    }

    /// Set the position encoder.
    pub fn encoder(mut self, encoder: E) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Set the delay provider used for polling.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the cancellation token.
    pub fn interruptor(mut self, interruptor: C) -> Self {
        self.interruptor = Some(interruptor);
        self
    }

    /// Configure from an AxisConfig.
    pub fn config(mut self, config: AxisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Configure from SystemConfig by axis name.
    pub fn from_config(self, config: &SystemConfig, axis_name: &str) -> Result<Self> {
        let axis_config = config.axis(axis_name).ok_or_else(|| {
            Error::Config(ConfigError::AxisNotFound(
                heapless::String::try_from(axis_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.config(axis_config.clone()))
    }

    /// Build the AxisController.
    ///
    /// # Errors
    ///
    /// Returns an error if a component is missing or the axis configuration
    /// does not validate.
    pub fn build(self) -> Result<AxisController<M, E, D, C>> {
        let config = self
            .config
            .ok_or(Error::Config(ConfigError::MissingComponent("config")))?;
        let motor = self
            .motor
            .ok_or(Error::Config(ConfigError::MissingComponent("motor")))?;
        let encoder = self
            .encoder
            .ok_or(Error::Config(ConfigError::MissingComponent("encoder")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingComponent("delay")))?;
        let interruptor = self
            .interruptor
            .ok_or(Error::Config(ConfigError::MissingComponent("interruptor")))?;

        validate_axis(&config)?;

        Ok(AxisController::new(config, motor, encoder, delay, interruptor))
    }
}
