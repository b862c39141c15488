//! Simulated stage shared by the integration tests.
//!
//! Drive and encoder look at the same `Stage`, so every commanded move shows
//! up in the next reading. Faults are injected through the public fields.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use axis_servo::{
    AxisConfig, AxisController, AxisControllerBuilder, Calibrated, Cancellable, CommError,
    EncoderError, EncoderLock, GainSchedule, Interruptor, MotorDrive, PositionEncoder,
    ReferenceMarks, SpeedTier,
};
use embedded_hal_mock::eh1::delay::NoopDelay;

/// Physical state of one simulated stage.
pub struct Stage {
    /// True position in physical units.
    pub position: f64,
    /// Steps per physical unit of the real mechanics.
    pub steps_per_unit: f64,
    /// Fraction of each commanded move that is actually travelled.
    pub efficiency: f64,
    /// Travel lost on each direction reversal.
    pub backlash: f64,
    /// `is_moving` polls reporting `true` after each move.
    pub polls_per_move: u32,
    /// Drive never reports the end of a move.
    pub stuck: bool,

    /// Commanded moves, in order.
    pub moves: Vec<i64>,
    /// Speed tiers sent to the drive.
    pub speeds: Vec<SpeedTier>,
    /// Calls to `stop`.
    pub stops: u32,
    /// Calls to `get_position` that returned a value.
    pub reads: u32,
    /// Successful connects and disconnects.
    pub connects: u32,
    pub disconnects: u32,
    pub connected: bool,

    /// Transient read faults still to inject.
    pub read_faults: u32,
    /// Transient move faults still to inject.
    pub move_faults: u32,
    /// Transient stop faults still to inject.
    pub stop_faults: u32,

    /// After this many moves the stage jumps to the given position.
    pub jump_after: Option<(usize, f64)>,
    /// Token cancelled once this many moves were issued.
    pub cancel_after: Option<(usize, Arc<Interruptor>)>,

    /// Guard taken in `connect`.
    pub lock: Option<&'static EncoderLock>,

    /// Calibration offset subtracted from readings.
    pub calibration: f64,
    /// Reference mark shows up after this many `has_reference` polls.
    pub reference_after: Option<u32>,
    pub reference_mode: bool,
    pub reference_polls: u32,
    pub reference_stops: u32,

    remaining_polls: u32,
    last_direction: f64,
}

impl Stage {
    pub fn new(position: f64) -> Self {
        Self {
            position,
            steps_per_unit: 2000.0,
            efficiency: 1.0,
            backlash: 0.0,
            polls_per_move: 2,
            stuck: false,
            moves: Vec::new(),
            speeds: Vec::new(),
            stops: 0,
            reads: 0,
            connects: 0,
            disconnects: 0,
            connected: false,
            read_faults: 0,
            move_faults: 0,
            stop_faults: 0,
            jump_after: None,
            cancel_after: None,
            lock: None,
            calibration: 0.0,
            reference_after: None,
            reference_mode: false,
            reference_polls: 0,
            reference_stops: 0,
            remaining_polls: 0,
            last_direction: 0.0,
        }
    }

    fn apply_move(&mut self, steps: i64) {
        // drive steps run opposite to the encoder axis
        let travel = -(steps as f64) / self.steps_per_unit * self.efficiency;
        let direction = travel.signum();

        let mut magnitude = travel.abs();
        if self.last_direction != 0.0 && direction != 0.0 && direction != self.last_direction {
            magnitude = (magnitude - self.backlash).max(0.0);
        }
        if direction != 0.0 {
            self.last_direction = direction;
        }

        self.position += direction * magnitude;
        self.remaining_polls = self.polls_per_move;

        if let Some((after, position)) = self.jump_after {
            if self.moves.len() >= after {
                self.position = position;
            }
        }
        if let Some((after, ref token)) = self.cancel_after {
            if self.moves.len() >= after {
                token.request_cancel();
            }
        }
    }
}

pub type Shared = Rc<RefCell<Stage>>;

/// Drive half of the stage.
pub struct SimMotor(pub Shared);

/// Encoder half of the stage.
pub struct SimEncoder(pub Shared);

impl MotorDrive for SimMotor {
    fn move_relative(&mut self, steps: i64) -> Result<(), CommError> {
        let mut stage = self.0.borrow_mut();
        if stage.move_faults > 0 {
            stage.move_faults -= 1;
            return Err(CommError::Timeout);
        }
        stage.moves.push(steps);
        stage.apply_move(steps);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CommError> {
        let mut stage = self.0.borrow_mut();
        if stage.stop_faults > 0 {
            stage.stop_faults -= 1;
            return Err(CommError::Link);
        }
        stage.stops += 1;
        stage.remaining_polls = 0;
        Ok(())
    }

    fn is_moving(&mut self) -> Result<bool, CommError> {
        let mut stage = self.0.borrow_mut();
        if stage.stuck {
            return Ok(true);
        }
        if stage.remaining_polls > 0 {
            stage.remaining_polls -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn set_speed(&mut self, tier: SpeedTier) -> Result<(), CommError> {
        self.0.borrow_mut().speeds.push(tier);
        Ok(())
    }
}

impl PositionEncoder for SimEncoder {
    fn connect(&mut self) -> Result<(), EncoderError> {
        let mut stage = self.0.borrow_mut();
        if let Some(lock) = stage.lock {
            lock.try_acquire()?;
        }
        stage.connected = true;
        stage.connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), EncoderError> {
        let mut stage = self.0.borrow_mut();
        if let Some(lock) = stage.lock {
            lock.release();
        }
        stage.connected = false;
        stage.disconnects += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn get_position(&mut self) -> Result<f64, EncoderError> {
        let mut stage = self.0.borrow_mut();
        if !stage.connected {
            return Err(EncoderError::NotConnected);
        }
        if stage.read_faults > 0 {
            stage.read_faults -= 1;
            return Err(EncoderError::Comm(CommError::Link));
        }
        stage.reads += 1;
        Ok(stage.position - stage.calibration)
    }
}

impl ReferenceMarks for SimEncoder {
    fn start_reference(&mut self) -> Result<(), EncoderError> {
        let mut stage = self.0.borrow_mut();
        if !stage.connected {
            return Err(EncoderError::NotConnected);
        }
        stage.reference_mode = true;
        stage.reference_polls = 0;
        Ok(())
    }

    fn stop_reference(&mut self) -> Result<(), EncoderError> {
        let mut stage = self.0.borrow_mut();
        stage.reference_mode = false;
        stage.reference_stops += 1;
        Ok(())
    }

    fn has_reference(&mut self) -> Result<bool, EncoderError> {
        let mut stage = self.0.borrow_mut();
        if !stage.reference_mode {
            return Ok(false);
        }
        stage.reference_polls += 1;
        Ok(stage
            .reference_after
            .is_some_and(|after| stage.reference_polls >= after))
    }
}

impl Calibrated for SimEncoder {
    fn calibration(&self) -> f64 {
        self.0.borrow().calibration
    }

    fn set_calibration(&mut self, offset: f64) {
        self.0.borrow_mut().calibration = offset;
    }
}

pub type TestAxis = AxisController<SimMotor, SimEncoder, NoopDelay, Arc<Interruptor>>;

/// Axis matching the simulated mechanics: gain 2000 steps per unit.
pub fn z_config() -> AxisConfig {
    let mut config = AxisConfig::new("z", -15.0, 15.0, 0.003, GainSchedule::constant(2000.0));
    config.anti_creep_steps = 0;
    config.max_iterations = 10;
    config.per_move_timeout = axis_servo::Millis(1_000);
    config
}

/// Build an axis over a fresh stage.
pub fn axis(config: AxisConfig, stage: Stage) -> (TestAxis, Shared, Arc<Interruptor>) {
    let shared = Rc::new(RefCell::new(stage));
    let token = Arc::new(Interruptor::new());

    let axis = AxisControllerBuilder::new()
        .config(config)
        .motor(SimMotor(Rc::clone(&shared)))
        .encoder(SimEncoder(Rc::clone(&shared)))
        .delay(NoopDelay::new())
        .interruptor(Arc::clone(&token))
        .build()
        .expect("valid test axis");

    (axis, shared, token)
}

/// Install a test subscriber so `RUST_LOG` shows the loop's events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
