//! Example: Closed-loop positioning of a simulated rotation stage.
//!
//! This example demonstrates how to:
//! - Load axis configuration from TOML
//! - Build a controller through the AxisSystem facade
//! - Move to absolute and relative targets with encoder feedback
//! - Handle a rejected target and an operator cancel
//!
//! Run with: `RUST_LOG=info cargo run --example closed_loop_axis`

use std::cell::RefCell;
use std::rc::Rc;

use axis_servo::{
    load_config, AxisError, AxisSystem, Cancellable, CommError, EncoderError, Error,
    Interruptor, MotorDrive, PositionEncoder, SpeedTier,
};
use tracing_subscriber::EnvFilter;

static STOP_THETA: Interruptor = Interruptor::new();

/// Simulated mechanics: steps turn into motion at an imperfect rate.
struct Mechanics {
    position: f64,
    steps_per_degree: f64,
    efficiency: f64,
    busy_polls: u32,
    connected: bool,
}

/// Mock drive for demonstration.
struct MockDrive(Rc<RefCell<Mechanics>>);

impl MotorDrive for MockDrive {
    fn move_relative(&mut self, steps: i64) -> Result<(), CommError> {
        let mut m = self.0.borrow_mut();
        m.position -= steps as f64 / m.steps_per_degree * m.efficiency;
        m.busy_polls = 3;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CommError> {
        self.0.borrow_mut().busy_polls = 0;
        Ok(())
    }

    fn is_moving(&mut self) -> Result<bool, CommError> {
        let mut m = self.0.borrow_mut();
        if m.busy_polls > 0 {
            m.busy_polls -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn set_speed(&mut self, tier: SpeedTier) -> Result<(), CommError> {
        println!("  drive speed -> {}", tier.name());
        Ok(())
    }
}

/// Mock absolute encoder for demonstration.
struct MockEncoder(Rc<RefCell<Mechanics>>);

impl PositionEncoder for MockEncoder {
    fn connect(&mut self) -> Result<(), EncoderError> {
        self.0.borrow_mut().connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), EncoderError> {
        self.0.borrow_mut().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn get_position(&mut self) -> Result<f64, EncoderError> {
        let m = self.0.borrow();
        if !m.connected {
            return Err(EncoderError::NotConnected);
        }
        Ok(m.position)
    }
}

/// Mock delay; a real one would sleep for the poll interval.
struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Closed-Loop Axis Example ===\n");

    let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/axes.toml"))?;
    let mut system = AxisSystem::from_config(config);

    println!("Configured axes:");
    for name in system.axis_names() {
        if let Some(axis) = system.axis_config(name) {
            println!(
                "  {}: [{}, {}] {} tolerance {}",
                name,
                axis.safe_min,
                axis.safe_max,
                axis.unit.symbol(),
                axis.tolerance
            );
        }
    }

    let mechanics = Rc::new(RefCell::new(Mechanics {
        position: 0.0,
        steps_per_degree: 1000.0,
        efficiency: 0.85,
        busy_polls: 0,
        connected: false,
    }));

    let mut theta = system.build_axis(
        "theta",
        MockDrive(Rc::clone(&mechanics)),
        MockEncoder(Rc::clone(&mechanics)),
        MockDelay,
        &STOP_THETA,
    )?;

    println!("\n--- Absolute move to 2.5 deg ---");
    let done = theta.move_to(2.5)?;
    println!(
        "converged after {} moves at {:.4} deg (residual {:.5})",
        done.iterations, done.final_sample.value, done.residual
    );

    println!("\n--- Relative move of -1.0 deg ---");
    theta.move_negative(1.0)?;
    println!("now at {:.4} deg", theta.get_position()?);

    println!("\n--- Target outside the safe range ---");
    match theta.set_position(12.0) {
        Err(e @ AxisError::OutOfRange { .. }) => println!("rejected: {e} ({:?})", e.class()),
        other => println!("unexpected: {other:?}"),
    }

    println!("\n--- Operator cancel ---");
    STOP_THETA.request_cancel();
    match theta.set_position(-3.0) {
        Err(AxisError::Cancelled) => println!("cancelled, phase {}", theta.phase().name()),
        other => println!("unexpected: {other:?}"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
