//! Unit tests for TOML configuration parsing.

use axis_servo::config::units::UnitExt;
use axis_servo::config::{load_config, parse_config, PhysicalUnit, SystemConfig};
use axis_servo::error::{ConfigError, Error};

/// Test parsing a rotation axis with every field spelled out.
#[test]
fn test_parse_full_axis_config() {
    let toml_str = r#"
[axes.theta]
name = "sample_theta"
unit = "degree"
safe_min = -10.0
safe_max = 10.0
tolerance = 0.004
step_tolerance = 2
hysteresis_offset = 400
anti_creep_steps = 10
max_iterations = 30
per_move_timeout_ms = 60000
poll_interval_ms = 100
retry_attempts = 5
reference_timeout_ms = 300000

[axes.theta.gain]
base = 1100.0
breakpoints = [{ below = 0.1, gain = 550.0 }]

[axes.theta.speed]
coarse_above = 5000
medium_above = 500

[axes.theta.fine_approach]
lower = 0.03
upper = 0.1
settle_ms = 1000
divisor = 2
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let theta = config.axis("theta").expect("Axis not found");

    assert_eq!(theta.name.as_str(), "sample_theta");
    assert_eq!(theta.unit, PhysicalUnit::Degree);
    assert_eq!(theta.safe_min, -10.0);
    assert_eq!(theta.safe_max, 10.0);
    assert_eq!(theta.step_tolerance, 2);
    assert_eq!(theta.hysteresis_offset, 400);
    assert_eq!(theta.max_iterations, 30);
    assert_eq!(theta.per_move_timeout, 60_000u32.millis());
    assert_eq!(theta.poll_interval, 100u32.millis());
    assert_eq!(theta.retry_attempts, 5);
    assert_eq!(theta.reference_timeout, 300_000u32.millis());

    assert_eq!(theta.gain.breakpoints.len(), 1);
    assert_eq!(theta.gain.gain_for(0.05), 550.0);
    assert_eq!(theta.gain.gain_for(1.0), 1100.0);

    let window = theta.fine_approach.expect("fine approach");
    assert_eq!(window.settle, 1000u32.millis());
    assert_eq!(window.divisor, 2);
}

/// Test that optional fields fall back to their defaults.
#[test]
fn test_parse_defaults() {
    let toml_str = r#"
[axes.z]
name = "sample_z"
unit = "millimeter"
safe_min = -15.0
safe_max = 10.0
tolerance = 0.0025

[axes.z.gain]
base = 5000.0
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let z = config.axis("z").expect("Axis not found");

    assert_eq!(z.unit, PhysicalUnit::Millimeter);
    assert_eq!(z.unit.symbol(), "mm");
    assert_eq!(z.step_tolerance, 1);
    assert_eq!(z.hysteresis_offset, 0);
    assert_eq!(z.anti_creep_steps, 10);
    assert_eq!(z.max_iterations, 25);
    assert_eq!(z.poll_interval.value(), 100);
    assert_eq!(z.per_move_timeout.value(), 60_000);
    assert_eq!(z.speed.coarse_above, 5000);
    assert_eq!(z.speed.medium_above, 500);
    assert!(z.fine_approach.is_none());
    assert!(z.gain.breakpoints.is_empty());
}

/// Test parsing several axes keeps them addressable by key.
#[test]
fn test_parse_multiple_axes() {
    let toml_str = r#"
[axes.theta]
name = "Theta"
safe_min = -10.0
safe_max = 10.0
tolerance = 0.004

[axes.theta.gain]
base = 1100.0

[axes.z]
name = "Z"
safe_min = -15.0
safe_max = 10.0
tolerance = 0.0025

[axes.z.gain]
base = 5000.0
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let names: Vec<_> = config.axis_names().collect();

    assert_eq!(names.len(), 2);
    assert!(names.contains(&"theta"));
    assert!(names.contains(&"z"));
    assert!(config.axis("phi").is_none());
}

/// Test that a missing gain table is a parse error.
#[test]
fn test_missing_gain_is_parse_error() {
    let toml_str = r#"
[axes.theta]
name = "Theta"
safe_min = -10.0
safe_max = 10.0
tolerance = 0.004
"#;

    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test that unknown unit names are rejected.
#[test]
fn test_unknown_unit_rejected() {
    let toml_str = r#"
[axes.theta]
name = "Theta"
unit = "radian"
safe_min = -10.0
safe_max = 10.0
tolerance = 0.004

[axes.theta.gain]
base = 1100.0
"#;

    assert!(parse_config(toml_str).is_err());
}

/// Test loading a missing file reports an I/O error.
#[test]
fn test_load_missing_file() {
    let result = load_config("does/not/exist/axes.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
}

/// Test loading the configuration shipped with the demo.
#[test]
fn test_load_demo_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/axes.toml");
    let config = load_config(path).expect("demo config loads");

    assert!(config.axis("theta").is_some());
    assert!(config.axis("z").is_some());
}
