//! Unit tests for configuration validation.

use axis_servo::config::{parse_config, validate_config, SystemConfig};
use axis_servo::error::{ConfigError, Error};

fn axis_toml(extra: &str, gain: &str) -> String {
    format!(
        r#"
[axes.theta]
name = "Theta"
safe_min = -10.0
safe_max = 10.0
tolerance = 0.004
{extra}

[axes.theta.gain]
{gain}
"#
    )
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = axis_toml("hysteresis_offset = 400", "base = 1100.0");

    let config: SystemConfig = toml::from_str(&toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test an empty configuration is valid.
#[test]
fn test_empty_config_is_valid() {
    assert!(validate_config(&SystemConfig::default()).is_ok());
}

/// Test validation fails for a zero tolerance.
#[test]
fn test_zero_tolerance_rejected() {
    let toml_str = axis_toml("", "base = 1100.0").replace("tolerance = 0.004", "tolerance = 0.0");

    let result = parse_config(&toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidTolerance(_)))
    ));
}

/// Test validation fails for a negative gain.
#[test]
fn test_negative_gain_rejected() {
    let result = parse_config(&axis_toml("", "base = -1100.0"));
    assert!(matches!(result, Err(Error::Config(ConfigError::InvalidGain(_)))));
}

/// Test a finer breakpoint may not raise the gain.
#[test]
fn test_breakpoint_gain_must_not_rise() {
    let gain = "base = 1100.0\nbreakpoints = [{ below = 0.5, gain = 800.0 }, { below = 0.1, gain = 900.0 }]";

    let result = parse_config(&axis_toml("", gain));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::GainNotDecreasing { below, .. })) if below == 0.1
    ));
}

/// Test breakpoints in any order are accepted when they fall monotonically.
#[test]
fn test_unordered_breakpoints_accepted() {
    let gain = "base = 1100.0\nbreakpoints = [{ below = 0.1, gain = 550.0 }, { below = 1.0, gain = 800.0 }]";

    assert!(parse_config(&axis_toml("", gain)).is_ok());
}

/// Test zero iterations is rejected.
#[test]
fn test_zero_iterations_rejected() {
    let result = parse_config(&axis_toml("max_iterations = 0", "base = 1100.0"));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidIterations))
    ));
}

/// Test a zero poll interval is rejected.
#[test]
fn test_zero_poll_interval_rejected() {
    let result = parse_config(&axis_toml("poll_interval_ms = 0", "base = 1100.0"));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidPollInterval))
    ));
}

/// Test speed thresholds must be ordered.
#[test]
fn test_speed_thresholds_out_of_order() {
    let extra = "[axes.theta.speed]\ncoarse_above = 500\nmedium_above = 5000";

    let result = parse_config(&axis_toml(extra, "base = 1100.0"));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidSpeedThresholds {
            coarse: 500,
            medium: 5000
        }))
    ));
}

/// Test zero retry attempts is rejected.
#[test]
fn test_zero_retries_rejected() {
    let result = parse_config(&axis_toml("retry_attempts = 0", "base = 1100.0"));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidRetryAttempts))
    ));
}

/// Test a fine-approach divisor of zero is rejected.
#[test]
fn test_zero_divisor_rejected() {
    let extra = "[axes.theta.fine_approach]\nlower = 0.03\nupper = 0.1\nsettle_ms = 1000\ndivisor = 0";

    let result = parse_config(&axis_toml(extra, "base = 1100.0"));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidFineApproach { divisor: 0, .. }))
    ));
}

/// Test errors render a readable message.
#[test]
fn test_error_display() {
    let err = parse_config(&axis_toml("max_iterations = 0", "base = 1100.0")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: max_iterations must be at least 1"
    );
}
