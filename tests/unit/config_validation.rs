//! Unit tests for configuration validation.

use tmc2209_uart::config::{parse_config, validate_config, validate_driver, DriverConfig, SystemConfig};
use tmc2209_uart::config::units::{Amperes, Ohms};
use tmc2209_uart::error::{ConfigError, Error};

fn config_error(toml_str: &str) -> ConfigError {
    match parse_config(toml_str) {
        Err(Error::Config(e)) => e,
        other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_address_out_of_range() {
    let err = config_error("[drivers.x_axis]\naddress = 4\n");
    assert_eq!(err, ConfigError::InvalidAddress(4));
}

#[test]
fn test_non_positive_sense_resistor() {
    let err = config_error("[drivers.x_axis]\nrsense = 0.0\n");
    assert!(matches!(err, ConfigError::InvalidSenseResistor(_)));
}

#[test]
fn test_zero_oscillator() {
    let err = config_error("[drivers.x_axis]\noscillator_freq = 0\n");
    assert_eq!(err, ConfigError::InvalidOscillatorFrequency(0));
}

#[test]
fn test_hold_scale_out_of_range() {
    let err = config_error("[drivers.x_axis]\nhold_current_scale = 1.2\n");
    assert!(matches!(err, ConfigError::InvalidHoldScale(_)));
}

#[test]
fn test_tcool_threshold_too_large() {
    let err = config_error("[drivers.x_axis]\ntcool_threshold = 2000000\n");
    assert_eq!(err, ConfigError::InvalidCoolThreshold(2_000_000));
}

#[test]
fn test_validate_programmatic_config() {
    let mut config = SystemConfig::default();
    let good = DriverConfig {
        rsense: Ohms(0.15),
        run_current: Some(Amperes(1.0)),
        ..DriverConfig::default()
    };
    assert!(validate_driver(&good).is_ok());

    config.drivers.insert("x_axis".try_into().unwrap(), good).unwrap();
    assert!(validate_config(&config).is_ok());

    let bad = DriverConfig {
        run_current: Some(Amperes(0.0)),
        ..DriverConfig::default()
    };
    config.drivers.insert("y_axis".try_into().unwrap(), bad).unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidRunCurrent(_)))
    ));
}
