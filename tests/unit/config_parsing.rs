//! Unit tests for TOML configuration parsing.

use tmc2209_uart::config::{load_config, parse_config, Microsteps};
use tmc2209_uart::error::{ConfigError, Error};

/// Test parsing a fully specified driver.
#[test]
fn test_parse_driver_config() {
    let toml_str = r#"
[drivers.x_axis]
address = 2
rsense = 0.15
internal_rsense = false
oscillator_freq = 12000000
run_current = 0.8
hold_current_scale = 0.5
microsteps = 16
stall_threshold = 60
tcool_threshold = 400
hold_delay_ms = 100
power_down_delay_ms = 2000
inverse_direction = true
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let driver = config.driver("x_axis").expect("Driver not found");

    assert_eq!(driver.address, 2);
    assert_eq!(driver.rsense.0, 0.15);
    assert_eq!(driver.run_current.map(|a| a.0), Some(0.8));
    assert_eq!(driver.hold_current_scale, 0.5);
    assert_eq!(driver.microsteps, Some(Microsteps::SIXTEENTH));
    assert_eq!(driver.stall_threshold, Some(60));
    assert_eq!(driver.tcool_threshold, Some(400));
    assert_eq!(driver.hold_delay_ms, Some(100));
    assert_eq!(driver.power_down_delay_ms, Some(2000));
    assert!(driver.inverse_direction);
}

/// Test that omitted fields take their defaults.
#[test]
fn test_parse_defaults() {
    let config = parse_config("[drivers.z_axis]\n").expect("Failed to parse TOML");
    let driver = config.driver("z_axis").expect("Driver not found");

    assert_eq!(driver.address, 0);
    assert_eq!(driver.rsense.0, 0.11);
    assert_eq!(driver.oscillator_freq, 12_000_000);
    assert_eq!(driver.hold_current_scale, 1.0);
    assert!(driver.run_current.is_none());
    assert!(driver.microsteps.is_none());
    assert!(!driver.internal_rsense);
}

/// Test several drivers sharing one bus.
#[test]
fn test_parse_multiple_drivers() {
    let toml_str = r#"
[drivers.x_axis]
address = 0

[drivers.y_axis]
address = 1

[drivers.extruder]
address = 3
run_current = 0.6
"#;

    let config = parse_config(toml_str).unwrap();
    let names: Vec<_> = config.driver_names().collect();
    assert_eq!(names, vec!["x_axis", "y_axis", "extruder"]);
    assert_eq!(config.driver("extruder").unwrap().address, 3);
    assert!(config.driver("a_axis").is_none());
    assert!(matches!(
        config.require_driver("a_axis"),
        Err(Error::Config(ConfigError::DriverNotFound(_)))
    ));
}

/// Test that a microstep value outside the valid set is rejected.
#[test]
fn test_parse_invalid_microsteps() {
    let toml_str = r#"
[drivers.x_axis]
microsteps = 48
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test the CoolStep table and the StealthChop threshold.
#[test]
fn test_parse_coolstep_table() {
    let toml_str = r#"
[drivers.x_axis]
tpwm_threshold = 1200

[drivers.x_axis.coolstep]
semin = 4
semax = 3
seimin = true
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let driver = config.driver("x_axis").unwrap();
    let coolstep = driver.coolstep.expect("CoolStep table missing");

    assert_eq!(driver.tpwm_threshold, Some(1200));
    assert_eq!(coolstep.semin, Some(4));
    assert_eq!(coolstep.semax, Some(3));
    assert_eq!(coolstep.seimin, Some(true));
    assert_eq!(coolstep.seup, None);
    assert_eq!(coolstep.sedn, None);
}

/// Test that a CoolStep value outside its bits is rejected.
#[test]
fn test_parse_invalid_coolstep() {
    let toml_str = r#"
[drivers.x_axis.coolstep]
seup = 7
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidCoolStep("seup", 7)))
    ));
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_file() {
    let path = std::env::temp_dir().join("tmc2209_uart_load_config_test.toml");
    std::fs::write(&path, "[drivers.x_axis]\naddress = 1\nrun_current = 1.2\n").unwrap();

    let config = load_config(&path).expect("Failed to load config");
    let driver = config.driver("x_axis").unwrap();
    assert_eq!(driver.address, 1);
    assert_eq!(driver.run_current.map(|a| a.0), Some(1.2));

    std::fs::remove_file(&path).ok();
}
