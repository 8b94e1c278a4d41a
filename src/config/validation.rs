//! Configuration validation.

use crate::error::{ConfigError, Result};
use crate::uart::DeviceAddress;

use super::{CoolStepConfig, DriverConfig, SystemConfig};

/// Largest value TCOOLTHRS and TPWMTHRS can hold.
const THRESHOLD_MAX: u32 = (1 << 20) - 1;

/// Validate a system configuration.
///
/// Checks every driver:
/// - Bus address is 0-3
/// - Sense resistor, run current and oscillator frequency are positive
/// - Hold current scale is within 0.0-1.0
/// - TCOOLTHRS and TPWMTHRS fit their registers
/// - CoolStep fields fit their bits
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_name, driver) in config.drivers.iter() {
        validate_driver(driver)?;
    }
    Ok(())
}

/// Validate a single driver configuration.
pub fn validate_driver(config: &DriverConfig) -> Result<()> {
    DeviceAddress::new(config.address)?;

    if !(config.rsense.0 > 0.0) {
        return Err(ConfigError::InvalidSenseResistor(config.rsense.0).into());
    }

    if config.oscillator_freq == 0 {
        return Err(ConfigError::InvalidOscillatorFrequency(config.oscillator_freq).into());
    }

    if let Some(current) = config.run_current {
        if !(current.0 > 0.0) {
            return Err(ConfigError::InvalidRunCurrent(current.0).into());
        }
    }

    if !(0.0..=1.0).contains(&config.hold_current_scale) {
        return Err(ConfigError::InvalidHoldScale(config.hold_current_scale).into());
    }

    if let Some(threshold) = config.tcool_threshold {
        if threshold > THRESHOLD_MAX {
            return Err(ConfigError::InvalidCoolThreshold(threshold).into());
        }
    }

    if let Some(threshold) = config.tpwm_threshold {
        if threshold > THRESHOLD_MAX {
            return Err(ConfigError::InvalidPwmThreshold(threshold).into());
        }
    }

    if let Some(coolstep) = &config.coolstep {
        validate_coolstep(coolstep)?;
    }

    Ok(())
}

fn validate_coolstep(config: &CoolStepConfig) -> Result<()> {
    for (name, value, max) in [
        ("semin", config.semin, 15),
        ("seup", config.seup, 3),
        ("semax", config.semax, 15),
        ("sedn", config.sedn, 3),
    ] {
        if let Some(value) = value {
            if value > max {
                return Err(ConfigError::InvalidCoolStep(name, value).into());
            }
        }
    }
    Ok(())
}
