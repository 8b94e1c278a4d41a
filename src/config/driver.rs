//! Driver configuration from TOML.

use serde::Deserialize;

use super::units::{Amperes, Microsteps, Ohms};

/// Configuration of one TMC2209.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// Node address on the UART bus (0-3).
    #[serde(default)]
    pub address: u8,

    /// Sense resistor value.
    #[serde(default = "default_rsense")]
    pub rsense: Ohms,

    /// Use the chip's internal sense resistors instead of external ones.
    #[serde(default)]
    pub internal_rsense: bool,

    /// Oscillator frequency in Hz (only used for delay conversions).
    #[serde(default = "default_oscillator_freq")]
    pub oscillator_freq: u32,

    /// RMS run current.
    #[serde(default)]
    pub run_current: Option<Amperes>,

    /// Hold current as a fraction of the run current (0.0-1.0).
    #[serde(default = "default_hold_current_scale")]
    pub hold_current_scale: f32,

    /// Microstep resolution.
    #[serde(default)]
    pub microsteps: Option<Microsteps>,

    /// StallGuard threshold (SGTHRS).
    #[serde(default)]
    pub stall_threshold: Option<u8>,

    /// Lower velocity bound for stall detection (TCOOLTHRS, 20 bit).
    #[serde(default)]
    pub tcool_threshold: Option<u32>,

    /// Upper velocity bound for StealthChop (TPWMTHRS, 20 bit).
    #[serde(default)]
    pub tpwm_threshold: Option<u32>,

    /// CoolStep current control (`[drivers.<name>.coolstep]`).
    #[serde(default)]
    pub coolstep: Option<CoolStepConfig>,

    /// Delay before ramping down to hold current, in milliseconds.
    #[serde(default)]
    pub hold_delay_ms: Option<u32>,

    /// Delay from standstill to power down, in milliseconds.
    #[serde(default)]
    pub power_down_delay_ms: Option<u32>,

    /// Invert the motor direction (GCONF.shaft).
    #[serde(default)]
    pub inverse_direction: bool,
}

/// CoolStep settings written to COOLCONF. Omitted keys keep the register's
/// bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CoolStepConfig {
    /// Lower StallGuard threshold (SEMIN, 0-15). 0 disables CoolStep.
    #[serde(default)]
    pub semin: Option<u8>,

    /// Current increment step width (SEUP, 0-3).
    #[serde(default)]
    pub seup: Option<u8>,

    /// Upper StallGuard hysteresis (SEMAX, 0-15).
    #[serde(default)]
    pub semax: Option<u8>,

    /// Current decrement speed (SEDN, 0-3).
    #[serde(default)]
    pub sedn: Option<u8>,

    /// Minimum current of 1/4 instead of 1/2 of IRUN (SEIMIN).
    #[serde(default)]
    pub seimin: Option<bool>,
}

/// Sense resistor fitted to most TMC2209 breakout boards.
pub const DEFAULT_RSENSE: Ohms = Ohms(0.11);

/// Internal oscillator frequency.
pub const DEFAULT_OSCILLATOR_FREQ: u32 = 12_000_000;

fn default_rsense() -> Ohms {
    DEFAULT_RSENSE
}

fn default_oscillator_freq() -> u32 {
    DEFAULT_OSCILLATOR_FREQ
}

fn default_hold_current_scale() -> f32 {
    1.0
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: 0,
            rsense: DEFAULT_RSENSE,
            internal_rsense: false,
            oscillator_freq: DEFAULT_OSCILLATOR_FREQ,
            run_current: None,
            hold_current_scale: default_hold_current_scale(),
            microsteps: None,
            stall_threshold: None,
            tcool_threshold: None,
            tpwm_threshold: None,
            coolstep: None,
            hold_delay_ms: None,
            power_down_delay_ms: None,
            inverse_direction: false,
        }
    }
}
