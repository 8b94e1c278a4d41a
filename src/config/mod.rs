//! Configuration module for tmc2209-uart.
//!
//! Provides types for loading and validating driver configurations from
//! TOML files (with `std` feature) or pre-parsed data.

mod driver;
#[cfg(feature = "std")]
mod loader;
mod system;
pub mod units;
mod validation;

pub use driver::{CoolStepConfig, DriverConfig, DEFAULT_OSCILLATOR_FREQ, DEFAULT_RSENSE};
pub use system::SystemConfig;
pub use validation::{validate_config, validate_driver};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Amperes, Microsteps, Ohms};
