//! # tmc2209-uart
//!
//! Configuration and monitoring of TMC2209 stepper drivers over the chip's
//! single-wire UART, with embedded-hal 1.0 / embedded-io support.
//!
//! ## Features
//!
//! - **Bit-exact framing**: CRC-8 datagrams, echo suppression, multi-drop
//!   node addressing for up to four chips per line
//! - **Typed field access**: read-modify-write that keeps neighbouring bits
//! - **Current scaling**: amperes to IRUN/IHOLD with automatic sense range
//! - **Edge-triggered alerts**: stall, index and the overtemperature ladder,
//!   delivered once per transition in a fixed order
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tmc2209_uart::{AlertEvent, DeviceAddress, Tmc2209, UartBus};
//!
//! let bus = UartBus::new(serial, delay);
//! let mut driver = Tmc2209::new(&bus, DeviceAddress::new(0)?, 12_000_000)?;
//!
//! let on_alert = |event: AlertEvent| log::warn!("{:?}", event);
//! driver.add_listener(&on_alert);
//!
//! driver.setup()?;
//! driver.set_rms_current(0.8)?;
//! driver.set_microsteps(16)?;
//!
//! loop {
//!     driver.poll()?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod config;
pub mod current;
pub mod driver;
pub mod error;
pub mod events;
pub mod register;
pub mod registry;
pub mod uart;

// Re-exports for ergonomic API
pub use config::{validate_config, CoolStepConfig, DriverConfig, SystemConfig};
pub use current::CurrentScale;
pub use driver::{DriverStatus, GlobalStatus, Tmc2209};
pub use error::{Error, Result};
pub use events::{AlertEvent, AlertListener, EdgeInput, EventDispatcher, ThresholdHandler, TriggerFlag};
pub use register::FieldSpec;
pub use registry::{DeviceId, DeviceRegistry};
pub use uart::{DeviceAddress, RetryPolicy, UartBus, UartChannel};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Amperes, Microsteps, Ohms};
