//! Error types for the tmc2209-uart library.
//!
//! Provides unified error handling across the UART transport, the device
//! registry, configuration and pin sampling.

use core::fmt;

use crate::registry::DeviceId;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all driver operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Register transport error
    Transport(TransportError),
    /// Device registry error
    Registry(RegistryError),
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// DIAG/INDEX pin could not be sampled
    Pin,
}

/// Errors raised while exchanging datagrams with the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The serial line reported an I/O failure
    Serial,
    /// Fewer bytes than expected arrived before the line went quiet
    Timeout,
    /// Reply CRC does not match its contents
    CrcMismatch {
        /// CRC computed over the received bytes
        expected: u8,
        /// CRC carried by the reply
        received: u8,
    },
    /// Reply does not start with the sync nibble
    InvalidSync(u8),
    /// Reply is not addressed to the master (0xFF)
    UnexpectedAddress(u8),
    /// Reply carries a different register than was requested
    UnexpectedRegister {
        /// Requested register
        expected: u8,
        /// Register found in the reply
        received: u8,
    },
}

impl TransportError {
    /// Whether a retry of the same transaction may succeed.
    ///
    /// Line noise shows up as CRC errors or lost bytes. A well-formed reply
    /// for the wrong register or address points at a bus wiring or
    /// addressing fault and is reported immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Serial | TransportError::Timeout | TransportError::CrcMismatch { .. }
        )
    }
}

/// Device registry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// No device was ever registered under this id
    UnknownDeviceId(DeviceId),
    /// Registry capacity exhausted
    RegistryFull,
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Bus address out of range (0-3)
    InvalidAddress(u8),
    /// Sense resistor must be > 0 Ohm
    InvalidSenseResistor(f32),
    /// RMS run current must be > 0 A
    InvalidRunCurrent(f32),
    /// Hold current scale must be within 0.0-1.0
    InvalidHoldScale(f32),
    /// Oscillator frequency must be > 0 Hz
    InvalidOscillatorFrequency(u32),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// TCOOLTHRS exceeds its 20 bit register
    InvalidCoolThreshold(u32),
    /// TPWMTHRS exceeds its 20 bit register
    InvalidPwmThreshold(u32),
    /// CoolStep field value does not fit its bits (field name, value)
    InvalidCoolStep(&'static str, u8),
    /// Driver name not found in configuration
    DriverNotFound(heapless::String<32>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Pin => write!(f, "GPIO pin read failed"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Serial => write!(f, "serial line I/O failure"),
            TransportError::Timeout => write!(f, "no complete reply from device"),
            TransportError::CrcMismatch { expected, received } => {
                write!(f, "CRC mismatch: expected {:#04x}, received {:#04x}", expected, received)
            }
            TransportError::InvalidSync(b) => write!(f, "invalid sync byte {:#04x}", b),
            TransportError::UnexpectedAddress(a) => write!(f, "reply addressed to {:#04x}", a),
            TransportError::UnexpectedRegister { expected, received } => {
                write!(f, "reply for register {:#04x}, requested {:#04x}", received, expected)
            }
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownDeviceId(id) => write!(f, "unknown device id {}", id.index()),
            RegistryError::RegistryFull => write!(f, "device registry is full"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidAddress(a) => write!(f, "Invalid bus address: {}. Must be 0-3", a),
            ConfigError::InvalidSenseResistor(r) => {
                write!(f, "Invalid sense resistor: {} Ohm. Must be > 0", r)
            }
            ConfigError::InvalidRunCurrent(a) => write!(f, "Invalid run current: {} A. Must be > 0", a),
            ConfigError::InvalidHoldScale(s) => {
                write!(f, "Invalid hold current scale: {}. Must be 0.0-1.0", s)
            }
            ConfigError::InvalidOscillatorFrequency(hz) => {
                write!(f, "Invalid oscillator frequency: {} Hz. Must be > 0", hz)
            }
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidCoolThreshold(v) => {
                write!(f, "Invalid tcool threshold: {}. Must fit in 20 bits", v)
            }
            ConfigError::InvalidPwmThreshold(v) => {
                write!(f, "Invalid tpwm threshold: {}. Must fit in 20 bits", v)
            }
            ConfigError::InvalidCoolStep(field, v) => {
                write!(f, "Invalid CoolStep {}: {}. Out of range", field, v)
            }
            ConfigError::DriverNotFound(name) => write!(f, "Driver '{}' not found", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
