//! Single-wire UART transport.
//!
//! The TMC2209 shares one line for transmit and receive, so every byte the
//! host sends is echoed back into its own receive buffer. [`UartBus`] owns
//! the line, strips the echo and keeps the registry of devices (up to four
//! chips can share a line, selected by their node address). The
//! [`protocol`] functions build datagrams without knowing which device they
//! talk to and reach the line only through [`UartChannel`] with a
//! [`DeviceId`](crate::registry::DeviceId).

mod bus;
pub mod frame;
pub mod protocol;

pub use bus::{RetryPolicy, UartBus};
pub use protocol::UartChannel;

use crate::error::ConfigError;

/// Node address (0-3) of a chip on a multi-drop bus, set by its MS1/MS2 pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    /// Highest node address a TMC2209 can be strapped to.
    pub const MAX: u8 = 3;

    /// Create a new address with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAddress` for values above 3.
    pub fn new(address: u8) -> Result<Self, ConfigError> {
        if address <= Self::MAX {
            Ok(Self(address))
        } else {
            Err(ConfigError::InvalidAddress(address))
        }
    }

    /// Get the raw address.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DeviceAddress {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
