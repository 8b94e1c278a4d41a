//! Shared single-wire bus with echo suppression.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadExactError, ReadReady, Write};

use crate::error::{Result, TransportError};
use crate::registry::{DeviceId, DeviceRegistry};

use super::protocol::UartChannel;
use super::DeviceAddress;

/// Bounded retry for transient transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total tries per transaction, at least 1.
    pub attempts: u8,
    /// Delay before the first retry; doubled for every further retry.
    pub backoff_ms: u32,
}

impl RetryPolicy {
    /// Single attempt, errors surface immediately.
    pub const NONE: Self = Self {
        attempts: 1,
        backoff_ms: 0,
    };

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> u32 {
        self.backoff_ms.saturating_mul(1u32 << retry.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_ms: 1,
        }
    }
}

/// A single-wire UART line shared by up to four TMC2209 nodes.
///
/// Devices are registered once during setup. All later accesses are
/// synchronous and happen from the thread that owns the bus, so the line and
/// the registry live in `RefCell`s and drivers share the bus by reference.
pub struct UartBus<S, D> {
    serial: RefCell<S>,
    delay: RefCell<D>,
    devices: RefCell<DeviceRegistry<DeviceAddress>>,
    retry: RetryPolicy,
}

impl<S, D> UartBus<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    /// Create a bus over `serial`, using `delay` for retry backoff.
    pub fn new(serial: S, delay: D) -> Self {
        Self {
            serial: RefCell::new(serial),
            delay: RefCell::new(delay),
            devices: RefCell::new(DeviceRegistry::new()),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            attempts: retry.attempts.max(1),
            ..retry
        };
        self
    }

    /// Number of registered devices.
    pub fn device_count(&self) -> usize {
        self.devices.borrow().len()
    }

    /// Give back the serial line and delay provider.
    pub fn release(self) -> (S, D) {
        (self.serial.into_inner(), self.delay.into_inner())
    }

    /// Drop whatever is left in the receive buffer.
    fn discard_input(serial: &mut S) -> core::result::Result<(), TransportError> {
        let mut scratch = [0u8; 8];
        while serial.read_ready().map_err(|_| TransportError::Serial)? {
            let n = serial.read(&mut scratch).map_err(|_| TransportError::Serial)?;
            if n == 0 {
                break;
            }
            log::trace!("discarded {} stale bytes", n);
        }
        Ok(())
    }

    fn read_exact(serial: &mut S, buf: &mut [u8]) -> core::result::Result<(), TransportError> {
        serial.read_exact(buf).map_err(|e| match e {
            ReadExactError::UnexpectedEof => TransportError::Timeout,
            ReadExactError::Other(_) => TransportError::Serial,
        })
    }
}

impl<S, D> UartChannel for UartBus<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    fn register(&self, address: DeviceAddress) -> Result<DeviceId> {
        let id = self.devices.borrow_mut().register(address)?;
        log::debug!("registered device {} at node address {}", id.index(), address.value());
        Ok(id)
    }

    fn read_write_uart(
        &self,
        id: DeviceId,
        data: &mut [u8],
        write_len: usize,
        read_len: usize,
    ) -> Result<()> {
        self.devices.borrow().lookup(id)?;

        let mut serial = self.serial.borrow_mut();
        Self::discard_input(&mut serial)?;

        if write_len > 0 {
            serial
                .write_all(&data[..write_len])
                .map_err(|_| TransportError::Serial)?;
            serial.flush().map_err(|_| TransportError::Serial)?;

            // chop the echo of our own datagram off the receive buffer
            Self::read_exact(&mut serial, &mut data[..write_len])?;
            if read_len == 0 {
                Self::discard_input(&mut serial)?;
            }
        }

        if read_len > 0 {
            Self::read_exact(&mut serial, &mut data[..read_len])?;
        }

        Ok(())
    }

    fn node_address(&self, id: DeviceId) -> Result<DeviceAddress> {
        Ok(*self.devices.borrow().lookup(id)?)
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn pause_ms(&self, ms: u32) {
        if ms > 0 {
            self.delay.borrow_mut().delay_ms(ms);
        }
    }
}
