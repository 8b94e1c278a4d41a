//! Address-free register access.
//!
//! These functions know the datagram format but nothing about which line or
//! node they talk to: everything device specific is recovered from the
//! [`DeviceId`] through the [`UartChannel`].

use crate::error::{Error, Result};
use crate::registry::DeviceId;

use super::frame::{self, READ_REQUEST_LEN, REPLY_LEN, WRITE_LEN};
use super::{DeviceAddress, RetryPolicy};

/// Callback surface the protocol layer uses to reach a device.
pub trait UartChannel {
    /// Register a device with node address `address` and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::RegistryFull` when no id is left.
    fn register(&self, address: DeviceAddress) -> Result<DeviceId>;

    /// Transmit `data[..write_len]`, discard its echo, then receive
    /// `read_len` reply bytes into `data[..read_len]`.
    ///
    /// # Errors
    ///
    /// `RegistryError::UnknownDeviceId` for an id the channel never handed
    /// out; transport errors for line failures.
    fn read_write_uart(
        &self,
        id: DeviceId,
        data: &mut [u8],
        write_len: usize,
        read_len: usize,
    ) -> Result<()>;

    /// Node address the device with `id` was registered with.
    fn node_address(&self, id: DeviceId) -> Result<DeviceAddress>;

    /// Retry policy for transient failures.
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::NONE
    }

    /// Block for `ms` milliseconds between retries.
    fn pause_ms(&self, _ms: u32) {}
}

/// Write a whole register.
pub fn write_register<C>(channel: &C, id: DeviceId, register: u8, value: u32) -> Result<()>
where
    C: UartChannel + ?Sized,
{
    let node = channel.node_address(id)?;
    let datagram = frame::write_datagram(node.value(), register, value);
    log::trace!("write {:#04x} <- {:#010x} {:02x?}", register, value, datagram);

    with_retry(channel, register, || {
        let mut data = datagram;
        channel.read_write_uart(id, &mut data, WRITE_LEN, 0)
    })
}

/// Read a whole register.
pub fn read_register<C>(channel: &C, id: DeviceId, register: u8) -> Result<u32>
where
    C: UartChannel + ?Sized,
{
    let node = channel.node_address(id)?;
    let request = frame::read_request(node.value(), register);

    let value = with_retry(channel, register, || {
        let mut data = [0u8; REPLY_LEN];
        data[..READ_REQUEST_LEN].copy_from_slice(&request);
        channel.read_write_uart(id, &mut data, READ_REQUEST_LEN, REPLY_LEN)?;
        Ok(frame::parse_reply(register, &data)?)
    })?;

    log::trace!("read {:#04x} -> {:#010x}", register, value);
    Ok(value)
}

fn with_retry<C, T>(channel: &C, register: u8, mut op: impl FnMut() -> Result<T>) -> Result<T>
where
    C: UartChannel + ?Sized,
{
    let policy = channel.retry_policy();
    let mut retry = 0u32;
    loop {
        match op() {
            Err(Error::Transport(e)) if e.is_transient() && retry + 1 < u32::from(policy.attempts) => {
                log::warn!("register {:#04x}: {}, retrying", register, e);
                channel.pause_ms(policy.backoff(retry));
                retry += 1;
            }
            result => return result,
        }
    }
}
