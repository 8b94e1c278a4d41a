//! Append-only registry mapping small integer ids to bus devices.
//!
//! The address-free protocol layer only ever hands a [`DeviceId`] back to
//! the bus. The registry is how the bus recovers which device a transaction
//! belongs to.

use heapless::Vec;

use crate::error::RegistryError;

/// Maximum number of devices a single registry can hold.
pub const MAX_DEVICES: usize = 8;

/// Process-scoped handle of a registered device.
///
/// Unrelated to the device's bus address: ids are handed out sequentially
/// in registration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(u16);

impl DeviceId {
    /// Raw index of this id.
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

/// Append-only device registry.
///
/// Entries are added during the single-threaded setup phase and are never
/// removed, so lookups stay valid for the lifetime of the registry.
#[derive(Debug)]
pub struct DeviceRegistry<T> {
    entries: Vec<T, MAX_DEVICES>,
}

impl<T> Default for DeviceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeviceRegistry<T> {
    /// Create a new empty registry.
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register an entry and return the next unused id.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::RegistryFull` once `MAX_DEVICES` entries exist.
    pub fn register(&mut self, entry: T) -> Result<DeviceId, RegistryError> {
        let id = DeviceId(self.entries.len() as u16);
        self.entries
            .push(entry)
            .map_err(|_| RegistryError::RegistryFull)?;
        Ok(id)
    }

    /// Look up a previously registered entry.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownDeviceId` if `id` was never handed out
    /// by this registry.
    pub fn lookup(&self, id: DeviceId) -> Result<&T, RegistryError> {
        self.entries
            .get(id.0 as usize)
            .ok_or(RegistryError::UnknownDeviceId(id))
    }

    /// Get the number of registered devices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, entry)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (DeviceId(i as u16), e))
    }
}
