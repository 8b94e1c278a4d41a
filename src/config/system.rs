//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use crate::error::{ConfigError, Result};

use super::driver::DriverConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemConfig {
    /// Named driver configurations.
    pub drivers: FnvIndexMap<String<32>, DriverConfig, 8>,
}

impl SystemConfig {
    /// Get a driver configuration by name.
    pub fn driver(&self, name: &str) -> Option<&DriverConfig> {
        self.drivers
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a driver configuration by name, failing if it is missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DriverNotFound` with the requested name.
    pub fn require_driver(&self, name: &str) -> Result<&DriverConfig> {
        self.driver(name).ok_or_else(|| {
            let mut missing = String::new();
            let _ = missing.push_str(name);
            ConfigError::DriverNotFound(missing).into()
        })
    }

    /// List all driver names.
    pub fn driver_names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(|s| s.as_str())
    }
}
