//! TMC2209 driver instance.
//!
//! Generic over the [`UartChannel`] it talks through, so several drivers can
//! share one [`UartBus`](crate::uart::UartBus) by reference.

use crate::config::{validate_driver, DriverConfig};
use crate::error::{ConfigError, Error, Result};
use crate::events::{AlertListener, EventDispatcher, TriggerFlag};
use crate::register::map::{self, defaults, reg};
use crate::register::FieldSpec;
use crate::registry::DeviceId;
use crate::uart::{protocol, DeviceAddress, UartChannel};

use super::monitor::{StatusMonitor, StatusSample};
use super::status::DriverStatus;

/// One TMC2209 on a single-wire UART bus.
///
/// # Concurrency
///
/// Field writes that cover only part of a register are a read followed by a
/// write. Two writers updating fields of the same register must not be
/// interleaved, otherwise one of the updates is lost. Taking `&mut self` for
/// every write enforces this for a single driver instance; it cannot protect
/// against a second instance configured with the same node address.
pub struct Tmc2209<'a, C>
where
    C: UartChannel + ?Sized,
{
    /// Bus the chip is attached to.
    pub(super) bus: &'a C,

    /// Handle into the bus's device registry.
    pub(super) id: DeviceId,

    /// Node address, fixed at construction.
    pub(super) address: DeviceAddress,

    /// Sense resistor in Ohm.
    pub(super) rsense: f32,

    /// Internal sense resistors selected in GCONF.
    pub(super) internal_rsense: bool,

    /// Oscillator frequency in Hz, used for delay conversions.
    pub(super) oscillator_freq: u32,

    /// Last requested RMS run current, re-applied when the hold scale changes.
    pub(super) rms_current: Option<f32>,

    /// Hold current as a fraction of the run current.
    pub(super) hold_scale: f32,

    /// Last written value of each write-only register, seeded with the
    /// values `setup()` programs.
    pub(super) shadow: [u32; map::WRITE_ONLY.len()],

    diag_flag: Option<&'a TriggerFlag>,
    index_flag: Option<&'a TriggerFlag>,
    monitor: StatusMonitor,
    dispatcher: EventDispatcher<'a>,
}

impl<'a, C> Tmc2209<'a, C>
where
    C: UartChannel + ?Sized,
{
    /// Register a driver with node address `address` on `bus`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidOscillatorFrequency` for a zero
    /// frequency, `RegistryError::RegistryFull` if the bus has no id left.
    pub fn new(bus: &'a C, address: DeviceAddress, oscillator_freq: u32) -> Result<Self> {
        if oscillator_freq == 0 {
            return Err(ConfigError::InvalidOscillatorFrequency(oscillator_freq).into());
        }
        let id = bus.register(address)?;
        Ok(Self {
            bus,
            id,
            address,
            rsense: crate::config::DEFAULT_RSENSE.value(),
            internal_rsense: false,
            oscillator_freq,
            rms_current: None,
            hold_scale: 1.0,
            shadow: map::WRITE_ONLY_RESET,
            diag_flag: None,
            index_flag: None,
            monitor: StatusMonitor::new(),
            dispatcher: EventDispatcher::new(),
        })
    }

    /// Register a driver from a validated configuration.
    ///
    /// Only host-side settings are taken over here; the chip is programmed by
    /// [`setup`](Self::setup) and [`configure`](Self::configure).
    pub fn from_config(bus: &'a C, config: &DriverConfig) -> Result<Self> {
        validate_driver(config)?;
        let mut driver = Self::new(bus, DeviceAddress::new(config.address)?, config.oscillator_freq)?;
        driver.rsense = config.rsense.value();
        driver.internal_rsense = config.internal_rsense;
        driver.hold_scale = config.hold_current_scale;
        Ok(driver)
    }

    /// Add a listener for alert events. Returns `false` if the list is full.
    pub fn add_listener(&mut self, listener: &'a dyn AlertListener) -> bool {
        self.dispatcher.add_listener(listener)
    }

    /// Take DIAG rising edges from `flag` instead of reading IOIN every poll.
    pub fn attach_diag_flag(&mut self, flag: &'a TriggerFlag) {
        self.diag_flag = Some(flag);
    }

    /// Watch INDEX rising edges through `flag`.
    ///
    /// Without an INDEX flag the index condition is never evaluated.
    pub fn attach_index_flag(&mut self, flag: &'a TriggerFlag) {
        self.index_flag = Some(flag);
    }

    /// Read a whole register.
    ///
    /// Write-only registers are answered from the last value written.
    pub fn read_register(&self, register: u8) -> Result<u32> {
        match map::write_only_index(register) {
            Some(slot) => Ok(self.shadow[slot]),
            None => protocol::read_register(self.bus, self.id, register),
        }
    }

    /// Write a whole register.
    pub fn write_register(&mut self, register: u8, value: u32) -> Result<()> {
        protocol::write_register(self.bus, self.id, register, value)?;
        if let Some(slot) = map::write_only_index(register) {
            self.shadow[slot] = value;
        }
        Ok(())
    }

    /// Read one field, sign-extended if the field is signed.
    pub fn read_field(&self, field: FieldSpec) -> Result<i32> {
        Ok(field.decode(self.read_register(field.register)?))
    }

    /// Write one field, keeping every other bit of its register.
    ///
    /// See the type level docs for the read-modify-write contract.
    pub fn write_field(&mut self, field: FieldSpec, value: i32) -> Result<()> {
        let word = if field.covers_register() {
            0
        } else {
            self.read_register(field.register)?
        };
        self.write_register(field.register, field.encode(word, value))
    }

    /// Program the power-on configuration and arm the alert handlers.
    pub fn setup(&mut self) -> Result<()> {
        log::debug!("setting up TMC2209 at address {}", self.address.value());

        let mut gconf = self.read_register(reg::GCONF)?;
        for (field, value) in [
            (map::I_SCALE_ANALOG, false),
            (map::INTERNAL_RSENSE, self.internal_rsense),
            (map::EN_SPREADCYCLE, false),
            (map::SHAFT, false),
            (map::INDEX_OTPW, true),
            (map::INDEX_STEP, false),
            (map::PDN_DISABLE, true),
            (map::MSTEP_REG_SELECT, true),
            (map::MULTISTEP_FILT, false),
            (map::TEST_MODE, false),
        ] {
            gconf = field.encode(gconf, value as i32);
        }
        self.write_register(reg::GCONF, gconf)?;

        self.write_register(reg::IHOLD_IRUN, defaults::IHOLD_IRUN)?;
        self.write_register(reg::TPOWERDOWN, defaults::TPOWERDOWN)?;
        self.write_register(reg::CHOPCONF, defaults::CHOPCONF)?;
        self.write_register(reg::PWMCONF, defaults::PWMCONF)?;
        self.write_register(reg::VACTUAL, 0)?;

        self.monitor.arm();

        if self.diag_flag.is_none() {
            log::info!(
                "no DIAG interrupt attached, stall detection relies on polling; poll frequently"
            );
        }
        Ok(())
    }

    /// Log the driver configuration and whether the chip answers.
    pub fn dump_config(&self) {
        log::info!("TMC2209 stepper driver:");
        log::info!("  address: {}", self.address.value());
        log::info!("  device id: {}", self.id.index());
        log::info!(
            "  sense resistor: {} Ohm ({})",
            self.rsense,
            if self.internal_rsense { "internal" } else { "external" }
        );
        log::info!("  oscillator frequency: {} Hz", self.oscillator_freq);
        log::info!("  DIAG source: {}", if self.diag_flag.is_some() { "interrupt" } else { "IOIN" });

        match self.read_field(map::VERSION) {
            Ok(version) if version == map::EXPECTED_VERSION as i32 => {
                log::info!("  chip version: {:#04x}", version);
            }
            Ok(version) => {
                log::error!(
                    "  chip version {:#04x}, expected {:#04x}: driver unreachable or misconfigured",
                    version,
                    map::EXPECTED_VERSION
                );
            }
            Err(e) => log::error!("  chip version unavailable: {}", e),
        }
    }

    /// Run one poll cycle: sample the status conditions and dispatch the
    /// alert events their transitions raise.
    ///
    /// A sample that cannot be read leaves its handlers untouched; the other
    /// conditions are still evaluated.
    ///
    /// # Errors
    ///
    /// Returns the first sampling error of this cycle after every readable
    /// condition was evaluated.
    pub fn poll(&mut self) -> Result<()> {
        let mut first_error: Option<Error> = None;
        let mut note = |e: Error| {
            log::warn!("status sample failed: {}", e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        };

        let diag = match self.diag_flag {
            Some(flag) => Some(flag.take()),
            None => match self.read_field(map::DIAG) {
                Ok(level) => Some(level != 0),
                Err(e) => {
                    note(e);
                    None
                }
            },
        };
        let index = self.index_flag.map(TriggerFlag::take);
        let drv_status = match self.read_register(reg::DRV_STATUS) {
            Ok(value) => Some(DriverStatus::from_register(value)),
            Err(e) => {
                note(e);
                None
            }
        };

        let sample = StatusSample {
            diag,
            index,
            drv_status,
        };
        self.monitor.evaluate(&sample, &self.dispatcher);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
