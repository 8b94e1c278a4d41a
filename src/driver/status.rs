//! Decoded status registers.

use crate::register::map;

/// Parsed DRV_STATUS register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverStatus {
    /// Overtemperature pre-warning
    pub otpw: bool,
    /// Overtemperature shutdown
    pub ot: bool,
    /// Die temperature above 120 °C
    pub t120: bool,
    /// Die temperature above 143 °C
    pub t143: bool,
    /// Die temperature above 150 °C
    pub t150: bool,
    /// Die temperature above 157 °C
    pub t157: bool,
    /// Actual current scale (0-31)
    pub cs_actual: u8,
    /// StealthChop active
    pub stealth: bool,
    /// Motor standstill
    pub standstill: bool,
}

impl DriverStatus {
    /// Parse from raw DRV_STATUS register value.
    pub fn from_register(value: u32) -> Self {
        let flag = |field: crate::register::FieldSpec| field.decode(value) != 0;
        Self {
            otpw: flag(map::OTPW),
            ot: flag(map::OT),
            t120: flag(map::T120),
            t143: flag(map::T143),
            t150: flag(map::T150),
            t157: flag(map::T157),
            cs_actual: map::CS_ACTUAL.decode(value) as u8,
            stealth: flag(map::STEALTH),
            standstill: flag(map::STST),
        }
    }

    /// Neither pre-warning nor overtemperature is active.
    #[inline]
    pub fn temperature_normal(&self) -> bool {
        !self.otpw && !self.ot
    }
}

/// Parsed GSTAT register. Flags stay latched until cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalStatus {
    /// The chip was reset since the last clear
    pub reset: bool,
    /// Driver shut down due to overtemperature or short circuit
    pub drv_err: bool,
    /// Charge pump undervoltage
    pub uv_cp: bool,
}

impl GlobalStatus {
    /// Parse from raw GSTAT register value.
    pub fn from_register(value: u32) -> Self {
        Self {
            reset: map::RESET.decode(value) != 0,
            drv_err: map::DRV_ERR.decode(value) != 0,
            uv_cp: map::UV_CP.decode(value) != 0,
        }
    }
}
