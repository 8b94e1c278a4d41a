//! Unit types for electrical quantities and chip settings.
//!
//! Provides type-safe representations of currents, resistances and
//! microstep resolutions, plus the conversions between milliseconds and the
//! chip's clock-divided delay factors.

use serde::Deserialize;

use crate::error::ConfigError;

/// Current in amperes (RMS).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Amperes(pub f32);

impl Amperes {
    /// Create a new Amperes value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Resistance in Ohm.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Ohms(pub f32);

impl Ohms {
    /// Create a new Ohms value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Microstep divisor (1, 2, 4, 8, 16, 32, 64, 128, 256).
///
/// Validated at construction to be a power of 2 within the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Microsteps(u16);

impl Microsteps {
    /// Full step (no microstepping).
    pub const FULL: Self = Self(1);
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth step.
    pub const SIXTEENTH: Self = Self(16);
    /// Thirty-second step.
    pub const THIRTY_SECOND: Self = Self(32);
    /// Sixty-fourth step.
    pub const SIXTY_FOURTH: Self = Self(64);
    /// 128th step.
    pub const ONE_TWENTY_EIGHTH: Self = Self(128);
    /// 256th step (maximum resolution, chip reset value).
    pub const TWO_FIFTY_SIXTH: Self = Self(256);

    /// Valid microstep values.
    pub const VALID_VALUES: [u16; 9] = [1, 2, 4, 8, 16, 32, 64, 128, 256];

    /// Create a new Microsteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMicrosteps` if the value is not a valid power of 2.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if Self::VALID_VALUES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Check if a value is valid.
    #[inline]
    pub fn is_valid(value: u16) -> bool {
        Self::VALID_VALUES.contains(&value)
    }

    /// CHOPCONF.MRES encoding: 0 = 256 microsteps ... 8 = full step.
    #[inline]
    pub fn mres(self) -> u8 {
        8 - self.0.trailing_zeros() as u8
    }

    /// Decode CHOPCONF.MRES. Values above 8 also select full step.
    #[inline]
    pub fn from_mres(mres: u8) -> Self {
        Self(256 >> mres.min(8))
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self::TWO_FIFTY_SIXTH
    }
}

impl TryFrom<u16> for Microsteps {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// Oscillator clocks per delay factor step of IHOLDDELAY and TPOWERDOWN.
pub const DELAY_CLOCK_DIVISOR: u64 = 262_144;

/// Convert a delay in milliseconds to the nearest raw delay factor.
///
/// `raw = ms / 1000 * f_osc / 262144`
pub fn delay_factor_from_ms(ms: u32, oscillator_freq: u32) -> u32 {
    let denominator = 1000 * DELAY_CLOCK_DIVISOR;
    let raw = (ms as u64 * oscillator_freq as u64 + denominator / 2) / denominator;
    raw.min(u32::MAX as u64) as u32
}

/// Convert a raw delay factor to milliseconds, rounded to nearest.
pub fn delay_factor_to_ms(raw: u32, oscillator_freq: u32) -> u32 {
    if oscillator_freq == 0 {
        return 0;
    }
    let fosc = oscillator_freq as u64;
    let ms = (raw as u64 * DELAY_CLOCK_DIVISOR * 1000 + fosc / 2) / fosc;
    ms.min(u32::MAX as u64) as u32
}
