//! Interrupt-to-poll handoff for the DIAG and INDEX pins.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;

use crate::error::{Error, Result};

/// Flag raised by a rising-edge interrupt and consumed by the poll cycle.
///
/// Exactly one writer (the interrupt handler) and one reader (the poll
/// cycle) touch a flag, so plain loads and stores suffice and no
/// compare-and-swap is needed.
#[derive(Debug, Default)]
pub struct TriggerFlag(AtomicBool);

impl TriggerFlag {
    /// Create a cleared flag. Usable in a `static`.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Record an edge. Safe to call from interrupt context.
    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether an edge is pending, without clearing it.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Read and clear the flag.
    #[inline]
    pub fn take(&self) -> bool {
        let triggered = self.0.load(Ordering::Acquire);
        if triggered {
            self.0.store(false, Ordering::Release);
        }
        triggered
    }
}

/// Software rising-edge detector for a pin without interrupt support.
///
/// Each [`sample`](Self::sample) reads the pin level and raises the flag on a
/// low to high transition, exactly like the rising-edge interrupt would.
pub struct EdgeInput<'a, P> {
    pin: P,
    flag: &'a TriggerFlag,
    last_high: bool,
}

impl<'a, P: InputPin> EdgeInput<'a, P> {
    /// Watch `pin`, reporting rising edges into `flag`.
    pub fn new(pin: P, flag: &'a TriggerFlag) -> Self {
        Self {
            pin,
            flag,
            last_high: false,
        }
    }

    /// Read the pin once. Returns `true` if a rising edge was detected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pin` if the pin cannot be read.
    pub fn sample(&mut self) -> Result<bool> {
        let high = self.pin.is_high().map_err(|_| Error::Pin)?;
        let rising = high && !self.last_high;
        self.last_high = high;
        if rising {
            self.flag.set();
        }
        Ok(rising)
    }

    /// Give back the pin.
    pub fn release(self) -> P {
        self.pin
    }
}
