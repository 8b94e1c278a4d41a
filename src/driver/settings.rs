//! Configuration surface: paired getters and setters on top of the field
//! table.

use crate::config::units::{delay_factor_from_ms, delay_factor_to_ms, Microsteps};
use crate::config::{CoolStepConfig, DriverConfig};
use crate::current::{self, CurrentScale};
use crate::error::{ConfigError, Result};
use crate::register::map::{self, reg};
use crate::register::FieldSpec;
use crate::registry::DeviceId;
use crate::uart::{DeviceAddress, UartChannel};

use super::status::{DriverStatus, GlobalStatus};
use super::Tmc2209;

/// Largest IHOLDDELAY factor.
pub const MAX_HOLD_DELAY: u32 = 15;

/// Largest TPOWERDOWN factor.
pub const MAX_POWER_DOWN_DELAY: u32 = 255;

/// Largest VACTUAL magnitude.
const VACTUAL_MAX: i32 = (1 << 23) - 1;

impl<'a, C> Tmc2209<'a, C>
where
    C: UartChannel + ?Sized,
{
    // Identity and sensing

    /// Node address on the bus.
    #[inline]
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Handle in the bus's device registry.
    #[inline]
    pub fn device_id(&self) -> DeviceId {
        self.id
    }

    /// Sense resistor in Ohm.
    #[inline]
    pub fn rsense(&self) -> f32 {
        self.rsense
    }

    /// Set the sense resistor. Takes effect with the next current update.
    pub fn set_rsense(&mut self, ohms: f32) -> Result<()> {
        if !(ohms > 0.0) {
            return Err(ConfigError::InvalidSenseResistor(ohms).into());
        }
        self.rsense = ohms;
        Ok(())
    }

    /// Whether the internal sense resistors are used.
    #[inline]
    pub fn internal_rsense(&self) -> bool {
        self.internal_rsense
    }

    /// Select internal or external sense resistors.
    pub fn set_internal_rsense(&mut self, internal: bool) -> Result<()> {
        self.write_field(map::INTERNAL_RSENSE, internal as i32)?;
        self.internal_rsense = internal;
        Ok(())
    }

    /// Oscillator frequency in Hz.
    #[inline]
    pub fn oscillator_freq(&self) -> u32 {
        self.oscillator_freq
    }

    /// Set the oscillator frequency used for delay conversions.
    pub fn set_oscillator_freq(&mut self, hz: u32) -> Result<()> {
        if hz == 0 {
            return Err(ConfigError::InvalidOscillatorFrequency(hz).into());
        }
        self.oscillator_freq = hz;
        Ok(())
    }

    // Motor current

    /// Set the RMS run current and derive the hold current from it.
    ///
    /// Selects the sense range, then writes IRUN and IHOLD together. A
    /// request above what the sense resistor allows is clamped and logged.
    pub fn set_rms_current(&mut self, amps: f32) -> Result<CurrentScale> {
        if !(amps >= 0.0) {
            return Err(ConfigError::InvalidRunCurrent(amps).into());
        }
        let cs = current::rms_current_to_scale(amps, self.rsense);
        if cs.limited {
            log::warn!(
                "{} A exceeds the range of a {} Ohm sense resistor, limited to {} A",
                amps,
                self.rsense,
                current::scale_to_rms_current(cs.scale, cs.vsense, self.rsense)
            );
        }

        self.write_field(map::VSENSE, cs.vsense as i32)?;

        let hold = current::hold_scale(cs.scale, self.hold_scale);
        let mut word = self.read_register(reg::IHOLD_IRUN)?;
        word = map::IRUN.encode(word, cs.scale as i32);
        word = map::IHOLD.encode(word, hold as i32);
        self.write_register(reg::IHOLD_IRUN, word)?;

        log::debug!("run current scale {} (vsense {}), hold scale {}", cs.scale, cs.vsense, hold);
        self.rms_current = Some(amps);
        Ok(cs)
    }

    /// RMS run current realised by the programmed IRUN and sense range.
    pub fn rms_current(&self) -> Result<f32> {
        let scale = self.read_field(map::IRUN)? as u8;
        let vsense = self.vsense()?;
        Ok(current::scale_to_rms_current(scale, vsense, self.rsense))
    }

    /// Hold current as a fraction of the run current.
    #[inline]
    pub fn hold_current_scale(&self) -> f32 {
        self.hold_scale
    }

    /// Set the hold current fraction (0.0-1.0), re-applying the run current
    /// if one was set.
    pub fn set_hold_current_scale(&mut self, fraction: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ConfigError::InvalidHoldScale(fraction).into());
        }
        self.hold_scale = fraction;
        if let Some(amps) = self.rms_current {
            self.set_rms_current(amps)?;
        }
        Ok(())
    }

    /// Write IRUN directly, clamped to 31.
    pub fn set_irun(&mut self, scale: u8) -> Result<()> {
        self.write_field(map::IRUN, scale.min(current::MAX_SCALE) as i32)
    }

    /// Write IHOLD directly, clamped to 31.
    pub fn set_ihold(&mut self, scale: u8) -> Result<()> {
        self.write_field(map::IHOLD, scale.min(current::MAX_SCALE) as i32)
    }

    /// High-sensitivity sense range selected.
    pub fn vsense(&self) -> Result<bool> {
        Ok(self.read_field(map::VSENSE)? != 0)
    }

    // Microstepping

    /// Set the microstep resolution.
    ///
    /// Values outside 1, 2, 4, ..., 256 leave CHOPCONF untouched.
    pub fn set_microsteps(&mut self, microsteps: u16) -> Result<()> {
        match Microsteps::new(microsteps) {
            Ok(ms) => self.write_field(map::MRES, ms.mres() as i32),
            Err(_) => {
                log::warn!("unsupported microstep resolution {}, keeping current setting", microsteps);
                Ok(())
            }
        }
    }

    /// Programmed microstep resolution.
    pub fn microsteps(&self) -> Result<u16> {
        let mres = self.read_field(map::MRES)? as u8;
        Ok(Microsteps::from_mres(mres).value())
    }

    /// Enable step interpolation to 256 microsteps.
    pub fn set_interpolation(&mut self, enabled: bool) -> Result<()> {
        self.write_field(map::INTPOL, enabled as i32)
    }

    /// Invert the motor direction.
    pub fn set_inverse_direction(&mut self, inverse: bool) -> Result<()> {
        self.write_field(map::SHAFT, inverse as i32)
    }

    /// Whether the motor direction is inverted.
    pub fn inverse_direction(&self) -> Result<bool> {
        Ok(self.read_field(map::SHAFT)? != 0)
    }

    /// Move at a constant velocity generated by the chip. 0 returns control
    /// to the STEP input.
    pub fn set_vactual(&mut self, velocity: i32) -> Result<()> {
        self.write_field(map::VACTUAL, velocity.clamp(-VACTUAL_MAX, VACTUAL_MAX))
    }

    // Stall detection

    /// StallGuard threshold (SGTHRS). A stall is flagged on DIAG when
    /// `SG_RESULT <= 2 * SGTHRS`.
    pub fn set_stall_threshold(&mut self, threshold: u8) -> Result<()> {
        self.write_register(reg::SGTHRS, threshold as u32)
    }

    /// Programmed StallGuard threshold.
    pub fn stall_threshold(&self) -> Result<u8> {
        Ok(self.read_register(reg::SGTHRS)? as u8)
    }

    /// Latest StallGuard result.
    pub fn stall_result(&self) -> Result<u16> {
        Ok(map::SG_RESULT.decode(self.read_register(reg::SG_RESULT)?) as u16)
    }

    /// Motor load relative to the stall threshold: 0.0 unloaded, 1.0 at the
    /// stall point.
    ///
    /// Infinite when SGTHRS is 255.
    pub fn motor_load(&self) -> Result<f32> {
        let result = self.stall_result()? as f32;
        let threshold = self.stall_threshold()? as f32;
        let span = 510.0 - threshold * 2.0;
        if span == 0.0 {
            return Ok(f32::INFINITY);
        }
        Ok((510.0 - result) / span)
    }

    /// Lower velocity bound for stall detection (TCOOLTHRS), clamped to
    /// 20 bits.
    pub fn set_tcool_threshold(&mut self, threshold: u32) -> Result<()> {
        let threshold = threshold.min(map::TCOOLTHRS.value_mask());
        self.write_register(reg::TCOOLTHRS, threshold)
    }

    /// Programmed TCOOLTHRS.
    pub fn tcool_threshold(&self) -> Result<u32> {
        Ok(self.read_register(reg::TCOOLTHRS)?)
    }

    /// Upper velocity bound for StealthChop (TPWMTHRS), clamped to 20 bits.
    /// Above it the chip switches to SpreadCycle; 0 disables switching.
    pub fn set_tpwm_threshold(&mut self, threshold: u32) -> Result<()> {
        let threshold = threshold.min(map::TPWMTHRS.value_mask());
        self.write_register(reg::TPWMTHRS, threshold)
    }

    /// Programmed TPWMTHRS.
    pub fn tpwm_threshold(&self) -> Result<u32> {
        self.read_register(reg::TPWMTHRS)
    }

    // CoolStep

    /// Lower StallGuard threshold for current increase (SEMIN). 0 turns
    /// CoolStep off.
    pub fn set_coolstep_semin(&mut self, value: u8) -> Result<()> {
        self.write_coolstep_field(map::SEMIN, value)
    }

    /// Programmed SEMIN.
    pub fn coolstep_semin(&self) -> Result<u8> {
        self.read_coolstep_field(map::SEMIN)
    }

    /// Current increment step width (SEUP).
    pub fn set_coolstep_seup(&mut self, value: u8) -> Result<()> {
        self.write_coolstep_field(map::SEUP, value)
    }

    /// Programmed SEUP.
    pub fn coolstep_seup(&self) -> Result<u8> {
        self.read_coolstep_field(map::SEUP)
    }

    /// StallGuard hysteresis for current decrease (SEMAX).
    pub fn set_coolstep_semax(&mut self, value: u8) -> Result<()> {
        self.write_coolstep_field(map::SEMAX, value)
    }

    /// Programmed SEMAX.
    pub fn coolstep_semax(&self) -> Result<u8> {
        self.read_coolstep_field(map::SEMAX)
    }

    /// Current decrement speed (SEDN).
    pub fn set_coolstep_sedn(&mut self, value: u8) -> Result<()> {
        self.write_coolstep_field(map::SEDN, value)
    }

    /// Programmed SEDN.
    pub fn coolstep_sedn(&self) -> Result<u8> {
        self.read_coolstep_field(map::SEDN)
    }

    /// Let CoolStep reduce the current to 1/4 of IRUN instead of 1/2.
    pub fn set_coolstep_seimin(&mut self, quarter: bool) -> Result<()> {
        self.write_field(map::SEIMIN, quarter as i32)
    }

    /// Whether the CoolStep minimum current is 1/4 of IRUN.
    pub fn coolstep_seimin(&self) -> Result<bool> {
        Ok(self.read_field(map::SEIMIN)? != 0)
    }

    /// Apply the set keys of `config` in one COOLCONF write.
    pub fn set_coolstep(&mut self, config: &CoolStepConfig) -> Result<()> {
        let mut word = self.read_register(reg::COOLCONF)?;
        for (field, value) in [
            (map::SEMIN, config.semin),
            (map::SEUP, config.seup),
            (map::SEMAX, config.semax),
            (map::SEDN, config.sedn),
            (map::SEIMIN, config.seimin.map(u8::from)),
        ] {
            if let Some(value) = value {
                word = field.encode(word, clamp_to_field(field, value) as i32);
            }
        }
        self.write_register(reg::COOLCONF, word)
    }

    fn write_coolstep_field(&mut self, field: FieldSpec, value: u8) -> Result<()> {
        self.write_field(field, clamp_to_field(field, value) as i32)
    }

    fn read_coolstep_field(&self, field: FieldSpec) -> Result<u8> {
        Ok(field.bits(self.read_register(reg::COOLCONF)?) as u8)
    }

    // Delays

    /// Set the delay factor from run to hold current.
    ///
    /// Factors above 15 are clamped with a warning.
    pub fn set_hold_delay(&mut self, factor: u32) -> Result<()> {
        let factor = if factor > MAX_HOLD_DELAY {
            log::warn!("hold delay factor {} clamped to {}", factor, MAX_HOLD_DELAY);
            MAX_HOLD_DELAY
        } else {
            factor
        };
        self.write_field(map::IHOLDDELAY, factor as i32)
    }

    /// Programmed hold delay factor.
    pub fn hold_delay(&self) -> Result<u32> {
        Ok(map::IHOLDDELAY.bits(self.read_register(reg::IHOLD_IRUN)?))
    }

    /// Set the hold delay in milliseconds.
    pub fn set_hold_delay_ms(&mut self, ms: u32) -> Result<()> {
        self.set_hold_delay(delay_factor_from_ms(ms, self.oscillator_freq))
    }

    /// Programmed hold delay in milliseconds.
    pub fn hold_delay_ms(&self) -> Result<u32> {
        Ok(delay_factor_to_ms(self.hold_delay()?, self.oscillator_freq))
    }

    /// Set the delay factor from standstill to power down.
    ///
    /// Factors above 255 are clamped with a warning.
    pub fn set_power_down_delay(&mut self, factor: u32) -> Result<()> {
        let factor = if factor > MAX_POWER_DOWN_DELAY {
            log::warn!("power down delay factor {} clamped to {}", factor, MAX_POWER_DOWN_DELAY);
            MAX_POWER_DOWN_DELAY
        } else {
            factor
        };
        self.write_register(reg::TPOWERDOWN, factor)
    }

    /// Programmed power down delay factor.
    pub fn power_down_delay(&self) -> Result<u32> {
        Ok(map::TPOWERDOWN.bits(self.read_register(reg::TPOWERDOWN)?))
    }

    /// Set the power down delay in milliseconds.
    pub fn set_power_down_delay_ms(&mut self, ms: u32) -> Result<()> {
        self.set_power_down_delay(delay_factor_from_ms(ms, self.oscillator_freq))
    }

    /// Programmed power down delay in milliseconds.
    pub fn power_down_delay_ms(&self) -> Result<u32> {
        Ok(delay_factor_to_ms(self.power_down_delay()?, self.oscillator_freq))
    }

    // Status

    /// Silicon version from IOIN.
    pub fn chip_version(&self) -> Result<u8> {
        Ok(self.read_field(map::VERSION)? as u8)
    }

    /// Whether the chip answers with the expected silicon version.
    pub fn is_reachable(&self) -> bool {
        matches!(self.chip_version(), Ok(map::EXPECTED_VERSION))
    }

    /// Current DIAG level from IOIN.
    pub fn diag(&self) -> Result<bool> {
        Ok(self.read_field(map::DIAG)? != 0)
    }

    /// Latched global status flags.
    pub fn global_status(&self) -> Result<GlobalStatus> {
        Ok(GlobalStatus::from_register(self.read_register(reg::GSTAT)?))
    }

    /// Clear all latched global status flags.
    pub fn clear_global_status(&mut self) -> Result<()> {
        let all = map::RESET.mask() | map::DRV_ERR.mask() | map::UV_CP.mask();
        self.write_register(reg::GSTAT, all)
    }

    /// Number of successful UART writes, wrapping at 256.
    pub fn transmission_count(&self) -> Result<u8> {
        Ok(self.read_field(map::IFCNT)? as u8)
    }

    /// Measured time between two microsteps, in oscillator clocks.
    pub fn tstep(&self) -> Result<u32> {
        Ok(map::TSTEP.bits(self.read_register(reg::TSTEP)?))
    }

    /// Decoded DRV_STATUS.
    pub fn driver_status(&self) -> Result<DriverStatus> {
        Ok(DriverStatus::from_register(self.read_register(reg::DRV_STATUS)?))
    }

    /// Actual current scale the chopper is running at.
    pub fn current_scale_actual(&self) -> Result<u8> {
        Ok(self.driver_status()?.cs_actual)
    }

    /// Whether the motor is at standstill.
    pub fn standstill(&self) -> Result<bool> {
        Ok(self.driver_status()?.standstill)
    }

    // Bulk configuration

    /// Apply the runtime settings of `config`.
    ///
    /// Call after [`setup`](Self::setup), which resets current and microstep
    /// registers to their defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidAddress` if `config` names another node address;
    /// validation and transport errors otherwise.
    pub fn configure(&mut self, config: &DriverConfig) -> Result<()> {
        crate::config::validate_driver(config)?;
        if config.address != self.address.value() {
            return Err(ConfigError::InvalidAddress(config.address).into());
        }

        self.set_rsense(config.rsense.value())?;
        self.set_oscillator_freq(config.oscillator_freq)?;
        self.hold_scale = config.hold_current_scale;
        self.set_internal_rsense(config.internal_rsense)?;
        self.set_inverse_direction(config.inverse_direction)?;

        if let Some(amps) = config.run_current {
            self.set_rms_current(amps.value())?;
        }
        if let Some(microsteps) = config.microsteps {
            self.set_microsteps(microsteps.value())?;
        }
        if let Some(threshold) = config.stall_threshold {
            self.set_stall_threshold(threshold)?;
        }
        if let Some(threshold) = config.tcool_threshold {
            self.set_tcool_threshold(threshold)?;
        }
        if let Some(threshold) = config.tpwm_threshold {
            self.set_tpwm_threshold(threshold)?;
        }
        if let Some(coolstep) = &config.coolstep {
            self.set_coolstep(coolstep)?;
        }
        if let Some(ms) = config.hold_delay_ms {
            self.set_hold_delay_ms(ms)?;
        }
        if let Some(ms) = config.power_down_delay_ms {
            self.set_power_down_delay_ms(ms)?;
        }
        Ok(())
    }
}

fn clamp_to_field(field: FieldSpec, value: u8) -> u8 {
    let max = field.value_mask() as u8;
    if value > max {
        log::warn!("value {} clamped to {}", value, max);
        max
    } else {
        value
    }
}
