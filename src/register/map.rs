//! TMC2209 register addresses and field table.
//!
//! Field names follow the datasheet.

#![allow(missing_docs)]

use super::FieldSpec;

/// Register addresses.
pub mod reg {
    /// General configuration
    pub const GCONF: u8 = 0x00;
    /// Global status flags
    pub const GSTAT: u8 = 0x01;
    /// Interface transmission counter
    pub const IFCNT: u8 = 0x02;
    /// Input pin states and silicon version
    pub const IOIN: u8 = 0x06;
    /// Hold/run current settings
    pub const IHOLD_IRUN: u8 = 0x10;
    /// Power down delay
    pub const TPOWERDOWN: u8 = 0x11;
    /// Measured time between steps
    pub const TSTEP: u8 = 0x12;
    /// Upper velocity for StealthChop
    pub const TPWMTHRS: u8 = 0x13;
    /// Lower velocity for CoolStep/StallGuard
    pub const TCOOLTHRS: u8 = 0x14;
    /// Velocity set through UART
    pub const VACTUAL: u8 = 0x22;
    /// StallGuard threshold
    pub const SGTHRS: u8 = 0x40;
    /// StallGuard result
    pub const SG_RESULT: u8 = 0x41;
    /// CoolStep configuration
    pub const COOLCONF: u8 = 0x42;
    /// Microstep counter
    pub const MSCNT: u8 = 0x6A;
    /// Chopper configuration
    pub const CHOPCONF: u8 = 0x6C;
    /// Driver status
    pub const DRV_STATUS: u8 = 0x6F;
    /// StealthChop PWM configuration
    pub const PWMCONF: u8 = 0x70;
}

// GCONF
pub const I_SCALE_ANALOG: FieldSpec = FieldSpec::flag(reg::GCONF, 0);
pub const INTERNAL_RSENSE: FieldSpec = FieldSpec::flag(reg::GCONF, 1);
pub const EN_SPREADCYCLE: FieldSpec = FieldSpec::flag(reg::GCONF, 2);
pub const SHAFT: FieldSpec = FieldSpec::flag(reg::GCONF, 3);
pub const INDEX_OTPW: FieldSpec = FieldSpec::flag(reg::GCONF, 4);
pub const INDEX_STEP: FieldSpec = FieldSpec::flag(reg::GCONF, 5);
pub const PDN_DISABLE: FieldSpec = FieldSpec::flag(reg::GCONF, 6);
pub const MSTEP_REG_SELECT: FieldSpec = FieldSpec::flag(reg::GCONF, 7);
pub const MULTISTEP_FILT: FieldSpec = FieldSpec::flag(reg::GCONF, 8);
pub const TEST_MODE: FieldSpec = FieldSpec::flag(reg::GCONF, 9);

// GSTAT
pub const RESET: FieldSpec = FieldSpec::flag(reg::GSTAT, 0);
pub const DRV_ERR: FieldSpec = FieldSpec::flag(reg::GSTAT, 1);
pub const UV_CP: FieldSpec = FieldSpec::flag(reg::GSTAT, 2);

// IFCNT
pub const IFCNT: FieldSpec = FieldSpec::new(reg::IFCNT, 0, 8);

// IOIN
pub const DIAG: FieldSpec = FieldSpec::flag(reg::IOIN, 4);
pub const VERSION: FieldSpec = FieldSpec::new(reg::IOIN, 24, 8);

// IHOLD_IRUN
pub const IHOLD: FieldSpec = FieldSpec::new(reg::IHOLD_IRUN, 0, 5);
pub const IRUN: FieldSpec = FieldSpec::new(reg::IHOLD_IRUN, 8, 5);
pub const IHOLDDELAY: FieldSpec = FieldSpec::new(reg::IHOLD_IRUN, 16, 4);

pub const TPOWERDOWN: FieldSpec = FieldSpec::new(reg::TPOWERDOWN, 0, 8);
pub const TSTEP: FieldSpec = FieldSpec::new(reg::TSTEP, 0, 20);
pub const TPWMTHRS: FieldSpec = FieldSpec::new(reg::TPWMTHRS, 0, 20);
pub const TCOOLTHRS: FieldSpec = FieldSpec::new(reg::TCOOLTHRS, 0, 20);
pub const VACTUAL: FieldSpec = FieldSpec::signed(reg::VACTUAL, 0, 24);
pub const SG_RESULT: FieldSpec = FieldSpec::new(reg::SG_RESULT, 0, 10);

// COOLCONF
pub const SEMIN: FieldSpec = FieldSpec::new(reg::COOLCONF, 0, 4);
pub const SEUP: FieldSpec = FieldSpec::new(reg::COOLCONF, 5, 2);
pub const SEMAX: FieldSpec = FieldSpec::new(reg::COOLCONF, 8, 4);
pub const SEDN: FieldSpec = FieldSpec::new(reg::COOLCONF, 13, 2);
pub const SEIMIN: FieldSpec = FieldSpec::flag(reg::COOLCONF, 15);

// CHOPCONF
pub const VSENSE: FieldSpec = FieldSpec::flag(reg::CHOPCONF, 17);
pub const MRES: FieldSpec = FieldSpec::new(reg::CHOPCONF, 24, 4);
pub const INTPOL: FieldSpec = FieldSpec::flag(reg::CHOPCONF, 28);

// DRV_STATUS
pub const OTPW: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 0);
pub const OT: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 1);
pub const T120: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 8);
pub const T143: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 9);
pub const T150: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 10);
pub const T157: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 11);
pub const CS_ACTUAL: FieldSpec = FieldSpec::new(reg::DRV_STATUS, 16, 5);
pub const STEALTH: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 30);
pub const STST: FieldSpec = FieldSpec::flag(reg::DRV_STATUS, 31);

/// Registers the chip accepts but never answers. Their contents are only
/// known from the last write.
pub const WRITE_ONLY: [u8; 7] = [
    reg::IHOLD_IRUN,
    reg::TPOWERDOWN,
    reg::TPWMTHRS,
    reg::TCOOLTHRS,
    reg::VACTUAL,
    reg::SGTHRS,
    reg::COOLCONF,
];

/// Assumed contents of each [`WRITE_ONLY`] register before its first write,
/// matching what `setup()` programs.
pub const WRITE_ONLY_RESET: [u32; WRITE_ONLY.len()] = [
    defaults::IHOLD_IRUN,
    defaults::TPOWERDOWN,
    0,
    0,
    0,
    0,
    0,
];

/// Position of `register` in [`WRITE_ONLY`].
pub fn write_only_index(register: u8) -> Option<usize> {
    WRITE_ONLY.iter().position(|&r| r == register)
}

/// Silicon version reported in IOIN by every TMC2209.
pub const EXPECTED_VERSION: u8 = 0x21;

/// Power-on register defaults programmed by `setup()`.
pub mod defaults {
    /// IHOLD=3, IRUN=23, IHOLDDELAY=7
    pub const IHOLD_IRUN: u32 = 0x0007_1703;
    /// ~0.44 s at 12 MHz
    pub const TPOWERDOWN: u32 = 0x0000_0014;
    /// TOFF=3, HSTRT=5, MRES=256 microsteps, interpolation on
    pub const CHOPCONF: u32 = 0x1000_0053;
    /// StealthChop automatic tuning
    pub const PWMCONF: u32 = 0xC10D_0024;
}
