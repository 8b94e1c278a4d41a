//! RMS current programming through IRUN/IHOLD and the sense range.

use tmc2209_uart::current::scale_to_rms_current;
use tmc2209_uart::error::{ConfigError, Error};
use tmc2209_uart::register::map::{self, reg};
use tmc2209_uart::{DeviceAddress, Tmc2209};

use crate::common::FakeLine;

const VSENSE_BIT: u32 = 1 << 17;

#[test]
fn test_one_amp_on_110_milliohm() {
    let line = FakeLine::new();
    let bus = line.bus();
    let mut driver = Tmc2209::new(&bus, DeviceAddress::new(0).unwrap(), 12_000_000).unwrap();
    driver.setup().unwrap();

    assert_eq!(driver.rsense(), 0.11);
    let cs = driver.set_rms_current(1.0).unwrap();

    assert!(!cs.vsense);
    assert!(!cs.limited);
    assert_eq!(line.register(0, reg::CHOPCONF) & VSENSE_BIT, 0);
    assert_eq!(driver.read_field(map::IRUN).unwrap(), cs.scale as i32);
    assert!((scale_to_rms_current(cs.scale, cs.vsense, 0.11) - 1.0).abs() <= 0.05);
    assert!((driver.rms_current().unwrap() - 1.0).abs() <= 0.05);
}

#[test]
fn test_hold_current_follows_fraction() {
    let line = FakeLine::new();
    let bus = line.bus();
    let mut driver = Tmc2209::new(&bus, DeviceAddress::new(0).unwrap(), 12_000_000).unwrap();
    driver.setup().unwrap();

    driver.set_rms_current(1.0).unwrap();
    assert_eq!(driver.read_field(map::IHOLD).unwrap(), 17);

    driver.set_hold_current_scale(0.5).unwrap();
    assert_eq!(driver.hold_current_scale(), 0.5);
    assert_eq!(driver.read_field(map::IRUN).unwrap(), 17);
    assert_eq!(driver.read_field(map::IHOLD).unwrap(), 9);
    // IHOLDDELAY from setup survives
    assert_eq!(line.register(0, reg::IHOLD_IRUN), 0x0007_1109);
}

#[test]
fn test_low_current_selects_high_sensitivity() {
    let line = FakeLine::new();
    let bus = line.bus();
    let mut driver = Tmc2209::new(&bus, DeviceAddress::new(0).unwrap(), 12_000_000).unwrap();

    let cs = driver.set_rms_current(0.3).unwrap();
    assert!(cs.vsense);
    assert!(driver.vsense().unwrap());
    assert_eq!(line.register(0, reg::CHOPCONF) & VSENSE_BIT, VSENSE_BIT);
    assert!((driver.rms_current().unwrap() - 0.3).abs() <= 0.03);
}

#[test]
fn test_excessive_current_is_limited() {
    let line = FakeLine::new();
    let bus = line.bus();
    let mut driver = Tmc2209::new(&bus, DeviceAddress::new(0).unwrap(), 12_000_000).unwrap();

    driver.set_rsense(0.15).unwrap();
    let cs = driver.set_rms_current(3.0).unwrap();
    assert!(cs.limited);
    assert_eq!(driver.read_field(map::IRUN).unwrap(), 31);
    assert!(driver.rms_current().unwrap() < 3.0);
}

#[test]
fn test_invalid_current_settings() {
    let line = FakeLine::new();
    let bus = line.bus();
    let mut driver = Tmc2209::new(&bus, DeviceAddress::new(0).unwrap(), 12_000_000).unwrap();

    assert!(matches!(
        driver.set_hold_current_scale(1.5),
        Err(Error::Config(ConfigError::InvalidHoldScale(_)))
    ));
    assert!(matches!(
        driver.set_rms_current(-1.0),
        Err(Error::Config(ConfigError::InvalidRunCurrent(_)))
    ));
    assert!(matches!(
        driver.set_rsense(0.0),
        Err(Error::Config(ConfigError::InvalidSenseResistor(_)))
    ));
    assert_eq!(driver.hold_current_scale(), 1.0);
}
