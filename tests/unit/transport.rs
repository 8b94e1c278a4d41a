//! Framing, echo handling, addressing and retry on the simulated line.

use tmc2209_uart::error::{Error, RegistryError, TransportError};
use tmc2209_uart::register::map::reg;
use tmc2209_uart::{DeviceAddress, RetryPolicy, Tmc2209, UartChannel};

use crate::common::{FakeLine, GCONF_RESET};

fn address(value: u8) -> DeviceAddress {
    DeviceAddress::new(value).unwrap()
}

#[test]
fn test_write_datagram_on_wire() {
    let line = FakeLine::new();
    let bus = line.bus();
    let mut driver = Tmc2209::new(&bus, address(0), 12_000_000).unwrap();

    driver.write_register(reg::GCONF, 0x40).unwrap();

    assert_eq!(line.transmitted(), vec![0x05, 0x00, 0x80, 0x00, 0x00, 0x00, 0x40, 0x47]);
    assert_eq!(line.register(0, reg::GCONF), 0x40);
    // echo consumed, nothing left for the next transaction
    assert_eq!(line.unread(), 0);
}

#[test]
fn test_read_request_on_wire() {
    let line = FakeLine::new();
    let bus = line.bus();
    let driver = Tmc2209::new(&bus, address(0), 12_000_000).unwrap();

    assert_eq!(driver.read_register(reg::GCONF).unwrap(), GCONF_RESET);
    assert_eq!(line.transmitted(), vec![0x05, 0x00, 0x00, 0x48]);
    assert_eq!(line.unread(), 0);
}

#[test]
fn test_multi_drop_addressing() {
    let line = FakeLine::with_chips(&[0, 2]);
    let bus = line.bus();
    let mut x_axis = Tmc2209::new(&bus, address(0), 12_000_000).unwrap();
    let mut y_axis = Tmc2209::new(&bus, address(2), 12_000_000).unwrap();

    assert_eq!(bus.device_count(), 2);
    assert_eq!(x_axis.device_id().index(), 0);
    assert_eq!(y_axis.device_id().index(), 1);

    x_axis.set_microsteps(16).unwrap();
    y_axis.set_microsteps(2).unwrap();

    assert_eq!(line.register(0, reg::CHOPCONF), 0x1400_0053);
    assert_eq!(line.register(2, reg::CHOPCONF), 0x1700_0053);
    assert_eq!(x_axis.microsteps().unwrap(), 16);
    assert_eq!(y_axis.microsteps().unwrap(), 2);
}

#[test]
fn test_stale_input_is_discarded() {
    let line = FakeLine::new();
    let bus = line.bus();
    let driver = Tmc2209::new(&bus, address(0), 12_000_000).unwrap();

    line.inject_noise(&[0xAA, 0x55, 0x05, 0xFF]);
    assert_eq!(driver.read_register(reg::GCONF).unwrap(), GCONF_RESET);
}

#[test]
fn test_corrupted_reply_is_retried() {
    let line = FakeLine::new();
    let bus = line.bus();
    let driver = Tmc2209::new(&bus, address(0), 12_000_000).unwrap();

    line.corrupt_next_replies(2);
    assert_eq!(driver.read_register(reg::GCONF).unwrap(), GCONF_RESET);
    assert_eq!(line.read_requests(), 3);
}

#[test]
fn test_retries_are_bounded() {
    let line = FakeLine::new();
    let bus = line.bus().with_retry(RetryPolicy {
        attempts: 2,
        backoff_ms: 1,
    });
    let driver = Tmc2209::new(&bus, address(0), 12_000_000).unwrap();

    line.corrupt_next_replies(5);
    assert!(matches!(
        driver.read_register(reg::GCONF),
        Err(Error::Transport(TransportError::CrcMismatch { .. }))
    ));
    assert_eq!(line.read_requests(), 2);
}

#[test]
fn test_absent_node_times_out() {
    let line = FakeLine::new();
    let bus = line.bus().with_retry(RetryPolicy::NONE);
    let driver = Tmc2209::new(&bus, address(1), 12_000_000).unwrap();

    assert_eq!(
        driver.read_register(reg::IOIN),
        Err(Error::Transport(TransportError::Timeout))
    );
    assert!(!driver.is_reachable());
}

#[test]
fn test_unknown_device_id() {
    let line = FakeLine::new();
    let registered = line.bus();
    let other = line.bus();
    let id = registered.register(address(0)).unwrap();

    let mut data = [0u8; 8];
    assert_eq!(
        other.read_write_uart(id, &mut data, 4, 8),
        Err(Error::Registry(RegistryError::UnknownDeviceId(id)))
    );
    assert_eq!(
        other.node_address(id),
        Err(Error::Registry(RegistryError::UnknownDeviceId(id)))
    );
}

#[test]
fn test_registry_full() {
    let line = FakeLine::new();
    let bus = line.bus();
    for _ in 0..tmc2209_uart::registry::MAX_DEVICES {
        bus.register(address(0)).unwrap();
    }
    assert!(matches!(
        Tmc2209::new(&bus, address(0), 12_000_000),
        Err(Error::Registry(RegistryError::RegistryFull))
    ));
}
