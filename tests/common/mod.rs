//! Simulated single-wire UART line with TMC2209 chips attached.
//!
//! Every byte written is echoed into the receive buffer, like on the real
//! line. Complete datagrams are decoded and answered by the chip whose node
//! address they carry; a datagram for an absent node gets no reply.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal_mock::eh1::delay::NoopDelay;
use tmc2209_uart::register::map::{self, reg};
use tmc2209_uart::UartBus;

/// Reset value of GCONF (i_scale_analog and multistep_filt set).
pub const GCONF_RESET: u32 = 0x0000_0101;
/// IOIN with silicon version 0x21 and every input low.
pub const IOIN_RESET: u32 = 0x2100_0000;

/// Register file of one simulated chip.
#[derive(Debug, Clone)]
pub struct FakeChip {
    pub registers: [u32; 128],
}

impl FakeChip {
    fn new() -> Self {
        let mut registers = [0u32; 128];
        registers[reg::GCONF as usize] = GCONF_RESET;
        registers[reg::GSTAT as usize] = 0x1;
        registers[reg::IOIN as usize] = IOIN_RESET;
        registers[reg::CHOPCONF as usize] = 0x1000_0053;
        registers[reg::SG_RESULT as usize] = 510;
        Self { registers }
    }

    fn write(&mut self, register: u8, value: u32) {
        match register {
            // write one to clear
            reg::GSTAT => self.registers[register as usize] &= !value,
            reg::IFCNT | reg::IOIN | reg::TSTEP | reg::SG_RESULT | reg::MSCNT | reg::DRV_STATUS => {}
            _ => self.registers[register as usize] = value,
        }
        let count = &mut self.registers[reg::IFCNT as usize];
        *count = (*count + 1) & 0xFF;
    }
}

#[derive(Debug, Default)]
struct LineState {
    chips: [Option<FakeChip>; 4],
    rx: VecDeque<u8>,
    pending: Vec<u8>,
    transmitted: Vec<u8>,
    corrupt_replies: usize,
    requests: usize,
}

/// Handle to the simulated line. Clones share the same line.
#[derive(Debug, Clone, Default)]
pub struct FakeLine {
    state: Rc<RefCell<LineState>>,
}

fn crc(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |mut crc, &byte| {
        let mut byte = byte;
        for _ in 0..8 {
            let mix = (crc >> 7) ^ (byte & 1);
            crc <<= 1;
            if mix != 0 {
                crc ^= 0x07;
            }
            byte >>= 1;
        }
        crc
    })
}

impl FakeLine {
    /// Line with one chip at node address 0.
    pub fn new() -> Self {
        Self::with_chips(&[0])
    }

    /// Line with chips at the given node addresses.
    pub fn with_chips(addresses: &[u8]) -> Self {
        let line = Self::default();
        for &address in addresses {
            line.state.borrow_mut().chips[address as usize] = Some(FakeChip::new());
        }
        line
    }

    /// A bus over a clone of this line.
    pub fn bus(&self) -> UartBus<FakeLine, NoopDelay> {
        UartBus::new(self.clone(), NoopDelay::new())
    }

    /// Register of the chip at `address`.
    pub fn register(&self, address: u8, register: u8) -> u32 {
        self.state.borrow().chips[address as usize]
            .as_ref()
            .expect("no chip at address")
            .registers[register as usize]
    }

    /// Overwrite a register of the chip at `address` without a transaction.
    pub fn set_register(&self, address: u8, register: u8, value: u32) {
        self.state.borrow_mut().chips[address as usize]
            .as_mut()
            .expect("no chip at address")
            .registers[register as usize] = value;
    }

    /// Flip the CRC of the next `count` replies.
    pub fn corrupt_next_replies(&self, count: usize) {
        self.state.borrow_mut().corrupt_replies = count;
    }

    /// Put stray bytes into the receive buffer.
    pub fn inject_noise(&self, bytes: &[u8]) {
        self.state.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Every byte sent so far.
    pub fn transmitted(&self) -> Vec<u8> {
        self.state.borrow().transmitted.clone()
    }

    /// Forget the transmit log.
    pub fn clear_transmitted(&self) {
        self.state.borrow_mut().transmitted.clear();
    }

    /// Number of read requests seen by any chip.
    pub fn read_requests(&self) -> usize {
        self.state.borrow().requests
    }

    /// Bytes still waiting in the receive buffer.
    pub fn unread(&self) -> usize {
        self.state.borrow().rx.len()
    }
}

impl LineState {
    fn process(&mut self) {
        loop {
            if self.pending.is_empty() {
                return;
            }
            if self.pending[0] & 0x0F != 0x05 {
                self.pending.remove(0);
                continue;
            }
            if self.pending.len() < 3 {
                return;
            }
            let is_write = self.pending[2] & 0x80 != 0;
            let len = if is_write { 8 } else { 4 };
            if self.pending.len() < len {
                return;
            }
            let datagram: Vec<u8> = self.pending.drain(..len).collect();
            if crc(&datagram[..len - 1]) != datagram[len - 1] {
                continue;
            }
            let node = datagram[1] as usize;
            let register = datagram[2] & 0x7F;
            let Some(chip) = self.chips.get_mut(node).and_then(Option::as_mut) else {
                continue;
            };

            if is_write {
                let value = u32::from_be_bytes([datagram[3], datagram[4], datagram[5], datagram[6]]);
                chip.write(register, value);
            } else {
                self.requests += 1;
                // write-only registers never answer
                if map::write_only_index(register).is_some() {
                    continue;
                }
                let value = chip.registers[register as usize];
                let mut reply = vec![0x05, 0xFF, register];
                reply.extend_from_slice(&value.to_be_bytes());
                let mut checksum = crc(&reply);
                if self.corrupt_replies > 0 {
                    self.corrupt_replies -= 1;
                    checksum ^= 0xFF;
                }
                reply.push(checksum);
                self.rx.extend(reply);
            }
        }
    }
}

impl embedded_io::ErrorType for FakeLine {
    type Error = Infallible;
}

impl embedded_io::Read for FakeLine {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        let n = buf.len().min(state.rx.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for FakeLine {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state.borrow().rx.is_empty())
    }
}

impl embedded_io::Write for FakeLine {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        state.transmitted.extend_from_slice(buf);
        state.rx.extend(buf.iter().copied());
        state.pending.extend_from_slice(buf);
        state.process();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
