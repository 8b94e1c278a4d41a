//! Datagram layout of the TMC2209 single-wire UART interface.
//!
//! ```text
//! write:        sync | node | reg|0x80 | d31..d24 | d23..d16 | d15..d8 | d7..d0 | crc
//! read request: sync | node | reg                                                  | crc
//! read reply:   sync | 0xFF | reg | d31..d24 | d23..d16 | d15..d8 | d7..d0         | crc
//! ```
//!
//! Data is big-endian. The CRC is CRC-8 (polynomial x^8 + x^2 + x + 1) fed
//! with the bits of each byte least significant bit first.

use crate::error::TransportError;

/// Sync nibble opening every datagram (reserved upper nibble is zero).
pub const SYNC: u8 = 0x05;
/// Address the chip uses in its replies.
pub const MASTER_ADDRESS: u8 = 0xFF;
/// Register address bit selecting a write access.
pub const WRITE_BIT: u8 = 0x80;

/// Length of a write datagram.
pub const WRITE_LEN: usize = 8;
/// Length of a read request.
pub const READ_REQUEST_LEN: usize = 4;
/// Length of a read reply.
pub const REPLY_LEN: usize = 8;

/// CRC-8 as defined by the TMC2209 datasheet.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut current = byte;
        for _ in 0..8 {
            crc = if ((crc >> 7) ^ (current & 0x01)) != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            };
            current >>= 1;
        }
    }
    crc
}

/// Build a write datagram for `register` on node `node`.
pub fn write_datagram(node: u8, register: u8, value: u32) -> [u8; WRITE_LEN] {
    let mut datagram = [0u8; WRITE_LEN];
    datagram[0] = SYNC;
    datagram[1] = node;
    datagram[2] = (register & 0x7F) | WRITE_BIT;
    datagram[3..7].copy_from_slice(&value.to_be_bytes());
    datagram[7] = crc8(&datagram[..7]);
    datagram
}

/// Build a read request for `register` on node `node`.
pub fn read_request(node: u8, register: u8) -> [u8; READ_REQUEST_LEN] {
    let mut datagram = [0u8; READ_REQUEST_LEN];
    datagram[0] = SYNC;
    datagram[1] = node;
    datagram[2] = register & 0x7F;
    datagram[3] = crc8(&datagram[..3]);
    datagram
}

/// Build the reply the chip sends for a read of `register`.
pub fn reply_datagram(register: u8, value: u32) -> [u8; REPLY_LEN] {
    let mut datagram = [0u8; REPLY_LEN];
    datagram[0] = SYNC;
    datagram[1] = MASTER_ADDRESS;
    datagram[2] = register & 0x7F;
    datagram[3..7].copy_from_slice(&value.to_be_bytes());
    datagram[7] = crc8(&datagram[..7]);
    datagram
}

/// Validate a read reply for `register` and extract its data word.
///
/// # Errors
///
/// `CrcMismatch` if the checksum fails (line noise). A reply with a valid
/// checksum but the wrong sync, address or register is a structural fault
/// and reported as such.
pub fn parse_reply(register: u8, reply: &[u8; REPLY_LEN]) -> Result<u32, TransportError> {
    let expected = crc8(&reply[..7]);
    if reply[7] != expected {
        return Err(TransportError::CrcMismatch {
            expected,
            received: reply[7],
        });
    }

    if reply[0] & 0x0F != SYNC {
        return Err(TransportError::InvalidSync(reply[0]));
    }

    if reply[1] != MASTER_ADDRESS {
        return Err(TransportError::UnexpectedAddress(reply[1]));
    }

    let received = reply[2] & 0x7F;
    if received != register & 0x7F {
        return Err(TransportError::UnexpectedRegister {
            expected: register & 0x7F,
            received,
        });
    }

    Ok(u32::from_be_bytes([reply[3], reply[4], reply[5], reply[6]]))
}
