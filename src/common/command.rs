// src/common/command.rs

//! Request frames understood by the MSP bridge on the evaluation board.
//!
//! Both requests are fixed byte sequences reverse-engineered from the vendor
//! software; the trailing byte of each is part of the frame, not computed.

use core::fmt;

use super::response::MESSAGE_LENGTH;

/// Read the HDC1000 configuration register through the bridge.
const READ_CONFIGURATION: &[u8] = &[0x4C, 0x12, 0x01, 0x00, 0x03, 0x40, 0x02, 0x02, 0xD3];

/// Read temperature and humidity in one combined frame.
const READ_MEASUREMENTS: &[u8] = &[0x4C, 0x30, 0x01, 0x00, 0x01, 0x40, 0x0F];

/// A request the host can put on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// Configuration-register read, used as the connection handshake.
    ReadConfiguration,
    /// Combined temperature + humidity read.
    ReadMeasurements,
}

impl Command {
    /// The exact byte sequence to write for this request.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Command::ReadConfiguration => READ_CONFIGURATION,
            Command::ReadMeasurements => READ_MEASUREMENTS,
        }
    }

    /// Number of bytes the bridge answers with. Every known request is
    /// answered with the same fixed-length frame.
    pub fn response_length(self) -> usize {
        MESSAGE_LENGTH
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ReadConfiguration => write!(f, "read-configuration"),
            Command::ReadMeasurements => write!(f, "read-measurements"),
        }
    }
}
