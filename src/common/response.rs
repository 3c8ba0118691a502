// src/common/response.rs

//! Answer frame layout and field extraction.
//!
//! Every request is answered with one fixed-length frame. Layout (0-indexed):
//! byte 6 echoes the requested register type for configuration reads (must be
//! 2); bytes 7-8 hold the configuration value big-endian. For the combined
//! measurement read, bytes 6-7 are the raw temperature and bytes 8-9 the raw
//! humidity, both big-endian u16.

use core::fmt;

/// Number of bytes in every complete answer frame.
pub const MESSAGE_LENGTH: usize = 22;

/// Register-type echo expected at byte 6 of a configuration answer.
pub const CONFIGURATION_ECHO: u8 = 2;

/// Minimum frame length before the measurement fields at bytes 6-9 may be
/// indexed.
const MEASUREMENT_MIN_LENGTH: usize = 10;

/// Validation error for a frame that arrived in full but does not parse.
/// Does not cover transport failures or truncated frames; those surface as
/// [`LinkError::Io`](super::LinkError::Io) and
/// [`LinkError::Timeout`](super::LinkError::Timeout) respectively.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// Frame length differs from [`MESSAGE_LENGTH`].
    #[error("wrong frame length: expected {expected}, got {got}")]
    WrongLength { expected: usize, got: usize },

    /// Frame too short to carry the measurement fields.
    #[error("frame too short for measurement fields: need {minimum}, got {got}")]
    TooShort { minimum: usize, got: usize },

    /// Byte 6 did not echo the requested register type.
    #[error("register echo mismatch: expected {expected}, got {got}")]
    RegisterMismatch { expected: u8, got: u8 },
}

/// Raw 16-bit register values extracted from a measurement answer, prior to
/// physical-unit conversion.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawMeasurement {
    pub temperature: u16,
    pub humidity: u16,
}

impl fmt::Display for RawMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:#06x} h={:#06x}", self.temperature, self.humidity)
    }
}

/// Extracts the configuration register value from a complete answer frame.
///
/// The frame must be exactly [`MESSAGE_LENGTH`] bytes and byte 6 must echo
/// [`CONFIGURATION_ECHO`]; the value is big-endian at bytes 7-8.
pub fn parse_configuration(frame: &[u8]) -> Result<u16, FrameError> {
    if frame.len() != MESSAGE_LENGTH {
        return Err(FrameError::WrongLength {
            expected: MESSAGE_LENGTH,
            got: frame.len(),
        });
    }
    if frame[6] != CONFIGURATION_ECHO {
        return Err(FrameError::RegisterMismatch {
            expected: CONFIGURATION_ECHO,
            got: frame[6],
        });
    }
    Ok(u16::from_be_bytes([frame[7], frame[8]]))
}

/// Extracts the raw temperature and humidity registers from a measurement
/// answer. Guards the length before indexing bytes 6-9.
pub fn parse_measurements(frame: &[u8]) -> Result<RawMeasurement, FrameError> {
    if frame.len() < MEASUREMENT_MIN_LENGTH {
        return Err(FrameError::TooShort {
            minimum: MEASUREMENT_MIN_LENGTH,
            got: frame.len(),
        });
    }
    Ok(RawMeasurement {
        temperature: u16::from_be_bytes([frame[6], frame[7]]),
        humidity: u16::from_be_bytes([frame[8], frame[9]]),
    })
}
