// src/common/types.rs

use std::time::SystemTime;

use super::response::RawMeasurement;

/// Temperature reported when no valid reading exists. Outside the device's
/// physical range (-40..125 degC), so real readings can never collide with
/// it.
pub const INVALID_TEMPERATURE_C: f64 = -273.0;

/// Humidity reported when no valid reading exists.
pub const INVALID_HUMIDITY_PCT: f64 = 0.0;

/// Converts a raw 16-bit temperature register to degrees Celsius.
///
/// The device maps its full 16-bit range linearly onto -40..125 degC; the
/// upper bound is exclusive, so raw 0xFFFF lands just below 125.
pub fn temperature_from_raw(raw: u16) -> f64 {
    f64::from(raw) / 65536.0 * 165.0 - 40.0
}

/// Converts a raw 16-bit humidity register to percent relative humidity.
pub fn humidity_from_raw(raw: u16) -> f64 {
    f64::from(raw) / 65536.0 * 100.0
}

/// One temperature/humidity reading.
///
/// A failed read yields the sentinel returned by [`Measurement::invalid`]:
/// no timestamp, [`INVALID_TEMPERATURE_C`] and [`INVALID_HUMIDITY_PCT`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Measurement {
    /// Wall-clock time the frame was decoded; `None` for the sentinel.
    pub timestamp: Option<SystemTime>,
    /// Temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity in percent.
    pub humidity_pct: f64,
}

impl Measurement {
    /// The "no valid reading" sentinel.
    pub fn invalid() -> Self {
        Measurement {
            timestamp: None,
            temperature_c: INVALID_TEMPERATURE_C,
            humidity_pct: INVALID_HUMIDITY_PCT,
        }
    }

    /// Whether this is a real reading rather than the sentinel.
    pub fn is_valid(&self) -> bool {
        self.timestamp.is_some()
    }

    pub(crate) fn from_raw(raw: RawMeasurement) -> Self {
        Measurement {
            timestamp: Some(SystemTime::now()),
            temperature_c: temperature_from_raw(raw.temperature),
            humidity_pct: humidity_from_raw(raw.humidity),
        }
    }
}
