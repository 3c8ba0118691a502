// src/lib.rs

//! Host-side driver for the TI HDC1000EVM evaluation board.
//!
//! On the evaluation board the HDC1000 humidity/temperature sensor hangs off
//! an MSP processor that bridges its I2C bus to USB. The host sees a plain
//! serial interface; registers are read by sending a fixed-length binary
//! request and collecting a fixed-length (22 byte) response. One combined
//! request returns temperature and humidity in a single frame.
//!
//! The bridge never answers the first request after the port is opened — it
//! uses that frame to auto-detect the baud rate. [`SensorLink::connect`]
//! therefore retries the configuration-register handshake; the first attempt
//! establishes timing and the second normally succeeds. The vendor software
//! runs the link at 9600 baud, but 115200 works and is the default here.
//!
//! The protocol core is generic over a [`ByteTransport`] + [`TransportClock`]
//! interface; the `serial` feature (on by default) provides
//! [`serial::SerialTransport`] backed by the `serialport` crate.
//!
//! ```no_run
//! use hdc1000evm::{LinkConfig, SensorLink, serial::SerialTransport};
//!
//! let config = LinkConfig::with_device_path("/dev/ttyACM0");
//! let transport = SerialTransport::new(&config);
//! let mut link = SensorLink::new(transport, config);
//!
//! link.connect()?;
//! let reading = link.read_measurements()?;
//! if reading.is_valid() {
//!     println!("{:.2} degC, {:.2} %RH", reading.temperature_c, reading.humidity_pct);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod common;
pub mod link;

#[cfg(feature = "serial")]
pub mod serial;

// Re-export key types for convenience
pub use common::{
    ByteTransport, Command, FrameError, LinkConfig, LinkError, Measurement, TransportClock,
};
pub use link::{LinkState, SensorLink};
