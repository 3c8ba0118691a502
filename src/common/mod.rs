// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod config;
pub mod error;
pub mod response;
pub mod timing;
pub mod transport;
pub mod types;

// --- Re-export key types/traits for easier access ---

// From command.rs
pub use command::Command;

// From config.rs
pub use config::{LinkConfig, DEFAULT_DEVICE_PATH};

// From error.rs
pub use error::LinkError;

// From response.rs
pub use response::{FrameError, RawMeasurement, MESSAGE_LENGTH};

// From transport.rs
pub use transport::{ByteTransport, TransportClock, TransportInstant};

// From types.rs
pub use types::{humidity_from_raw, temperature_from_raw, Measurement};

// From timing.rs (constants - users access via common::timing::*)
