// src/common/config.rs

use core::time::Duration;

use super::timing;

/// Device path used when none is given. Matches the USB symlink the board
/// shows up under on the reference host; override it via [`LinkConfig`].
pub const DEFAULT_DEVICE_PATH: &str =
    "/dev/serial/by-path/platform-3f980000.usb-usb-0:1.4:1.0";

/// Explicit per-link configuration. Passed to both the transport and the
/// [`SensorLink`](crate::SensorLink) at construction; there is no global
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Path of the serial device the board is reachable under.
    pub device_path: String,
    /// Line speed for the bridge.
    pub baud_rate: u32,
    /// Blocking read timeout applied to the transport.
    pub read_timeout: Duration,
    /// Blocking write timeout applied to the transport. Transports that only
    /// support a single timeout may fold this into the read timeout.
    pub write_timeout: Duration,
    /// Wall-clock budget for accumulating one complete answer frame.
    pub fetch_timeout: Duration,
    /// Sleep between empty polls while fetching.
    pub poll_interval: Duration,
    /// Handshake attempts during connect; must be at least 2 to survive the
    /// bridge's baud-adjustment quirk.
    pub connect_attempts: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            device_path: DEFAULT_DEVICE_PATH.into(),
            baud_rate: timing::BAUD_RATE,
            read_timeout: timing::READ_TIMEOUT,
            write_timeout: timing::WRITE_TIMEOUT,
            fetch_timeout: timing::FETCH_TIMEOUT,
            poll_interval: timing::POLL_INTERVAL,
            connect_attempts: timing::CONNECT_ATTEMPTS,
        }
    }
}

impl LinkConfig {
    /// Default configuration pointed at a specific device path.
    pub fn with_device_path(path: impl Into<String>) -> Self {
        LinkConfig {
            device_path: path.into(),
            ..LinkConfig::default()
        }
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_timing_constants() {
        let config = LinkConfig::default();
        assert_eq!(config.device_path, DEFAULT_DEVICE_PATH);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.read_timeout, Duration::from_secs(2));
        assert_eq!(config.fetch_timeout, Duration::from_secs(4));
        assert_eq!(config.connect_attempts, 2);
    }

    #[test]
    fn with_device_path_overrides_only_the_path() {
        let config = LinkConfig::with_device_path("/dev/ttyUSB3");
        assert_eq!(config.device_path, "/dev/ttyUSB3");
        assert_eq!(config.baud_rate, LinkConfig::default().baud_rate);
    }
}
