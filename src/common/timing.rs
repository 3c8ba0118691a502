// src/common/timing.rs

use core::time::Duration;

// Serial settings expected by the MSP bridge. The vendor software opens the
// port at 9600 baud; the bridge auto-detects and 115200 is known to work.
// 8 data bits, no parity, 1 stop bit, no flow control are fixed.

/// Default line speed for the USB-serial bridge.
pub const BAUD_RATE: u32 = 115_200;

// Two independent timeout domains exist and must stay distinguishable in
// diagnostics: the transport's own per-call read/write timeout, and the
// wall-clock budget for accumulating a whole response frame.

/// Per-call blocking read timeout applied to the transport itself.
pub const READ_TIMEOUT: Duration = Duration::from_secs(2);
/// Per-call blocking write timeout applied to the transport itself.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Wall-clock budget for collecting one complete answer frame, measured from
/// the start of the fetch, independent of the transport timeouts above.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(4);

/// Sleep between empty polls while waiting for answer bytes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handshake attempts during connect. The bridge consumes the first request
/// after open to adjust its baud rate and never answers it, so two attempts
/// are the minimum that can succeed.
pub const CONNECT_ATTEMPTS: u32 = 2;
