// src/link/mod.rs

//! The protocol state machine: connect handshake, request framing, and
//! byte-at-a-time answer accumulation.

use core::time::Duration;

use arrayvec::ArrayVec;
use log::{debug, trace, warn};

use crate::common::{
    command::Command,
    config::LinkConfig,
    error::LinkError,
    response::{self, MESSAGE_LENGTH},
    transport::{ByteTransport, TransportClock},
    types::Measurement,
};

/// Connection state of a [`SensorLink`].
///
/// There is no error state: fatal transport faults fall back to
/// `Disconnected`, soft validation failures stay `Connected`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// Per-call fetch result: whatever arrived before completion or timeout,
/// tagged with its receipt instant. Partial buffers are kept for diagnostics
/// even when the fetch fails.
#[derive(Debug, Clone)]
pub(crate) struct Answer<I> {
    pub received_at: I,
    pub bytes: ArrayVec<u8, MESSAGE_LENGTH>,
    pub complete: bool,
}

/// Driver for one HDC1000EVM board reachable over a byte transport.
///
/// Owns the transport exclusively; all operations are blocking and must run
/// to completion before the next is issued. See the crate docs for the
/// connect-time baud-adjustment quirk.
#[derive(Debug)]
pub struct SensorLink<IF>
where
    IF: ByteTransport + TransportClock,
{
    transport: IF,
    config: LinkConfig,
    state: LinkState,
}

impl<IF> SensorLink<IF>
where
    IF: ByteTransport + TransportClock,
{
    pub fn new(transport: IF, config: LinkConfig) -> Self {
        SensorLink {
            transport,
            config,
            state: LinkState::Disconnected,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether the board answered the connect handshake.
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// The underlying transport, for post-mortem inspection.
    pub fn transport(&self) -> &IF {
        &self.transport
    }

    /// Opens the transport and performs the connect handshake.
    ///
    /// The bridge swallows the first request after open to adjust its baud
    /// rate, so the configuration register is requested up to
    /// `connect_attempts` times, flushing both buffers before each attempt.
    /// On failure the transport is left closed.
    pub fn connect(&mut self) -> Result<(), LinkError<IF::Error>> {
        self.transport.open().map_err(LinkError::Open)?;

        for attempt in 1..=self.config.connect_attempts {
            if let Err(e) = self
                .transport
                .flush_input()
                .and_then(|()| self.transport.flush_output())
            {
                self.transport.close();
                return Err(LinkError::Io(e));
            }

            match self.request_configuration() {
                Ok(configuration) => {
                    debug!(
                        "handshake attempt {attempt} succeeded, configuration {configuration:#06x}"
                    );
                    self.state = LinkState::Connected;
                    return Ok(());
                }
                Err(e) if e.is_fatal() => {
                    self.transport.close();
                    return Err(e);
                }
                Err(e) => debug!("handshake attempt {attempt} failed: {e}"),
            }
        }

        self.transport.close();
        Err(LinkError::Handshake {
            attempts: self.config.connect_attempts,
        })
    }

    /// Reads the configuration register through the bridge.
    ///
    /// Soft failures (timeout, length or register-echo mismatch) leave the
    /// connection state untouched and are retryable.
    pub fn request_configuration(&mut self) -> Result<u16, LinkError<IF::Error>> {
        self.send_request(Command::ReadConfiguration)?;
        let answer = self.fetch_answer(Command::ReadConfiguration.response_length())?;

        if !answer.complete {
            warn!(
                "length error: {} of {} byte(s) received",
                answer.bytes.len(),
                MESSAGE_LENGTH
            );
            return Err(LinkError::Timeout {
                received: answer.bytes.len(),
            });
        }

        response::parse_configuration(&answer.bytes).map_err(|e| {
            warn!("result register error: {e}; frame {:02X?}", &answer.bytes[..]);
            LinkError::Frame(e)
        })
    }

    /// Reads temperature and humidity in one combined request.
    ///
    /// Requires a prior successful [`connect`](Self::connect). A timeout or a
    /// frame too short to decode yields the [`Measurement::invalid`] sentinel
    /// and leaves the connection usable; a transport fault tears the link
    /// down and surfaces as [`LinkError::Io`].
    pub fn read_measurements(&mut self) -> Result<Measurement, LinkError<IF::Error>> {
        if self.state != LinkState::Connected {
            return Err(LinkError::NotConnected);
        }

        self.send_request(Command::ReadMeasurements)?;
        let answer = self.fetch_answer(Command::ReadMeasurements.response_length())?;

        if !answer.complete {
            warn!(
                "no answer: {} of {} byte(s) received",
                answer.bytes.len(),
                MESSAGE_LENGTH
            );
            return Ok(Measurement::invalid());
        }

        match response::parse_measurements(&answer.bytes) {
            Ok(raw) => {
                trace!("measurement frame decoded: {raw}");
                Ok(Measurement::from_raw(raw))
            }
            Err(e) => {
                warn!("measurement frame rejected: {e}");
                Ok(Measurement::invalid())
            }
        }
    }

    /// Flushes pending input and writes one request frame.
    ///
    /// A write attempted while the transport reports itself closed is
    /// dropped with a diagnostic; a write that fails while the transport
    /// appears open is fatal and tears the link down. The asymmetry is
    /// deliberate and matches the bridge's documented behavior.
    fn send_request(&mut self, command: Command) -> Result<(), LinkError<IF::Error>> {
        if !self.transport.is_open() {
            warn!("dropping {command} request: transport is closed");
            return Ok(());
        }

        trace!("sending {command}: {:02X?}", command.as_bytes());
        let written = self
            .transport
            .flush_input()
            .and_then(|()| self.transport.write_all(command.as_bytes()));

        if let Err(e) = written {
            self.transport.close();
            self.state = LinkState::Disconnected;
            return Err(LinkError::Io(e));
        }
        Ok(())
    }

    /// Accumulates up to `expected` answer bytes, one poll-and-read at a
    /// time, bounded by the wall-clock `fetch_timeout` measured from the
    /// call's start. The transport's own read timeout is a separate domain
    /// and does not shorten this budget.
    fn fetch_answer(&mut self, expected: usize) -> Result<Answer<IF::Instant>, LinkError<IF::Error>> {
        debug_assert!(expected <= MESSAGE_LENGTH);
        let mut bytes: ArrayVec<u8, MESSAGE_LENGTH> = ArrayVec::new();

        if !self.transport.is_open() {
            return Ok(Answer {
                received_at: self.transport.now(),
                bytes,
                complete: false,
            });
        }

        let started = self.transport.now();
        loop {
            if self.transport.now() - started >= self.config.fetch_timeout {
                let answer = Answer {
                    received_at: self.transport.now(),
                    bytes,
                    complete: false,
                };
                debug!(
                    "fetch timed out at {:?} with {} byte(s): {:02X?}",
                    answer.received_at,
                    answer.bytes.len(),
                    &answer.bytes[..]
                );
                return Ok(answer);
            }

            let available = match self.transport.bytes_available() {
                Ok(n) => n,
                Err(e) => return Err(self.fault(e, &bytes)),
            };
            if available == 0 {
                let interval = self.config.poll_interval.max(Duration::from_micros(100));
                self.transport.sleep(interval);
                continue;
            }

            match self.transport.read_byte() {
                Ok(byte) => {
                    bytes.push(byte);
                    if bytes.len() == expected {
                        return Ok(Answer {
                            received_at: self.transport.now(),
                            bytes,
                            complete: true,
                        });
                    }
                }
                Err(e) => return Err(self.fault(e, &bytes)),
            }
        }
    }

    /// Fatal-path teardown: closes the transport, drops to Disconnected, and
    /// logs whatever partial answer had accumulated.
    fn fault(&mut self, error: IF::Error, partial: &[u8]) -> LinkError<IF::Error> {
        self.transport.close();
        self.state = LinkState::Disconnected;
        warn!(
            "transport fault at {:?} with {} byte(s) accumulated: {:02X?}",
            self.transport.now(),
            partial.len(),
            partial
        );
        LinkError::Io(error)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::response::CONFIGURATION_ECHO;
    use crate::common::FrameError;
    use core::time::Duration;
    use std::collections::VecDeque;

    // --- Mock Instant ---
    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
    struct MockInstant(u64);
    impl core::ops::Add<Duration> for MockInstant {
        type Output = Self;
        fn add(self, rhs: Duration) -> Self {
            MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
        }
    }
    impl core::ops::Sub<MockInstant> for MockInstant {
        type Output = Duration;
        fn sub(self, rhs: MockInstant) -> Duration {
            Duration::from_micros(self.0.saturating_sub(rhs.0))
        }
    }

    // --- Mock Transport Error ---
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockError(&'static str);

    // --- Mock Transport ---
    // Scripted request/response: each write pops the next staged response
    // into the read queue; an empty staged response simulates the bridge
    // swallowing a request.
    struct MockTransport {
        open: bool,
        fail_open: bool,
        fail_writes: bool,
        fail_reads: bool,
        responses: VecDeque<Vec<u8>>,
        read_queue: VecDeque<u8>,
        writes: Vec<Vec<u8>>,
        input_flushes: u32,
        output_flushes: u32,
        now_us: u64,
    }

    impl MockTransport {
        fn new() -> Self {
            MockTransport {
                open: false,
                fail_open: false,
                fail_writes: false,
                fail_reads: false,
                responses: VecDeque::new(),
                read_queue: VecDeque::new(),
                writes: Vec::new(),
                input_flushes: 0,
                output_flushes: 0,
                now_us: 0,
            }
        }

        fn stage_response(&mut self, bytes: &[u8]) {
            self.responses.push_back(bytes.to_vec());
        }

        fn stage_no_response(&mut self) {
            self.responses.push_back(Vec::new());
        }
    }

    impl ByteTransport for MockTransport {
        type Error = MockError;

        fn open(&mut self) -> Result<(), MockError> {
            if self.fail_open {
                return Err(MockError("no such device"));
            }
            self.open = true;
            Ok(())
        }

        fn close(&mut self) {
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn write_all(&mut self, bytes: &[u8]) -> Result<(), MockError> {
            if self.fail_writes {
                return Err(MockError("write fault"));
            }
            self.writes.push(bytes.to_vec());
            if let Some(response) = self.responses.pop_front() {
                self.read_queue.extend(response);
            }
            Ok(())
        }

        fn bytes_available(&mut self) -> Result<usize, MockError> {
            Ok(self.read_queue.len())
        }

        fn read_byte(&mut self) -> Result<u8, MockError> {
            if self.fail_reads {
                return Err(MockError("read fault"));
            }
            self.read_queue.pop_front().ok_or(MockError("read on empty queue"))
        }

        fn flush_input(&mut self) -> Result<(), MockError> {
            self.input_flushes += 1;
            self.read_queue.clear();
            Ok(())
        }

        fn flush_output(&mut self) -> Result<(), MockError> {
            self.output_flushes += 1;
            Ok(())
        }
    }

    impl TransportClock for MockTransport {
        type Instant = MockInstant;

        fn now(&self) -> MockInstant {
            MockInstant(self.now_us)
        }

        fn sleep(&mut self, duration: Duration) {
            self.now_us = self.now_us.saturating_add(duration.as_micros() as u64);
        }
    }

    // --- Frame builders ---
    fn configuration_frame(value: u16) -> Vec<u8> {
        let mut frame = vec![0u8; MESSAGE_LENGTH];
        frame[6] = CONFIGURATION_ECHO;
        frame[7..9].copy_from_slice(&value.to_be_bytes());
        frame
    }

    fn measurement_frame(raw_temperature: u16, raw_humidity: u16) -> Vec<u8> {
        let mut frame = vec![0u8; MESSAGE_LENGTH];
        frame[6..8].copy_from_slice(&raw_temperature.to_be_bytes());
        frame[8..10].copy_from_slice(&raw_humidity.to_be_bytes());
        frame
    }

    /// A link whose mock bridge exhibits the baud-adjustment quirk: first
    /// request swallowed, second answered. `connect` is expected to succeed.
    fn connected_link(mut mock: MockTransport) -> SensorLink<MockTransport> {
        mock.stage_no_response();
        mock.stage_response(&configuration_frame(0x1000));
        let mut link = SensorLink::new(mock, LinkConfig::default());
        link.connect().expect("handshake should survive the quirk");
        link
    }

    #[test]
    fn connect_retries_past_the_unanswered_first_request() {
        let link = connected_link(MockTransport::new());
        assert!(link.is_connected());
        assert_eq!(link.state(), LinkState::Connected);

        // Both attempts put the same configuration request on the wire.
        let writes = &link.transport().writes;
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], Command::ReadConfiguration.as_bytes());
        assert_eq!(writes[1], Command::ReadConfiguration.as_bytes());
    }

    #[test]
    fn connect_fails_and_closes_when_never_answered() {
        let mock = MockTransport::new();
        let mut link = SensorLink::new(mock, LinkConfig::default());

        match link.connect() {
            Err(LinkError::Handshake { attempts: 2 }) => {}
            other => panic!("expected handshake failure, got {other:?}"),
        }
        assert!(!link.is_connected());
        assert!(!link.transport().is_open());
    }

    #[test]
    fn connect_surfaces_open_failure() {
        let mut mock = MockTransport::new();
        mock.fail_open = true;
        let mut link = SensorLink::new(mock, LinkConfig::default());

        match link.connect() {
            Err(LinkError::Open(MockError("no such device"))) => {}
            other => panic!("expected open failure, got {other:?}"),
        }
        assert!(!link.is_connected());
    }

    #[test]
    fn configuration_round_trip() {
        let mut link = connected_link(MockTransport::new());
        let mut frame = configuration_frame(0);
        frame[7] = 0x12;
        frame[8] = 0x34;
        link.transport.stage_response(&frame);

        assert_eq!(link.request_configuration().unwrap(), 0x1234);
        assert!(link.is_connected());
    }

    #[test]
    fn register_echo_mismatch_is_soft() {
        let mut link = connected_link(MockTransport::new());
        let mut frame = configuration_frame(0x1000);
        frame[6] = 3;
        link.transport.stage_response(&frame);

        match link.request_configuration() {
            Err(LinkError::Frame(FrameError::RegisterMismatch { expected: 2, got: 3 })) => {}
            other => panic!("expected register mismatch, got {other:?}"),
        }
        // Soft failure: still connected, port still open.
        assert!(link.is_connected());
        assert!(link.transport().is_open());
    }

    #[test]
    fn short_answer_times_out_with_partial_count() {
        let mut link = connected_link(MockTransport::new());
        link.transport.stage_response(&[0xAA; 5]);

        match link.request_configuration() {
            Err(LinkError::Timeout { received: 5 }) => {}
            other => panic!("expected timeout with 5 bytes, got {other:?}"),
        }
        assert!(link.is_connected());
        assert!(link.transport().is_open());
    }

    #[test]
    fn measurement_decodes_raw_registers() {
        let mut link = connected_link(MockTransport::new());
        link.transport.stage_response(&measurement_frame(0x8000, 0x8000));

        let reading = link.read_measurements().unwrap();
        assert!(reading.is_valid());
        assert_eq!(reading.temperature_c, 42.5);
        assert_eq!(reading.humidity_pct, 50.0);
        assert_eq!(
            link.transport().writes.last().unwrap(),
            Command::ReadMeasurements.as_bytes()
        );
    }

    #[test]
    fn measurement_timeout_returns_sentinel_and_stays_connected() {
        let mut link = connected_link(MockTransport::new());
        // No response staged: the fetch runs out its virtual 4 s budget.

        let reading = link.read_measurements().unwrap();
        assert!(!reading.is_valid());
        assert_eq!(reading.temperature_c, -273.0);
        assert_eq!(reading.humidity_pct, 0.0);
        assert!(link.is_connected());
        assert!(link.transport().is_open());
    }

    #[test]
    fn write_fault_is_fatal_and_disconnects() {
        let mut link = connected_link(MockTransport::new());
        link.transport.fail_writes = true;

        match link.read_measurements() {
            Err(LinkError::Io(MockError("write fault"))) => {}
            other => panic!("expected fatal I/O error, got {other:?}"),
        }
        assert!(!link.is_connected());
        assert!(!link.transport().is_open());
    }

    #[test]
    fn read_fault_mid_fetch_is_fatal_and_disconnects() {
        let mut link = connected_link(MockTransport::new());
        link.transport.stage_response(&measurement_frame(0, 0));
        link.transport.fail_reads = true;

        match link.read_measurements() {
            Err(LinkError::Io(MockError("read fault"))) => {}
            other => panic!("expected fatal I/O error, got {other:?}"),
        }
        assert!(!link.is_connected());
        assert!(!link.transport().is_open());
    }

    #[test]
    fn read_without_connect_is_rejected() {
        let mut link = SensorLink::new(MockTransport::new(), LinkConfig::default());
        match link.read_measurements() {
            Err(LinkError::NotConnected) => {}
            other => panic!("expected NotConnected, got {other:?}"),
        }
    }

    #[test]
    fn fetch_stops_exactly_at_expected_length() {
        let mut link = connected_link(MockTransport::new());
        // 22-byte frame followed by 8 surplus bytes in one burst.
        let mut burst = configuration_frame(0xBEEF);
        burst.extend_from_slice(&[0x55; 8]);
        link.transport.stage_response(&burst);

        assert_eq!(link.request_configuration().unwrap(), 0xBEEF);
        // The surplus must be left unread.
        assert_eq!(link.transport().read_queue.len(), 8);
    }

    #[test]
    fn send_while_closed_is_dropped_not_fatal() {
        let mut link = SensorLink::new(MockTransport::new(), LinkConfig::default());
        // Transport never opened: the write is logged and dropped.
        assert!(link.send_request(Command::ReadMeasurements).is_ok());
        assert!(link.transport().writes.is_empty());
        assert_eq!(link.state(), LinkState::Disconnected);
    }

    #[test]
    fn each_request_flushes_stale_input_first() {
        let link = connected_link(MockTransport::new());
        // Two handshake attempts: each flushes input+output once up front and
        // input again inside send_request.
        assert_eq!(link.transport().output_flushes, 2);
        assert_eq!(link.transport().input_flushes, 4);
    }
}
