// src/serial.rs

//! `serialport`-backed [`ByteTransport`] implementation.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::common::config::LinkConfig;
use crate::common::transport::{ByteTransport, TransportClock};

// Line settings the MSP bridge expects; only path and baud rate are
// configurable.
const DATA_BITS: DataBits = DataBits::Eight;
const PARITY: Parity = Parity::None;
const STOP_BITS: StopBits = StopBits::One;
const FLOW_CONTROL: FlowControl = FlowControl::None;

/// Serial port transport for a real evaluation board.
///
/// Construction only records the settings; the port is opened by
/// [`SensorLink::connect`](crate::SensorLink::connect) through
/// [`ByteTransport::open`]. `serialport` exposes a single timeout covering
/// reads and writes, so the configured read timeout is applied to both.
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn new(config: &LinkConfig) -> Self {
        SerialTransport {
            path: config.device_path.clone(),
            baud_rate: config.baud_rate,
            timeout: config.read_timeout,
            port: None,
        }
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, serialport::Error> {
        self.port.as_mut().ok_or_else(|| {
            serialport::Error::new(serialport::ErrorKind::NoDevice, "port is not open")
        })
    }
}

fn io_error(e: std::io::Error) -> serialport::Error {
    serialport::Error::new(serialport::ErrorKind::Io(e.kind()), e.to_string())
}

impl ByteTransport for SerialTransport {
    type Error = serialport::Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        let port = serialport::new(self.path.as_str(), self.baud_rate)
            .data_bits(DATA_BITS)
            .parity(PARITY)
            .stop_bits(STOP_BITS)
            .flow_control(FLOW_CONTROL)
            .timeout(self.timeout)
            .open()?;
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the handle closes the descriptor; safe to repeat.
        self.port = None;
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.port()?.write_all(bytes).map_err(io_error)
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(self.port()?.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = [0u8; 1];
        self.port()?.read_exact(&mut byte).map_err(io_error)?;
        Ok(byte[0])
    }

    fn flush_input(&mut self) -> Result<(), Self::Error> {
        self.port()?.clear(ClearBuffer::Input)
    }

    fn flush_output(&mut self) -> Result<(), Self::Error> {
        self.port()?.clear(ClearBuffer::Output)
    }
}

impl TransportClock for SerialTransport {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
