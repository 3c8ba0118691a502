// src/common/transport.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// Point in time comparable and offsettable with `Duration`. Implemented by
/// `std::time::Instant` and by mock clocks in tests.
pub trait TransportInstant:
    Copy + Debug + PartialOrd + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> TransportInstant for T where
    T: Copy + Debug + PartialOrd + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

/// Abstraction for the serial-like byte channel the protocol runs over.
///
/// The protocol only ever polls for available bytes and reads one at a time;
/// a transport does not need any buffering beyond what the OS driver gives
/// it. `close` must be idempotent: closing an already-closed transport is a
/// no-op, never an error.
pub trait ByteTransport {
    /// Associated error type for transport failures.
    type Error: Debug;

    /// Opens the channel with the settings the transport was built with.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Closes the channel. Idempotent.
    fn close(&mut self);

    /// Whether the channel currently reports itself open.
    fn is_open(&self) -> bool;

    /// Writes the exact byte sequence.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Number of received bytes ready to read without blocking.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Reads one byte, blocking up to the transport's own read timeout.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Discards everything in the receive buffer.
    fn flush_input(&mut self) -> Result<(), Self::Error>;

    /// Discards everything still queued for transmission.
    fn flush_output(&mut self) -> Result<(), Self::Error>;
}

/// Time source paired with a [`ByteTransport`].
///
/// The fetch loop measures its wall-clock budget against this clock rather
/// than `std::time::Instant` directly so tests can drive virtual time.
pub trait TransportClock {
    type Instant: TransportInstant;

    /// Current instant on this clock.
    fn now(&self) -> Self::Instant;

    /// Sleeps (or advances virtual time by) at least `duration`.
    fn sleep(&mut self, duration: Duration);
}
