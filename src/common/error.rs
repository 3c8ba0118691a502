// src/common/error.rs

use super::response::FrameError;

/// Error type for link operations, generic over the transport's error type.
///
/// Soft failures (`Timeout`, `Frame`) leave the connection usable and are
/// retryable by the caller; fatal failures (`Open`, `Io`) mean the transport
/// has been closed and [`connect`](crate::SensorLink::connect) must be called
/// again. Use [`LinkError::is_fatal`] to branch on the distinction.
#[derive(Debug, thiserror::Error)]
pub enum LinkError<E>
where
    E: core::fmt::Debug,
{
    /// The transport could not be opened.
    #[error("transport could not be opened: {0:?}")]
    Open(E),

    /// Write or read failed while the transport reported itself open. The
    /// transport has been closed and the link is Disconnected.
    #[error("transport I/O fault: {0:?}")]
    Io(E),

    /// No handshake attempt produced a valid configuration response; the
    /// transport has been closed.
    #[error("handshake failed after {attempts} attempt(s)")]
    Handshake { attempts: u32 },

    /// The answer did not reach its expected length within the fetch budget.
    /// Carries the number of bytes that did arrive.
    #[error("no complete answer within the fetch timeout ({received} byte(s) received)")]
    Timeout { received: usize },

    /// A complete frame arrived but failed validation.
    #[error("invalid response frame: {0}")]
    Frame(FrameError),

    /// Operation requires a connected link.
    #[error("link is not connected")]
    NotConnected,
}

impl<E: core::fmt::Debug> LinkError<E> {
    /// Whether this failure tore the connection down. Fatal errors require a
    /// fresh [`connect`](crate::SensorLink::connect); everything else leaves
    /// the link state untouched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LinkError::Open(_) | LinkError::Io(_))
    }
}
