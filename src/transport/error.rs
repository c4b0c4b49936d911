//! Transport-level error types covering disconnects and failed transfers.

use thiserror::Error;

use super::TransferStatus;

/// Unified error type for transport operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Device disconnected.
    #[error("device disconnected")]
    Disconnected,

    /// Endpoint stalled.
    #[error("endpoint stalled")]
    Stall,

    /// Babble was reported again on the single allowed re-receive.
    #[error("babble persisted after re-receive")]
    Babble,

    /// An outbound packet did not complete.
    #[error("send failed at byte {offset}: {status:?}")]
    SendFailed {
        /// Status reported for the failing packet.
        status: TransferStatus,
        /// Offset of the failing packet within the transfer.
        offset: usize,
    },

    /// Fewer bytes were written than requested.
    #[error("short write: wrote {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes accepted by the device.
        written: usize,
        /// Bytes handed to the transport.
        expected: usize,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// libusb failure.
    #[cfg(feature = "usb")]
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),
}

impl TransportError {
    /// Map a non-OK transfer status to its error
    #[must_use]
    pub const fn from_status(status: TransferStatus) -> Option<Self> {
        match status {
            TransferStatus::Ok => None,
            TransferStatus::Babble => Some(Self::Babble),
            TransferStatus::Stall => Some(Self::Stall),
            TransferStatus::NoDevice => Some(Self::Disconnected),
        }
    }
}
