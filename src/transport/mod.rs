//! Transport boundary and packet handling
//!
//! The engine talks to the device through [`Transport`], a bulk pipe that
//! moves at most one packet per call. [`packet`] turns those packets into
//! whole containers and back.

mod error;
pub mod packet;
#[cfg(feature = "usb")]
mod usb;

use bytes::Bytes;

pub use error::TransportError;
pub use packet::{receive_frame, receive_packet, send_fragmented};
#[cfg(feature = "usb")]
pub use usb::{UsbEndpoints, UsbTransport};

/// Completion status reported by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Transfer completed
    Ok,
    /// Over-length or short packet; one re-receive is allowed
    Babble,
    /// Endpoint halted
    Stall,
    /// Device is gone
    NoDevice,
}

/// One inbound packet and its transfer status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Received bytes (may be empty)
    pub data: Bytes,
    /// Transfer status
    pub status: TransferStatus,
}

impl Inbound {
    /// Successful packet
    #[must_use]
    pub fn ok(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            status: TransferStatus::Ok,
        }
    }

    /// Packet carrying only a status
    #[must_use]
    pub fn status(status: TransferStatus) -> Self {
        Self {
            data: Bytes::new(),
            status,
        }
    }
}

/// Bulk transport bounded by a maximum packet size.
///
/// Implementations are already opened and claimed; discovery and
/// configuration happen before the engine sees them. Both calls block until
/// the transfer completes, so any timeout belongs to the implementation.
pub trait Transport {
    /// Receive one packet of at most `max_len` bytes
    fn receive(&mut self, max_len: usize) -> Result<Inbound, TransportError>;

    /// Send one packet
    fn send(&mut self, bytes: &[u8]) -> Result<TransferStatus, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn receive(&mut self, max_len: usize) -> Result<Inbound, TransportError> {
        (**self).receive(max_len)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<TransferStatus, TransportError> {
        (**self).send(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn receive(&mut self, max_len: usize) -> Result<Inbound, TransportError> {
        (**self).receive(max_len)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<TransferStatus, TransportError> {
        (**self).send(bytes)
    }
}
