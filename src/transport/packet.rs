//! Packet-level reassembly and fragmentation
//!
//! Inbound containers may span many packets. The first four bytes of the
//! first non-empty packet declare the total length and packets are
//! accumulated until exactly that many bytes have arrived. Outbound buffers
//! are split into packets no larger than the negotiated size.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use super::{TransferStatus, Transport, TransportError};
use crate::protocol::{ContainerHeader, Error, HEADER_SIZE, Result};

/// Receive one packet, re-receiving once on babble
///
/// # Errors
///
/// Returns an error if the transport fails, the device is gone, the endpoint
/// stalls, or babble is reported twice in a row.
pub fn receive_packet<T: Transport + ?Sized>(
    transport: &mut T,
    max_len: usize,
) -> std::result::Result<Bytes, TransportError> {
    let mut inbound = transport.receive(max_len)?;
    if inbound.status == TransferStatus::Babble {
        debug!(max_len, "babble on receive, retrying once");
        inbound = transport.receive(max_len)?;
    }

    match TransportError::from_status(inbound.status) {
        None => Ok(inbound.data),
        Some(err) => Err(err),
    }
}

/// Receive a complete container frame
///
/// Returns the accumulated bytes and the declared length. Zero-length
/// packets before the first byte are skipped; later ones contribute nothing.
///
/// # Errors
///
/// Returns an error if:
/// - A packet receive fails
/// - The declared length is shorter than the header
/// - More bytes arrive than were declared
pub fn receive_frame<T: Transport + ?Sized>(
    transport: &mut T,
    max_len: usize,
) -> Result<(Bytes, usize)> {
    let mut frame = BytesMut::new();

    let declared = loop {
        let packet = receive_packet(transport, max_len)?;
        if packet.is_empty() && frame.is_empty() {
            trace!("skipping zero-length packet before frame");
            continue;
        }
        frame.extend_from_slice(&packet);
        if let Some(length) = ContainerHeader::peek_length(&frame) {
            break length;
        }
    };

    if (declared as usize) < HEADER_SIZE {
        return Err(Error::InvalidLength { declared });
    }
    let declared = declared as usize;

    while frame.len() < declared {
        let packet = receive_packet(transport, max_len)?;
        if packet.is_empty() {
            trace!(received = frame.len(), declared, "zero-length continuation packet");
        }
        frame.extend_from_slice(&packet);
    }

    if frame.len() > declared {
        return Err(Error::ContainerOverrun {
            declared,
            received: frame.len(),
        });
    }

    trace!(length = declared, "frame reassembled");
    Ok((frame.freeze(), declared))
}

/// Send a buffer as packets of at most `max_packet` bytes
///
/// Produces `ceil(len / max_packet)` sends and stops at the first packet
/// whose status is not OK. With `zero_length_terminator`, a trailing empty
/// packet follows a buffer that is an exact multiple of `max_packet`.
/// Returns the number of packets sent.
///
/// # Errors
///
/// Returns an error if a send fails or reports a non-OK status.
pub fn send_fragmented<T: Transport + ?Sized>(
    transport: &mut T,
    bytes: &[u8],
    max_packet: usize,
    zero_length_terminator: bool,
) -> std::result::Result<usize, TransportError> {
    let max_packet = max_packet.max(1);
    let mut sent = 0;

    for (index, chunk) in bytes.chunks(max_packet).enumerate() {
        let status = transport.send(chunk)?;
        check_sent(status, index * max_packet)?;
        sent += 1;
    }

    if zero_length_terminator && !bytes.is_empty() && bytes.len() % max_packet == 0 {
        let status = transport.send(&[])?;
        check_sent(status, bytes.len())?;
        sent += 1;
    }

    trace!(length = bytes.len(), packets = sent, "buffer sent");
    Ok(sent)
}

fn check_sent(status: TransferStatus, offset: usize) -> std::result::Result<(), TransportError> {
    match status {
        TransferStatus::Ok => Ok(()),
        TransferStatus::NoDevice => Err(TransportError::Disconnected),
        status => Err(TransportError::SendFailed { status, offset }),
    }
}
