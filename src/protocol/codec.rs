//! MTP container codec (encode/decode)

use bytes::Bytes;

use super::{
    Body, Container, ContainerHeader, ContainerKind, Error, HEADER_SIZE, PARAMETER_SIZE, Result,
};

/// Encode a parameter container
///
/// # Format
///
/// ```text
/// [HEADER (12 bytes)] [PARAM (4 bytes)] x 0..=5
/// ```
///
/// The length field is `12 + 4 * parameters.len()`.
pub fn encode_command(
    kind: ContainerKind,
    code: u16,
    transaction_id: u32,
    parameters: &[u32],
) -> Result<Vec<u8>> {
    Ok(Container::with_parameters(kind, code, transaction_id, parameters)?.encode())
}

/// Encode a data container
///
/// # Format
///
/// ```text
/// [HEADER (12 bytes)] [PAYLOAD (variable)]
/// ```
///
/// The length field is `12 + payload.len()`. Splitting the result into
/// transport-sized packets is left to the fragmenter.
pub fn encode_data(
    kind: ContainerKind,
    code: u16,
    transaction_id: u32,
    payload: &[u8],
) -> Result<Vec<u8>> {
    Ok(Container::with_payload(kind, code, transaction_id, Bytes::copy_from_slice(payload))?.encode())
}

/// Decode a container from a complete frame
///
/// Parameter containers read 32-bit words from offset 12 up to
/// `declared_len`, ignoring a trailing partial word. Payload containers take
/// everything from offset 12 to the end of `bytes`.
///
/// # Errors
///
/// Returns an error if:
/// - Buffer is shorter than the header
/// - Declared length is shorter than the header
pub fn decode(bytes: Bytes, declared_len: usize) -> Result<Container> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::BufferTooSmall {
            needed: HEADER_SIZE,
            got: bytes.len(),
        });
    }

    let header = ContainerHeader::from_bytes(&bytes)?;

    let body = if header.kind().has_parameters() {
        let end = declared_len.min(bytes.len());
        let params = bytes
            .get(HEADER_SIZE..end)
            .unwrap_or_default()
            .chunks_exact(PARAMETER_SIZE)
            .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
            .collect();
        Body::Parameters(params)
    } else {
        Body::Payload(bytes.slice(HEADER_SIZE..))
    };

    Ok(Container::from_parts(header, body))
}
