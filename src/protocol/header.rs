//! MTP container header
//!
//! Every container starts with the same 12-byte header.

use super::{ContainerKind, Error, HEADER_SIZE, Result};

/// MTP container header (12 bytes)
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  Container Length (4, LE)                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       Kind (2, LE)            |         Code (2, LE)          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  Transaction ID (4, LE)                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `length` counts the header itself plus the parameters or payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    length: u32,
    kind: ContainerKind,
    code: u16,
    transaction_id: u32,
}

impl ContainerHeader {
    /// Create a new container header
    #[must_use]
    pub const fn new(length: u32, kind: ContainerKind, code: u16, transaction_id: u32) -> Self {
        Self {
            length,
            kind,
            code,
            transaction_id,
        }
    }

    /// Declared total length including the header
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Container kind
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Operation, response or event code
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Transaction id
    #[must_use]
    pub const fn transaction_id(&self) -> u32 {
        self.transaction_id
    }

    /// Convert to bytes (little-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        bytes[0..4].copy_from_slice(&self.length.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.kind.as_u16().to_le_bytes());
        bytes[6..8].copy_from_slice(&self.code.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.transaction_id.to_le_bytes());

        bytes
    }

    /// Parse from bytes (little-endian)
    ///
    /// Only the first 12 bytes are read. The declared length is not checked
    /// against the buffer; that is the reassembler's job.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(Error::BufferTooSmall {
                needed: HEADER_SIZE,
                got: bytes.len(),
            });
        };

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if (length as usize) < HEADER_SIZE {
            return Err(Error::InvalidLength { declared: length });
        }

        Ok(Self {
            length,
            kind: ContainerKind::from_u16(u16::from_le_bytes([header[4], header[5]])),
            code: u16::from_le_bytes([header[6], header[7]]),
            transaction_id: u32::from_le_bytes([header[8], header[9], header[10], header[11]]),
        })
    }

    /// Read only the declared length from the first four bytes of a frame
    #[must_use]
    pub fn peek_length(bytes: &[u8]) -> Option<u32> {
        let prefix = bytes.get(..4)?;
        Some(u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]))
    }
}
