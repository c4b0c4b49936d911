//! MTP error types

use thiserror::Error;

use super::{ContainerKind, ResponseCode, code_name};
use crate::transport::TransportError;

/// MTP engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failed or the device disconnected
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Buffer too small to hold the field being decoded
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Header declares a length shorter than the header itself
    #[error("invalid container length: {declared} bytes")]
    InvalidLength {
        /// Declared length
        declared: u32,
    },

    /// More bytes arrived than the header declared
    #[error("container overrun: declared {declared} bytes, received {received}")]
    ContainerOverrun {
        /// Declared length
        declared: usize,
        /// Bytes accumulated so far
        received: usize,
    },

    /// Frame belongs to a different transaction
    #[error("transaction id mismatch: expected {expected}, got {found}")]
    TransactionMismatch {
        /// Transaction id of the outstanding command
        expected: u32,
        /// Transaction id found in the frame
        found: u32,
    },

    /// Frame kind does not fit the current phase
    #[error("unexpected {found} while waiting for {expected}")]
    UnexpectedContainer {
        /// Kind the phase expects
        expected: ContainerKind,
        /// Kind that arrived
        found: ContainerKind,
    },

    /// String field is not valid UTF-16
    #[error("invalid UTF-16 in string field")]
    InvalidUtf16,

    /// Device answered with a non-OK response code
    #[error("{} rejected by device: {code}", operation_name(.operation))]
    DeviceRejected {
        /// Operation that was rejected
        operation: u16,
        /// Response code
        code: ResponseCode,
    },

    /// String exceeds the 254 code unit limit of a dataset string
    #[error("string too long: {len} UTF-16 units (max 254)")]
    StringTooLong {
        /// Length in UTF-16 code units
        len: usize,
    },

    /// Command carries more parameters than a container allows
    #[error("too many parameters: {count} (max {max})")]
    TooManyParameters {
        /// Parameter count
        count: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Encoded dataset length differs from its computed length
    #[error("dataset length mismatch: expected {expected} bytes, wrote {written}")]
    DatasetLengthMismatch {
        /// Statically computed length
        expected: usize,
        /// Bytes actually written
        written: usize,
    },

    /// Payload does not fit a 32-bit size field
    #[error("object too large: {size} bytes (max {max})")]
    ObjectTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },
}

/// Closed error taxonomy used to decide how a caller should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Disconnect or low-level I/O error
    Transport,
    /// Malformed or out-of-sequence frame
    Protocol,
    /// Well-formed response carrying a non-OK code
    Device,
    /// Local contract violation detected before anything was sent
    Encoding,
}

impl Error {
    /// Classify the error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) => ErrorCategory::Transport,
            Self::BufferTooSmall { .. }
            | Self::InvalidLength { .. }
            | Self::ContainerOverrun { .. }
            | Self::TransactionMismatch { .. }
            | Self::UnexpectedContainer { .. }
            | Self::InvalidUtf16 => ErrorCategory::Protocol,
            Self::DeviceRejected { .. } => ErrorCategory::Device,
            Self::StringTooLong { .. }
            | Self::TooManyParameters { .. }
            | Self::DatasetLengthMismatch { .. }
            | Self::ObjectTooLarge { .. } => ErrorCategory::Encoding,
        }
    }

    /// True when the session is desynchronized and must be closed and reopened
    #[must_use]
    pub const fn is_session_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transport | ErrorCategory::Protocol
        )
    }

    /// Response code for device rejections
    #[must_use]
    pub const fn response_code(&self) -> Option<ResponseCode> {
        match self {
            Self::DeviceRejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn operation_name(operation: &u16) -> &'static str {
    code_name(*operation)
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
