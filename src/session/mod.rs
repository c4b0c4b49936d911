//! Session layer: transaction bookkeeping and device operations

mod device;
mod transaction;

pub use device::{Closed, FolderEntry, MtpDevice, ObjectInfoReceipt};
pub use transaction::TransactionManager;

use crate::protocol::ResponseCode;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    /// No session is open
    #[default]
    Closed,
    /// OpenSession succeeded
    Open,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Session id passed to OpenSession and CloseSession.
    pub session_id: u32,
    /// Maximum inbound packet size in bytes.
    pub max_packet_in: usize,
    /// Maximum outbound packet size in bytes.
    pub max_packet_out: usize,
    /// Response codes that abort a read while awaiting a data phase.
    pub fatal_response_codes: Vec<ResponseCode>,
    /// Follow packet-aligned outbound transfers with an empty packet.
    pub zero_length_terminator: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: 1,
            max_packet_in: 1024,
            max_packet_out: 1024,
            fatal_response_codes: vec![ResponseCode::InvalidParameter],
            zero_length_terminator: false,
        }
    }
}

impl SessionConfig {
    /// Use the given packet sizes
    #[must_use]
    pub fn with_packet_sizes(mut self, max_packet_in: usize, max_packet_out: usize) -> Self {
        self.max_packet_in = max_packet_in;
        self.max_packet_out = max_packet_out;
        self
    }

    /// Whether `code` aborts a data read
    #[must_use]
    pub fn is_fatal(&self, code: ResponseCode) -> bool {
        self.fatal_response_codes.contains(&code)
    }
}
