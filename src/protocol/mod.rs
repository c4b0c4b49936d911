//! MTP protocol core implementation
//!
//! This module provides the container wire format, codes, datasets and codec.

mod codec;
mod codes;
mod container;
mod dataset;
mod error;
pub mod fields;
mod header;
mod types;

pub use codec::{decode, encode_command, encode_data};
pub use codes::{ResponseCode, code_name, operation, property};
pub use container::{Body, Container};
pub use dataset::{
    AssociationType, DeviceInfo, ObjectFormat, ObjectInfo, OBJECT_INFO_FIXED_LEN, StorageInfo,
};
pub use error::{Error, ErrorCategory, Result};
pub use header::ContainerHeader;
pub use types::ContainerKind;

/// Container header size in bytes (length, kind, code, transaction id).
pub const HEADER_SIZE: usize = 12;

/// Maximum number of 32-bit parameters in a command or response container.
pub const MAX_PARAMETERS: usize = 5;

/// Width of one command/response parameter in bytes.
pub const PARAMETER_SIZE: usize = 4;
