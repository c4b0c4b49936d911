//! MTP (Media Transfer Protocol) - client-side container protocol engine
//!
//! This library drives an MTP/PTP device over any bulk transport that can
//! `send` and `receive` packets. It covers the container wire format,
//! multi-packet reassembly and fragmentation, transaction bookkeeping, the
//! typed datasets (strings, dates, `StorageInfo`, `ObjectInfo`, `DeviceInfo`)
//! and the operation sequences used to browse, download and upload objects.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mtp::{MtpDevice, SessionConfig, Transport};
//!
//! fn browse<T: Transport>(transport: T) -> mtp::Result<()> {
//!     let mut device = MtpDevice::connect(transport, SessionConfig::default())?;
//!
//!     let storage_ids = device.get_storage_ids()?;
//!     let info = device.get_storage_info(storage_ids[0])?;
//!     println!("free: {} of {}", info.free_space_bytes, info.max_capacity);
//!
//!     for entry in device.list_folder(storage_ids[0], mtp::ROOT_HANDLE)? {
//!         println!("{:#010x} {}", entry.handle, entry.name);
//!     }
//!
//!     let closed = device.close();
//!     if let Some(err) = closed.error {
//!         eprintln!("close failed: {err}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Layers
//!
//! - [`protocol`] - container header, codec, datasets and response codes
//! - [`transport`] - the transport boundary and packet reassembly
//! - [`session`] - transaction manager and the operation layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;
pub mod session;
pub mod transport;

pub use protocol::{
    Container, ContainerKind, DeviceInfo, Error, ErrorCategory, HEADER_SIZE, ObjectInfo,
    ResponseCode, Result, StorageInfo,
};
pub use session::{Closed, FolderEntry, MtpDevice, ObjectInfoReceipt, SessionConfig, SessionState};
pub use transport::{Inbound, TransferStatus, Transport, TransportError};

/// Reserved handle meaning "all objects" or "storage root" in scoped queries.
pub const ROOT_HANDLE: u32 = 0xFFFF_FFFF;

/// Storage id selecting every storage on the device.
pub const ALL_STORAGES: u32 = 0xFFFF_FFFF;

/// Parent value meaning "no parent filter" in `GetObjectHandles`.
pub const NO_PARENT_FILTER: u32 = 0x0000_0000;
