//! libusb-backed transport
//!
//! Wraps a device handle that the caller has already opened and whose
//! interface is already claimed. Discovery stays outside the engine;
//! [`UsbEndpoints`] only reads the bulk pipe addresses and packet sizes from
//! the active configuration.

use std::time::Duration;

use bytes::Bytes;
use rusb::{Device, DeviceHandle, Direction, TransferType, UsbContext};
use tracing::debug;

use super::{Inbound, TransferStatus, Transport, TransportError};
use crate::session::SessionConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bulk endpoints of an MTP interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbEndpoints {
    /// Interface carrying the endpoints
    pub interface: u8,
    /// Bulk IN address
    pub bulk_in: u8,
    /// Bulk OUT address
    pub bulk_out: u8,
    /// Max packet size of the IN endpoint
    pub max_packet_in: usize,
    /// Max packet size of the OUT endpoint
    pub max_packet_out: usize,
}

impl UsbEndpoints {
    /// Find the first interface exposing a bulk IN/OUT pair
    ///
    /// Returns `Ok(None)` if the active configuration has no such interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration descriptor cannot be read.
    pub fn from_active_config<C: UsbContext>(
        device: &Device<C>,
    ) -> Result<Option<Self>, TransportError> {
        let config = device.active_config_descriptor()?;

        for interface in config.interfaces() {
            for descriptor in interface.descriptors() {
                let mut bulk_in = None;
                let mut bulk_out = None;

                for endpoint in descriptor.endpoint_descriptors() {
                    if endpoint.transfer_type() != TransferType::Bulk {
                        continue;
                    }
                    let pipe = (endpoint.address(), endpoint.max_packet_size() as usize);
                    match endpoint.direction() {
                        Direction::In => bulk_in = bulk_in.or(Some(pipe)),
                        Direction::Out => bulk_out = bulk_out.or(Some(pipe)),
                    }
                }

                if let (Some((in_addr, in_size)), Some((out_addr, out_size))) = (bulk_in, bulk_out) {
                    return Ok(Some(Self {
                        interface: descriptor.interface_number(),
                        bulk_in: in_addr,
                        bulk_out: out_addr,
                        max_packet_in: in_size,
                        max_packet_out: out_size,
                    }));
                }
            }
        }

        Ok(None)
    }
}

/// Transport over a claimed libusb device handle
pub struct UsbTransport<C: UsbContext> {
    handle: DeviceHandle<C>,
    endpoints: UsbEndpoints,
    timeout: Duration,
}

impl<C: UsbContext> UsbTransport<C> {
    /// Wrap a claimed handle
    #[must_use]
    pub fn new(handle: DeviceHandle<C>, endpoints: UsbEndpoints) -> Self {
        Self {
            handle,
            endpoints,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-transfer timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoints in use
    #[must_use]
    pub const fn endpoints(&self) -> &UsbEndpoints {
        &self.endpoints
    }

    /// Session configuration sized to these endpoints
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_packet_in: self.endpoints.max_packet_in,
            max_packet_out: self.endpoints.max_packet_out,
            ..SessionConfig::default()
        }
    }

    /// Release the handle
    #[must_use]
    pub fn into_handle(self) -> DeviceHandle<C> {
        self.handle
    }
}

impl<C: UsbContext> Transport for UsbTransport<C> {
    fn receive(&mut self, max_len: usize) -> Result<Inbound, TransportError> {
        let mut buf = vec![0u8; max_len];
        match self
            .handle
            .read_bulk(self.endpoints.bulk_in, &mut buf, self.timeout)
        {
            Ok(n) => {
                buf.truncate(n);
                Ok(Inbound::ok(Bytes::from(buf)))
            }
            Err(rusb::Error::Overflow) => Ok(Inbound::status(TransferStatus::Babble)),
            Err(rusb::Error::Pipe) => Ok(Inbound::status(TransferStatus::Stall)),
            Err(rusb::Error::NoDevice) => Ok(Inbound::status(TransferStatus::NoDevice)),
            Err(err) => Err(err.into()),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<TransferStatus, TransportError> {
        match self
            .handle
            .write_bulk(self.endpoints.bulk_out, bytes, self.timeout)
        {
            Ok(written) if written == bytes.len() => Ok(TransferStatus::Ok),
            Ok(written) => Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            }),
            Err(rusb::Error::Pipe) => {
                debug!(endpoint = self.endpoints.bulk_out, "bulk OUT stalled");
                Ok(TransferStatus::Stall)
            }
            Err(rusb::Error::NoDevice) => Ok(TransferStatus::NoDevice),
            Err(err) => Err(err.into()),
        }
    }
}
