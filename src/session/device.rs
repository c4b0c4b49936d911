//! Operation layer over a single device session
//!
//! Every operation follows the same sequence: send the command, send the
//! data container if the operation has an outbound phase, then receive.
//! Inbound data phases skip unrelated frames until the Data container of the
//! current transaction arrives, and every operation ends by consuming its own
//! Response.

use bytes::Bytes;
use tracing::{debug, instrument, trace, warn};

use super::{SessionConfig, SessionState, TransactionManager};
use crate::protocol::{
    Container, ContainerKind, DeviceInfo, Error, ObjectInfo, ResponseCode, Result, StorageInfo,
    decode, fields, operation, property,
};
use crate::transport::{Transport, receive_frame, send_fragmented};

/// Handles returned by a successful `SendObjectInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectInfoReceipt {
    /// Transaction id of the `SendObjectInfo` command
    pub transaction_id: u32,
    /// Storage the object was placed in
    pub storage_id: u32,
    /// Parent folder of the object
    pub parent_handle: u32,
    /// Handle reserved for the new object, if the device reported one
    pub object_handle: Option<u32>,
}

/// One child of a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FolderEntry {
    /// Object handle
    pub handle: u32,
    /// File name, empty if the device reported none
    pub name: String,
}

/// Result of [`MtpDevice::close`].
#[derive(Debug)]
pub struct Closed<T> {
    /// The released transport
    pub transport: T,
    /// Error raised while closing the session, if any
    pub error: Option<Error>,
}

/// Client side of one MTP session over a bulk transport.
///
/// The session is not reentrant; every operation takes `&mut self` and runs
/// to completion before the next can start.
pub struct MtpDevice<T: Transport> {
    transport: T,
    config: SessionConfig,
    transactions: TransactionManager,
}

impl<T: Transport> MtpDevice<T> {
    /// Wrap a transport without opening a session
    #[must_use]
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            transactions: TransactionManager::new(),
        }
    }

    /// Wrap a transport and open the session
    ///
    /// On failure the transport is dropped.
    pub fn connect(transport: T, config: SessionConfig) -> Result<Self> {
        let mut device = Self::new(transport, config);
        device.open_session()?;
        Ok(device)
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Session state
    #[must_use]
    pub const fn session_state(&self) -> SessionState {
        self.transactions.state()
    }

    /// Id the next command will carry
    #[must_use]
    pub const fn next_transaction_id(&self) -> u32 {
        self.transactions.next_id()
    }

    /// Borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport without closing the session
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Open the session
    ///
    /// A device that reports the session as already open is treated as open.
    #[instrument(level = "debug", skip(self), fields(session_id = self.config.session_id))]
    pub fn open_session(&mut self) -> Result<()> {
        let transaction_id = self.send_command(operation::OPEN_SESSION, &[self.config.session_id])?;

        match self.read_response(operation::OPEN_SESSION, transaction_id) {
            Ok(_) => {}
            Err(Error::DeviceRejected {
                code: ResponseCode::SessionAlreadyOpen,
                ..
            }) => debug!("device reports session already open"),
            Err(err) => return Err(err),
        }

        self.transactions.mark_open();
        debug!("session open");
        Ok(())
    }

    /// Close the session
    ///
    /// The session is marked closed whether or not the exchange succeeds.
    #[instrument(level = "debug", skip(self), fields(session_id = self.config.session_id))]
    pub fn close_session(&mut self) -> Result<()> {
        let result = self
            .send_command(operation::CLOSE_SESSION, &[self.config.session_id])
            .and_then(|transaction_id| self.read_response(operation::CLOSE_SESSION, transaction_id));
        self.transactions.mark_closed();

        match result {
            Ok(_) => {
                debug!("session closed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "close session failed");
                Err(err)
            }
        }
    }

    /// Close the session if open and release the transport
    ///
    /// Never blocks the release on a failed close; the failure is returned
    /// alongside the transport.
    pub fn close(mut self) -> Closed<T> {
        let error = if self.transactions.is_open() {
            self.close_session().err()
        } else {
            None
        };

        Closed {
            transport: self.transport,
            error,
        }
    }

    /// Read the `DeviceInfo` dataset; works without a session
    #[instrument(level = "debug", skip(self))]
    pub fn get_device_info(&mut self) -> Result<DeviceInfo> {
        let payload = self.transact_in(operation::GET_DEVICE_INFO, &[])?;
        DeviceInfo::decode(&payload)
    }

    /// List storage ids
    #[instrument(level = "debug", skip(self))]
    pub fn get_storage_ids(&mut self) -> Result<Vec<u32>> {
        let payload = self.transact_in(operation::GET_STORAGE_IDS, &[])?;
        fields::DatasetReader::new(&payload).read_u32_array()
    }

    /// Read the `StorageInfo` dataset of one storage
    #[instrument(level = "debug", skip(self))]
    pub fn get_storage_info(&mut self, storage_id: u32) -> Result<StorageInfo> {
        let payload = self.transact_in(operation::GET_STORAGE_INFO, &[storage_id])?;
        StorageInfo::decode(&payload)
    }

    /// List object handles
    ///
    /// `format` 0 matches every format; `parent` `0xFFFF_FFFF` selects the
    /// storage root and 0 disables parent filtering.
    #[instrument(level = "debug", skip(self))]
    pub fn get_object_handles(&mut self, storage_id: u32, format: u32, parent: u32) -> Result<Vec<u32>> {
        let payload =
            self.transact_in(operation::GET_OBJECT_HANDLES, &[storage_id, format, parent])?;
        fields::DatasetReader::new(&payload).read_u32_array()
    }

    /// Read the file name property of an object
    #[instrument(level = "debug", skip(self))]
    pub fn get_file_name(&mut self, handle: u32) -> Result<String> {
        let payload = self.transact_in(
            operation::GET_OBJECT_PROP_VALUE,
            &[handle, u32::from(property::OBJECT_FILE_NAME)],
        )?;
        let (name, _) = fields::decode_string(&payload, 0)?;
        Ok(name.unwrap_or_default())
    }

    /// Download an object
    #[instrument(level = "debug", skip(self))]
    pub fn get_object(&mut self, handle: u32) -> Result<Bytes> {
        let payload = self.transact_in(operation::GET_OBJECT, &[handle])?;
        debug!(size = payload.len(), "object received");
        Ok(payload)
    }

    /// Delete an object and return the device's response
    #[instrument(level = "debug", skip(self))]
    pub fn delete_object(&mut self, handle: u32) -> Result<Container> {
        let transaction_id = self.send_command(operation::DELETE_OBJECT, &[handle])?;
        self.read_response(operation::DELETE_OBJECT, transaction_id)
    }

    /// Announce an object to be created
    ///
    /// The dataset is encoded before anything is sent, so an oversized name
    /// fails without touching the device.
    #[instrument(level = "debug", skip(self, info), fields(filename = %info.filename))]
    pub fn send_object_info(&mut self, info: &ObjectInfo) -> Result<ObjectInfoReceipt> {
        let dataset = info.encode()?;
        let transaction_id = self.send_with_data(
            operation::SEND_OBJECT_INFO,
            &[info.storage_id, info.parent_handle],
            dataset,
        )?;
        let response = self.read_response(operation::SEND_OBJECT_INFO, transaction_id)?;

        let params = response.parameters();
        let receipt = ObjectInfoReceipt {
            transaction_id,
            storage_id: params.first().copied().unwrap_or(info.storage_id),
            parent_handle: params.get(1).copied().unwrap_or(info.parent_handle),
            object_handle: params.get(2).copied(),
        };
        debug!(object_handle = ?receipt.object_handle, "object info accepted");
        Ok(receipt)
    }

    /// Send the content of the object announced by the last `SendObjectInfo`
    #[instrument(level = "debug", skip(self, data), fields(size = data.len()))]
    pub fn send_object(&mut self, data: &[u8]) -> Result<Container> {
        let transaction_id =
            self.send_with_data(operation::SEND_OBJECT, &[], Bytes::copy_from_slice(data))?;
        self.read_response(operation::SEND_OBJECT, transaction_id)
    }

    /// Create a file from `data`
    #[instrument(level = "debug", skip(self, data), fields(size = data.len()))]
    pub fn upload_file(
        &mut self,
        storage_id: u32,
        parent_handle: u32,
        filename: &str,
        data: &[u8],
    ) -> Result<ObjectInfoReceipt> {
        let info = ObjectInfo::file(storage_id, parent_handle, filename, data.len())?;
        let receipt = self.send_object_info(&info)?;
        self.send_object(data)?;
        Ok(receipt)
    }

    /// Create a folder
    #[instrument(level = "debug", skip(self))]
    pub fn create_folder(&mut self, storage_id: u32, parent_handle: u32, name: &str) -> Result<ObjectInfoReceipt> {
        self.send_object_info(&ObjectInfo::folder(storage_id, parent_handle, name))
    }

    /// List the children of a folder with their names, in device order
    #[instrument(level = "debug", skip(self))]
    pub fn list_folder(&mut self, storage_id: u32, parent_handle: u32) -> Result<Vec<FolderEntry>> {
        let handles = self.get_object_handles(storage_id, 0, parent_handle)?;
        let mut entries = Vec::with_capacity(handles.len());
        for handle in handles {
            let name = self.get_file_name(handle)?;
            entries.push(FolderEntry { handle, name });
        }
        Ok(entries)
    }

    /// Run a command whose data phase flows from the device
    fn transact_in(&mut self, code: u16, parameters: &[u32]) -> Result<Bytes> {
        let transaction_id = self.send_command(code, parameters)?;
        let data = self.read_data(code, transaction_id)?;
        self.read_response(code, transaction_id)?;
        Ok(data.into_payload())
    }

    fn send_command(&mut self, code: u16, parameters: &[u32]) -> Result<u32> {
        let container = self.transactions.command(code, parameters)?;
        self.send_container(&container)?;
        Ok(container.transaction_id())
    }

    fn send_with_data(&mut self, code: u16, parameters: &[u32], payload: Bytes) -> Result<u32> {
        let (command, data) = self.transactions.command_with_data(code, parameters, payload)?;
        self.send_container(&command)?;
        self.send_container(&data)?;
        Ok(command.transaction_id())
    }

    fn send_container(&mut self, container: &Container) -> Result<()> {
        trace!(
            kind = %container.kind(),
            code = container.code_name(),
            transaction_id = container.transaction_id(),
            length = container.length(),
            "sending container"
        );
        send_fragmented(
            &mut self.transport,
            &container.encode(),
            self.config.max_packet_out,
            self.config.zero_length_terminator,
        )?;
        Ok(())
    }

    fn receive_container(&mut self) -> Result<Container> {
        let (bytes, declared) = receive_frame(&mut self.transport, self.config.max_packet_in)?;
        let container = decode(bytes, declared)?;
        trace!(
            kind = %container.kind(),
            code = container.code_name(),
            transaction_id = container.transaction_id(),
            length = container.length(),
            "received container"
        );
        Ok(container)
    }

    /// Await the Data frame of `transaction_id`
    ///
    /// Events and Responses of earlier transactions are skipped unless their
    /// code is configured as fatal. A Response for this transaction ends the
    /// wait: there will be no data phase. A Response carrying an id this
    /// session never issued is a transaction mismatch.
    fn read_data(&mut self, code: u16, transaction_id: u32) -> Result<Container> {
        loop {
            let container = self.receive_container()?;
            match container.kind() {
                ContainerKind::Data if container.transaction_id() == transaction_id => {
                    return Ok(container);
                }
                ContainerKind::Data => {
                    return Err(Error::TransactionMismatch {
                        expected: transaction_id,
                        found: container.transaction_id(),
                    });
                }
                ContainerKind::Response => {
                    let response = container.response_code();
                    if self.config.is_fatal(response) {
                        return Err(Error::DeviceRejected {
                            operation: code,
                            code: response,
                        });
                    }
                    let own = self
                        .transactions
                        .check_echo(transaction_id, container.transaction_id())?;
                    if own && !response.is_ok() {
                        return Err(Error::DeviceRejected {
                            operation: code,
                            code: response,
                        });
                    } else if own {
                        return Err(Error::UnexpectedContainer {
                            expected: ContainerKind::Data,
                            found: ContainerKind::Response,
                        });
                    }
                    warn!(
                        code = %response,
                        transaction_id = container.transaction_id(),
                        "skipping response while awaiting data"
                    );
                }
                kind => debug!(%kind, "skipping container while awaiting data"),
            }
        }
    }

    /// Await the Response of `transaction_id`; non-OK codes are rejections
    ///
    /// Responses of earlier transactions are skipped; an id never issued is a
    /// transaction mismatch.
    fn read_response(&mut self, code: u16, transaction_id: u32) -> Result<Container> {
        loop {
            let container = self.receive_container()?;
            match container.kind() {
                ContainerKind::Response => {
                    let response = container.response_code();
                    if !self
                        .transactions
                        .check_echo(transaction_id, container.transaction_id())?
                    {
                        debug!(
                            code = %response,
                            transaction_id = container.transaction_id(),
                            "skipping stale response"
                        );
                        continue;
                    }
                    if !response.is_ok() {
                        return Err(Error::DeviceRejected {
                            operation: code,
                            code: response,
                        });
                    }
                    return Ok(container);
                }
                ContainerKind::Data => {
                    return Err(Error::UnexpectedContainer {
                        expected: ContainerKind::Response,
                        found: ContainerKind::Data,
                    });
                }
                kind => debug!(%kind, "skipping container while awaiting response"),
            }
        }
    }
}
