//! Scripted in-memory device used by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use bytes::Bytes;
use mtp::protocol::{ContainerHeader, decode, fields::DatasetWriter};
use mtp::{Container, ContainerKind, Inbound, ResponseCode, TransferStatus, Transport, TransportError};

/// Plays back queued inbound packets and records every outbound send.
pub struct ScriptedDevice {
    inbound: VecDeque<Inbound>,
    send_statuses: VecDeque<TransferStatus>,
    packet_size: usize,
    pub sent: Vec<Vec<u8>>,
    pub receives: usize,
}

impl ScriptedDevice {
    pub fn new(packet_size: usize) -> Self {
        Self {
            inbound: VecDeque::new(),
            send_statuses: VecDeque::new(),
            packet_size,
            sent: Vec::new(),
            receives: 0,
        }
    }

    /// Queue a frame split into packets of the device's packet size
    pub fn queue_frame(&mut self, frame: &[u8]) {
        for chunk in frame.chunks(self.packet_size) {
            self.inbound.push_back(Inbound::ok(chunk.to_vec()));
        }
    }

    pub fn queue_packet(&mut self, packet: &[u8]) {
        self.inbound.push_back(Inbound::ok(packet.to_vec()));
    }

    pub fn queue_status(&mut self, status: TransferStatus) {
        self.inbound.push_back(Inbound::status(status));
    }

    pub fn queue_response(&mut self, code: ResponseCode, transaction_id: u32, params: &[u32]) {
        let frame = Container::with_parameters(ContainerKind::Response, code.as_u16(), transaction_id, params)
            .unwrap()
            .encode();
        self.queue_frame(&frame);
    }

    pub fn queue_ok(&mut self, transaction_id: u32) {
        self.queue_response(ResponseCode::Ok, transaction_id, &[]);
    }

    pub fn queue_event(&mut self, code: u16, transaction_id: u32, params: &[u32]) {
        let frame = Container::with_parameters(ContainerKind::Event, code, transaction_id, params)
            .unwrap()
            .encode();
        self.queue_frame(&frame);
    }

    pub fn queue_data(&mut self, code: u16, transaction_id: u32, payload: &[u8]) {
        let frame = Container::data(code, transaction_id, payload.to_vec()).unwrap().encode();
        self.queue_frame(&frame);
    }

    /// Queue a data phase followed by its OK response
    pub fn queue_data_ok(&mut self, code: u16, transaction_id: u32, payload: &[u8]) {
        self.queue_data(code, transaction_id, payload);
        self.queue_ok(transaction_id);
    }

    pub fn fail_next_send(&mut self, status: TransferStatus) {
        self.send_statuses.push_back(status);
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Containers recovered from the outbound byte stream
    pub fn sent_containers(&self) -> Vec<Container> {
        let stream: Vec<u8> = self.sent.concat();
        let mut containers = Vec::new();
        let mut offset = 0;

        while offset < stream.len() {
            let length = ContainerHeader::peek_length(&stream[offset..]).unwrap() as usize;
            let frame = Bytes::copy_from_slice(&stream[offset..offset + length]);
            containers.push(decode(frame, length).unwrap());
            offset += length;
        }

        containers
    }
}

impl Transport for ScriptedDevice {
    fn receive(&mut self, _max_len: usize) -> Result<Inbound, TransportError> {
        self.receives += 1;
        self.inbound.pop_front().ok_or(TransportError::Disconnected)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<TransferStatus, TransportError> {
        self.sent.push(bytes.to_vec());
        Ok(self.send_statuses.pop_front().unwrap_or(TransferStatus::Ok))
    }
}

/// u32 array dataset: count followed by the items
pub fn u32_array(items: &[u32]) -> Vec<u8> {
    let mut writer = DatasetWriter::with_capacity(4 + items.len() * 4);
    writer.put_u32(items.len() as u32);
    for item in items {
        writer.put_u32(*item);
    }
    writer.finish().to_vec()
}

/// String field payload as returned by GetObjectPropValue
pub fn string_payload(value: &str) -> Vec<u8> {
    let mut writer = DatasetWriter::with_capacity(1 + (value.len() + 1) * 2);
    writer.put_string(value).unwrap();
    writer.finish().to_vec()
}

/// Install a test subscriber honoring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
