mod common;

use common::{ScriptedDevice, init_tracing, string_payload, u32_array};
use mtp::protocol::fields::DatasetWriter;
use mtp::protocol::{AssociationType, ObjectFormat, operation, property};
use mtp::{
    ContainerKind, Error, ErrorCategory, MtpDevice, ObjectInfo, ResponseCode, SessionConfig,
    SessionState, TransferStatus, TransportError,
};

const STORAGE: u32 = 0x0001_0001;

/// Device with an open session; the next transaction id is 1.
fn open_device(packet_size: usize) -> MtpDevice<ScriptedDevice> {
    init_tracing();
    let mut transport = ScriptedDevice::new(packet_size);
    transport.queue_ok(0);
    MtpDevice::connect(transport, SessionConfig::default()).unwrap()
}

fn storage_info_payload() -> Vec<u8> {
    let mut writer = DatasetWriter::with_capacity(64);
    writer.put_u16(0x0003);
    writer.put_u16(0x0002);
    writer.put_u16(0x0000);
    writer.put_u64(8_000_000_000);
    writer.put_u64(2_500_000_000);
    writer.put_u32(0xFFFF_FFFF);
    writer.put_string("Internal Storage").unwrap();
    writer.put_string("").unwrap();
    writer.finish().to_vec()
}

#[test]
fn connect_opens_session_with_first_transaction() {
    let device = open_device(512);
    assert_eq!(device.session_state(), SessionState::Open);
    assert_eq!(device.next_transaction_id(), 1);

    let transport = device.into_transport();
    assert_eq!(
        transport.sent,
        vec![vec![
            0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x10, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
            0x00, 0x00
        ]]
    );
}

#[test]
fn session_already_open_is_accepted() {
    let mut transport = ScriptedDevice::new(512);
    transport.queue_response(ResponseCode::SessionAlreadyOpen, 0, &[]);

    let device = MtpDevice::connect(transport, SessionConfig::default()).unwrap();
    assert_eq!(device.session_state(), SessionState::Open);
}

#[test]
fn open_session_rejection_is_reported() {
    let mut transport = ScriptedDevice::new(512);
    transport.queue_response(ResponseCode::GeneralError, 0, &[]);

    let err = MtpDevice::connect(transport, SessionConfig::default()).err().unwrap();
    assert!(matches!(
        err,
        Error::DeviceRejected {
            operation: operation::OPEN_SESSION,
            code: ResponseCode::GeneralError
        }
    ));
    assert_eq!(err.category(), ErrorCategory::Device);
    assert!(!err.is_session_fatal());
}

#[test]
fn storage_ids_strip_leading_count() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_data_ok(operation::GET_STORAGE_IDS, 1, &u32_array(&[STORAGE, 0x0002_0001]));

    let ids = device.get_storage_ids().unwrap();
    assert_eq!(ids, vec![STORAGE, 0x0002_0001]);
    assert_eq!(device.next_transaction_id(), 2);
    assert_eq!(device.transport_mut().pending(), 0);
}

#[test]
fn storage_info_over_small_packets() {
    let mut device = open_device(16);
    device
        .transport_mut()
        .queue_data_ok(operation::GET_STORAGE_INFO, 1, &storage_info_payload());

    let info = device.get_storage_info(STORAGE).unwrap();
    assert_eq!(info.storage_type, 3);
    assert_eq!(info.max_capacity, 8_000_000_000);
    assert_eq!(info.free_space_bytes, 2_500_000_000);
    assert_eq!(info.description.as_deref(), Some("Internal Storage"));
    assert_eq!(info.volume_id, None);

    let sent = device.transport_mut().sent_containers();
    assert_eq!(sent[1].code(), operation::GET_STORAGE_INFO);
    assert_eq!(sent[1].parameters(), &[STORAGE]);
}

#[test]
fn object_handles_send_scope_parameters() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_data_ok(operation::GET_OBJECT_HANDLES, 1, &u32_array(&[7, 8, 9]));

    let handles = device.get_object_handles(STORAGE, 0, mtp::ROOT_HANDLE).unwrap();
    assert_eq!(handles, vec![7, 8, 9]);

    let sent = device.transport_mut().sent_containers();
    assert_eq!(sent[1].parameters(), &[STORAGE, 0, 0xFFFF_FFFF]);
    assert_eq!(sent[1].transaction_id(), 1);
}

#[test]
fn file_name_is_read_from_property() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_data_ok(operation::GET_OBJECT_PROP_VALUE, 1, &string_payload("track01.mp3"));

    assert_eq!(device.get_file_name(7).unwrap(), "track01.mp3");

    let sent = device.transport_mut().sent_containers();
    assert_eq!(sent[1].code(), operation::GET_OBJECT_PROP_VALUE);
    assert_eq!(
        sent[1].parameters(),
        &[7, u32::from(property::OBJECT_FILE_NAME)]
    );
}

#[test]
fn absent_file_name_is_empty() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_data_ok(operation::GET_OBJECT_PROP_VALUE, 1, &[0x00]);

    assert_eq!(device.get_file_name(7).unwrap(), "");
}

#[test]
fn object_reassembled_across_packets() {
    let mut device = open_device(512);
    let content: Vec<u8> = (0..1500u32).map(|i| (i % 251) as u8).collect();
    device
        .transport_mut()
        .queue_data_ok(operation::GET_OBJECT, 1, &content);

    let object = device.get_object(42).unwrap();
    assert_eq!(object.as_ref(), content.as_slice());
    // 1512-byte data frame in 3 packets, then the response
    assert_eq!(device.transport_mut().receives, 1 + 3 + 1);
}

#[test]
fn data_wait_skips_events_and_stale_responses() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_event(0x4002, 0, &[0x55]);
    transport.queue_response(ResponseCode::DeviceBusy, 0, &[]);
    transport.queue_data_ok(operation::GET_STORAGE_IDS, 1, &u32_array(&[STORAGE]));

    assert_eq!(device.get_storage_ids().unwrap(), vec![STORAGE]);
}

#[test]
fn invalid_parameter_aborts_data_wait() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_response(ResponseCode::InvalidParameter, 0, &[]);
    transport.queue_data_ok(operation::GET_OBJECT_HANDLES, 1, &u32_array(&[1]));

    let err = device.get_object_handles(STORAGE, 0, 0).unwrap_err();
    assert!(matches!(
        err,
        Error::DeviceRejected {
            operation: operation::GET_OBJECT_HANDLES,
            code: ResponseCode::InvalidParameter
        }
    ));
    assert_eq!(err.response_code(), Some(ResponseCode::InvalidParameter));
}

#[test]
fn configured_fatal_codes_abort_data_wait() {
    init_tracing();
    let mut transport = ScriptedDevice::new(512);
    transport.queue_ok(0);
    transport.queue_response(ResponseCode::DeviceBusy, 0, &[]);

    let config = SessionConfig {
        fatal_response_codes: vec![ResponseCode::InvalidParameter, ResponseCode::DeviceBusy],
        ..SessionConfig::default()
    };
    let mut device = MtpDevice::connect(transport, config).unwrap();

    let err = device.get_storage_ids().unwrap_err();
    assert_eq!(err.response_code(), Some(ResponseCode::DeviceBusy));
}

#[test]
fn own_rejection_ends_data_wait() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_response(ResponseCode::InvalidObjectHandle, 1, &[]);

    let err = device.get_object(99).unwrap_err();
    assert_eq!(
        err.to_string(),
        "GetObject rejected by device: Invalid ObjectHandle (0x2009)"
    );
}

#[test]
fn data_for_another_transaction_is_a_protocol_error() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_data(operation::GET_OBJECT, 5, b"stale");

    let err = device.get_object(1).unwrap_err();
    assert!(matches!(
        err,
        Error::TransactionMismatch {
            expected: 1,
            found: 5
        }
    ));
    assert!(err.is_session_fatal());
}

#[test]
fn response_with_unissued_id_is_a_protocol_error() {
    let mut device = open_device(512);
    device.transport_mut().queue_ok(9);

    let err = device.delete_object(3).unwrap_err();
    assert!(matches!(
        err,
        Error::TransactionMismatch {
            expected: 1,
            found: 9
        }
    ));
    assert!(err.is_session_fatal());
    assert_eq!(device.transport_mut().pending(), 0);
}

#[test]
fn data_wait_rejects_response_with_unissued_id() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_response(ResponseCode::DeviceBusy, 7, &[]);
    transport.queue_data_ok(operation::GET_STORAGE_IDS, 1, &u32_array(&[STORAGE]));

    let err = device.get_storage_ids().unwrap_err();
    assert!(matches!(
        err,
        Error::TransactionMismatch {
            expected: 1,
            found: 7
        }
    ));
}

#[test]
fn response_wait_skips_earlier_transaction() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_ok(0);
    transport.queue_ok(1);

    assert!(device.delete_object(3).unwrap().is_ok_response());
    assert_eq!(device.transport_mut().pending(), 0);
}

#[test]
fn terminal_response_rejection_after_data() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_data(operation::GET_OBJECT, 1, b"partial");
    transport.queue_response(ResponseCode::IncompleteTransfer, 1, &[]);

    let err = device.get_object(3).unwrap_err();
    assert_eq!(err.response_code(), Some(ResponseCode::IncompleteTransfer));
}

#[test]
fn delete_object_returns_response() {
    let mut device = open_device(512);
    device.transport_mut().queue_ok(1);

    let response = device.delete_object(12).unwrap();
    assert_eq!(response.kind(), ContainerKind::Response);
    assert!(response.is_ok_response());

    device
        .transport_mut()
        .queue_response(ResponseCode::ObjectWriteProtected, 2, &[]);
    let err = device.delete_object(13).unwrap_err();
    assert_eq!(err.response_code(), Some(ResponseCode::ObjectWriteProtected));

    let sent = device.transport_mut().sent_containers();
    assert_eq!(sent[1].parameters(), &[12]);
    assert_eq!(sent[2].transaction_id(), 2);
}

#[test]
fn send_object_info_pairs_data_with_command() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_response(ResponseCode::Ok, 1, &[STORAGE, 0xFFFF_FFFF, 0x0000_0123]);

    let info = ObjectInfo::file(STORAGE, mtp::ROOT_HANDLE, "notes.txt", 11).unwrap();
    let receipt = device.send_object_info(&info).unwrap();
    assert_eq!(receipt.transaction_id, 1);
    assert_eq!(receipt.object_handle, Some(0x123));

    let sent = device.transport_mut().sent_containers();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].kind(), ContainerKind::Command);
    assert_eq!(sent[1].parameters(), &[STORAGE, 0xFFFF_FFFF]);
    assert_eq!(sent[2].kind(), ContainerKind::Data);
    assert_eq!(sent[2].code(), operation::SEND_OBJECT_INFO);
    assert_eq!(sent[2].transaction_id(), 1);
    assert_eq!(sent[2].payload(), info.encode().unwrap().as_ref());
}

#[test]
fn upload_fragments_content_and_sequences_ids() {
    init_tracing();
    let mut transport = ScriptedDevice::new(64);
    transport.queue_ok(0);
    transport.queue_response(ResponseCode::Ok, 1, &[STORAGE, 0xFFFF_FFFF, 0x44]);
    transport.queue_ok(2);

    let config = SessionConfig::default().with_packet_sizes(64, 64);
    let mut device = MtpDevice::connect(transport, config).unwrap();
    let content = vec![0xC3; 200];

    let receipt = device
        .upload_file(STORAGE, mtp::ROOT_HANDLE, "photo.jpg", &content)
        .unwrap();
    assert_eq!(receipt.object_handle, Some(0x44));
    assert_eq!(device.next_transaction_id(), 3);

    let transport = device.into_transport();
    assert!(transport.sent.iter().all(|packet| packet.len() <= 64));

    let sent = transport.sent_containers();
    let ids: Vec<u32> = sent.iter().map(|c| c.transaction_id()).collect();
    assert_eq!(ids, [0, 1, 1, 2, 2]);
    assert_eq!(sent[3].code(), operation::SEND_OBJECT);
    assert!(sent[3].parameters().is_empty());
    assert_eq!(sent[4].payload(), content.as_slice());

    // 212-byte data container in ceil(212 / 64) packets
    let data_packets = transport.sent.len() - (1 + 1 + 2 + 1);
    assert_eq!(data_packets, 4);
}

#[test]
fn upload_rejected_object_info_sends_no_content() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_response(ResponseCode::StoreFull, 1, &[]);

    let err = device
        .upload_file(STORAGE, mtp::ROOT_HANDLE, "big.bin", &[0; 32])
        .unwrap_err();
    assert_eq!(err.response_code(), Some(ResponseCode::StoreFull));
    assert_eq!(device.transport_mut().sent_containers().len(), 3);
}

#[test]
fn create_folder_marks_association() {
    let mut device = open_device(512);
    device
        .transport_mut()
        .queue_response(ResponseCode::Ok, 1, &[STORAGE, 0x10, 0x20]);

    let receipt = device.create_folder(STORAGE, 0x10, "Music").unwrap();
    assert_eq!(receipt.parent_handle, 0x10);
    assert_eq!(receipt.object_handle, Some(0x20));

    let sent = device.transport_mut().sent_containers();
    let info = ObjectInfo::decode(sent[2].payload()).unwrap();
    assert_eq!(info.object_format, ObjectFormat::Association);
    assert_eq!(info.association_type, AssociationType::GenericFolder);
    assert_eq!(info.object_size, 0);
    assert_eq!(info.filename, "Music");
}

#[test]
fn oversized_name_fails_before_sending() {
    let mut device = open_device(512);
    let name = "n".repeat(300);

    let err = device.create_folder(STORAGE, mtp::ROOT_HANDLE, &name).unwrap_err();
    assert!(matches!(err, Error::StringTooLong { len: 300 }));
    assert_eq!(err.category(), ErrorCategory::Encoding);
    assert_eq!(device.transport_mut().sent.len(), 1);
    assert_eq!(device.next_transaction_id(), 1);
}

#[test]
fn list_folder_names_every_child() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_data_ok(operation::GET_OBJECT_HANDLES, 1, &u32_array(&[0x21, 0x22]));
    transport.queue_data_ok(operation::GET_OBJECT_PROP_VALUE, 2, &string_payload("DCIM"));
    transport.queue_data_ok(operation::GET_OBJECT_PROP_VALUE, 3, &string_payload("Music"));

    let entries = device.list_folder(STORAGE, mtp::ROOT_HANDLE).unwrap();
    let names: Vec<(u32, &str)> = entries.iter().map(|e| (e.handle, e.name.as_str())).collect();
    assert_eq!(names, [(0x21, "DCIM"), (0x22, "Music")]);
}

#[test]
fn device_info_without_session() {
    init_tracing();
    let mut writer = DatasetWriter::with_capacity(128);
    writer.put_u16(100);
    writer.put_u32(6);
    writer.put_u16(100);
    writer.put_string("microsoft.com: 1.0;").unwrap();
    writer.put_u16(0);
    let groups: [&[u16]; 5] = [&[0x1001, 0x1002, 0x100C], &[], &[], &[], &[]];
    for codes in groups {
        writer.put_u32(codes.len() as u32);
        for code in codes {
            writer.put_u16(*code);
        }
    }
    writer.put_string("Acme").unwrap();
    writer.put_string("Player").unwrap();
    writer.put_string("1.0").unwrap();
    writer.put_string("").unwrap();

    let mut transport = ScriptedDevice::new(512);
    transport.queue_data_ok(operation::GET_DEVICE_INFO, 0, &writer.finish());
    let mut device = MtpDevice::new(transport, SessionConfig::default());

    let info = device.get_device_info().unwrap();
    assert_eq!(info.vendor_extension_id, 6);
    assert!(info.supports_operation(operation::SEND_OBJECT_INFO));
    assert_eq!(info.model.as_deref(), Some("Player"));
    assert_eq!(info.serial_number, None);
    assert_eq!(device.session_state(), SessionState::Closed);
}

#[test]
fn babble_is_retried_once() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_status(TransferStatus::Babble);
    transport.queue_data_ok(operation::GET_STORAGE_IDS, 1, &u32_array(&[STORAGE]));

    assert_eq!(device.get_storage_ids().unwrap(), vec![STORAGE]);
}

#[test]
fn zero_length_packets_are_tolerated() {
    let mut device = open_device(512);
    let transport = device.transport_mut();
    transport.queue_packet(&[]);
    transport.queue_data_ok(operation::GET_STORAGE_IDS, 1, &u32_array(&[STORAGE]));

    assert_eq!(device.get_storage_ids().unwrap(), vec![STORAGE]);
}

#[test]
fn zero_length_packet_after_aligned_data_frame() {
    // 12 + 4 + 4 * 4 = 32 bytes, exactly two 16-byte packets
    let mut device = open_device(16);
    let ids = [STORAGE, 0x0002_0001, 0x0003_0001, 0x0004_0001];
    let transport = device.transport_mut();
    transport.queue_data(operation::GET_STORAGE_IDS, 1, &u32_array(&ids));
    transport.queue_packet(&[]);
    transport.queue_ok(1);

    assert_eq!(device.get_storage_ids().unwrap(), ids);
    // OpenSession response, two data packets, the empty packet, the response
    assert_eq!(device.transport_mut().receives, 1 + 2 + 1 + 1);
    assert_eq!(device.transport_mut().pending(), 0);
}

#[test]
fn disconnect_mid_frame_is_fatal() {
    let mut device = open_device(512);
    let frame = mtp::Container::data(operation::GET_OBJECT, 1, vec![0; 100])
        .unwrap()
        .encode();
    device.transport_mut().queue_packet(&frame[..40]);

    let err = device.get_object(1).unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Disconnected)));
    assert_eq!(err.category(), ErrorCategory::Transport);
    assert!(err.is_session_fatal());
}

#[test]
fn stalled_send_aborts_operation() {
    let mut device = open_device(512);
    device.transport_mut().fail_next_send(TransferStatus::Stall);

    let err = device.get_storage_ids().unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::SendFailed {
            status: TransferStatus::Stall,
            offset: 0
        })
    ));
}

#[test]
fn zero_length_terminator_follows_aligned_transfer() {
    init_tracing();
    let mut transport = ScriptedDevice::new(512);
    transport.queue_ok(0);
    transport.queue_ok(1);

    let config = SessionConfig {
        max_packet_out: 16,
        zero_length_terminator: true,
        ..SessionConfig::default()
    };
    let mut device = MtpDevice::connect(transport, config).unwrap();
    // 12-byte header + 20 bytes = 32, two full packets
    device.send_object(&[0xAB; 20]).unwrap();

    let transport = device.into_transport();
    assert!(transport.sent.last().unwrap().is_empty());
    // OpenSession (16 bytes) is aligned too
    assert!(transport.sent[1].is_empty());
}
