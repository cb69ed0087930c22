//! Integration tests for parsing frames as a modem sends them

use qmi_codec::{decode_header, iter_tlvs, DecodeError, Frame};
use qmi_types::{MessageKind, ServiceType};

/// Get System Info response: success, GSM in service, LTE no service
const SYS_INFO_RESPONSE: [u8; 32] = [
    0x01, 0x1F, 0x00, 0x80, 0x03, 0x02, // QMUX: length 31, from service, NAS, client 2
    0x02, 0x05, 0x00, 0x4D, 0x00, 0x13, 0x00, // response, txn 5, Get System Info, payload 19
    0x02, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, // result: success
    0x12, 0x03, 0x00, 0x02, 0x02, 0x01, // GSM service status: in service
    0x14, 0x03, 0x00, 0x00, 0x00, 0x00, // LTE service status: no service
];

#[test]
fn test_device_response_header() {
    let header = decode_header(&SYS_INFO_RESPONSE).unwrap();

    assert_eq!(header.service, ServiceType::Nas);
    assert_eq!(header.client_id, 2);
    assert_eq!(header.qmux_flags, 0x80);
    assert_eq!(header.kind, MessageKind::Response);
    assert_eq!(header.transaction_id, 5);
    assert_eq!(header.message_id, 0x004D);
    assert_eq!(header.payload_length, 19);
    assert_eq!(header.frame_len(), SYS_INFO_RESPONSE.len());
}

#[test]
fn test_device_response_chain() {
    let frame = Frame::parse(&SYS_INFO_RESPONSE).unwrap();
    let types: Vec<u8> = frame.tlvs().map(|r| r.unwrap().tlv_type).collect();
    assert_eq!(types, vec![0x02, 0x12, 0x14]);

    let lte = frame.find(0x14).unwrap().unwrap();
    assert_eq!(lte.u8_at(0).unwrap(), 0x00);
}

#[test]
fn test_overrunning_last_record_rejected() {
    let mut corrupt = SYS_INFO_RESPONSE;
    // LTE record claims 4 value bytes; only 3 fit in the declared payload
    corrupt[27] = 0x04;

    let frame = Frame::parse(&corrupt).unwrap();
    let items: Vec<_> = frame.tlvs().collect();

    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(items[1].is_ok());
    assert!(matches!(
        items[2],
        Err(DecodeError::Malformed { offset: 13, tlv_type: 0x14, .. })
    ));
}

#[test]
fn test_payload_length_larger_than_buffer() {
    let header = decode_header(&SYS_INFO_RESPONSE).unwrap();
    let payload = &SYS_INFO_RESPONSE[header.header_len..];

    // pretend the header declared 4 more bytes than the buffer carries
    let items: Vec<_> = iter_tlvs(payload, header.payload_length + 4).collect();
    assert!(items.last().unwrap().is_err());
}

#[test]
fn test_indication_flags() {
    let mut indication = SYS_INFO_RESPONSE;
    indication[6] = 0x04;
    indication[9] = 0x4E;

    let header = decode_header(&indication).unwrap();
    assert_eq!(header.kind, MessageKind::Indication);
    assert_eq!(header.message_id, 0x004E);
}
