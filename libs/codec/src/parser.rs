//! # Frame Parser - Header Decoding and TLV Walking
//!
//! ## Purpose
//!
//! Bounds-checked decoding of received frames. [`decode_header`] reads the QMUX
//! header, picks the service header variant from the service type and returns
//! a normalized, owned [`DecodedHeader`]. [`iter_tlvs`] then walks the payload
//! lazily, one record per step.
//!
//! ## Walker Contract
//!
//! - Records come out in on-wire order; a fresh call re-walks from the start.
//! - The walk ends exactly when `payload_length` bytes have been consumed.
//! - A record whose header or declared value crosses `payload_length` is
//!   yielded as a single [`DecodeError::Malformed`] item and the walk stops;
//!   nothing after a corrupt record is ever yielded.
//! - Payload bytes missing from the buffer are [`DecodeError::Truncated`].
//!
//! First-match extraction ([`find_tlv`], [`Frame::find`]) is the same walk
//! stopped at the first record of the wanted type, so a corrupt record after
//! the match does not fail the lookup.

use crate::error::{DecodeError, DecodeResult};
use qmi_types::{
    CtlHeader, GenericHeader, MessageKind, QmuxHeader, ServiceHeader, ServiceType, TlvHeader,
    FRAME_MARKER_SIZE, QMUX_IF_TYPE,
};
use std::iter::FusedIterator;
use zerocopy::FromBytes;

/// Header fields of a frame, independent of the on-wire service header variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedHeader {
    pub service: ServiceType,
    pub client_id: u8,
    pub qmux_flags: u8,
    pub control_flags: u8,
    pub transaction_id: u16,
    pub message_id: u16,
    pub payload_length: u16,
    /// QMUX length field: bytes after the marker
    pub total_length: u16,
    pub kind: MessageKind,
    /// Offset of the first TLV
    pub header_len: usize,
}

impl DecodedHeader {
    /// Complete frame size on the wire, marker included
    pub fn frame_len(&self) -> usize {
        usize::from(self.total_length) + FRAME_MARKER_SIZE
    }
}

/// Decode the QMUX header and the matching service header variant.
pub fn decode_header(buffer: &[u8]) -> DecodeResult<DecodedHeader> {
    let qmux = QmuxHeader::read_from_prefix(buffer)
        .ok_or_else(|| DecodeError::truncated(QmuxHeader::SIZE, buffer.len(), "QMUX header"))?;

    if qmux.if_type != QMUX_IF_TYPE {
        return Err(DecodeError::UnexpectedInterface(qmux.if_type));
    }

    let service = qmux.service();
    let rest = &buffer[QmuxHeader::SIZE..];
    let service_header = if service == ServiceType::Control {
        CtlHeader::read_from_prefix(rest).map(ServiceHeader::Control)
    } else {
        GenericHeader::read_from_prefix(rest).map(ServiceHeader::Generic)
    }
    .ok_or_else(|| {
        DecodeError::truncated(
            QmuxHeader::SIZE + ServiceHeader::size_for(service),
            buffer.len(),
            "service header",
        )
    })?;

    Ok(DecodedHeader {
        service,
        client_id: qmux.client_id,
        qmux_flags: qmux.control_flags,
        control_flags: service_header.control_flags(),
        transaction_id: service_header.transaction_id(),
        message_id: service_header.message_id(),
        payload_length: service_header.payload_length(),
        total_length: qmux.length(),
        kind: service_header.kind(),
        header_len: QmuxHeader::SIZE + service_header.size(),
    })
}

/// One TLV record borrowed from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvRecord<'a> {
    pub tlv_type: u8,
    pub value: &'a [u8],
    /// Offset of the record header within the payload
    pub offset: usize,
}

impl<'a> TlvRecord<'a> {
    pub fn value_len(&self) -> usize {
        self.value.len()
    }

    /// Payload offset just past this record
    pub fn end(&self) -> usize {
        self.offset + TlvHeader::SIZE + self.value.len()
    }

    pub fn u8_at(&self, index: usize) -> DecodeResult<u8> {
        self.value.get(index).copied().ok_or_else(|| self.too_short(index + 1))
    }

    /// Little-endian u16 starting at `index` of the value
    pub fn u16_at(&self, index: usize) -> DecodeResult<u16> {
        match self.value.get(index..index + 2) {
            Some(bytes) => Ok(u16::from_le_bytes([bytes[0], bytes[1]])),
            None => Err(self.too_short(index + 2)),
        }
    }

    fn too_short(&self, need: usize) -> DecodeError {
        DecodeError::malformed(
            self.offset,
            self.tlv_type,
            format!("value has {} bytes, field needs {}", self.value.len(), need),
        )
    }
}

/// Lazy TLV sequence over a payload; see the module docs for the contract
#[derive(Debug, Clone)]
pub struct TlvIter<'a> {
    payload: &'a [u8],
    limit: usize,
    offset: usize,
    done: bool,
}

/// Walk the TLV chain of `payload`, bounded by the declared `payload_length`.
pub fn iter_tlvs(payload: &[u8], payload_length: u16) -> TlvIter<'_> {
    TlvIter {
        payload,
        limit: usize::from(payload_length),
        offset: 0,
        done: false,
    }
}

impl<'a> TlvIter<'a> {
    fn step(&self) -> DecodeResult<TlvRecord<'a>> {
        let offset = self.offset;
        let remaining = self.limit - offset;

        if remaining < TlvHeader::SIZE {
            let tlv_type = self.payload.get(offset).copied().unwrap_or_default();
            return Err(DecodeError::malformed(
                offset,
                tlv_type,
                format!("{remaining} trailing bytes cannot hold a TLV header"),
            ));
        }

        let header = self
            .payload
            .get(offset..)
            .and_then(TlvHeader::read_from_prefix)
            .ok_or_else(|| {
                DecodeError::truncated(offset + TlvHeader::SIZE, self.payload.len(), "TLV header")
            })?;

        let value_start = offset + TlvHeader::SIZE;
        let value_end = value_start + usize::from(header.length.get());

        if value_end > self.limit {
            return Err(DecodeError::malformed(
                offset,
                header.tlv_type,
                format!(
                    "declared length {} runs {} bytes past payload length {}",
                    header.length.get(),
                    value_end - self.limit,
                    self.limit
                ),
            ));
        }

        let value = self
            .payload
            .get(value_start..value_end)
            .ok_or_else(|| DecodeError::truncated(value_end, self.payload.len(), "TLV value"))?;

        Ok(TlvRecord {
            tlv_type: header.tlv_type,
            value,
            offset,
        })
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = DecodeResult<TlvRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.limit {
            self.done = true;
            return None;
        }

        let item = self.step();
        match &item {
            Ok(record) => self.offset = record.end(),
            Err(_) => self.done = true,
        }
        Some(item)
    }
}

impl FusedIterator for TlvIter<'_> {}

/// First record of `tlv_type`, walking no further than the match.
pub fn find_tlv(
    payload: &[u8],
    payload_length: u16,
    tlv_type: u8,
) -> DecodeResult<Option<TlvRecord<'_>>> {
    for record in iter_tlvs(payload, payload_length) {
        let record = record?;
        if record.tlv_type == tlv_type {
            return Ok(Some(record));
        }
    }
    Ok(None)
}

/// A received frame: decoded header plus the borrowed TLV payload
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub header: DecodedHeader,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Decode the header and check the declared frame and payload are present.
    ///
    /// The service payload must end exactly where the QMUX length ends the
    /// frame; TLVs are never read past the frame.
    pub fn parse(buffer: &'a [u8]) -> DecodeResult<Self> {
        let header = decode_header(buffer)?;
        let frame_len = header.frame_len();

        if buffer.len() < frame_len {
            return Err(DecodeError::truncated(frame_len, buffer.len(), "frame"));
        }

        let payload_end = header.header_len + usize::from(header.payload_length);
        if payload_end != frame_len {
            return Err(DecodeError::LengthMismatch {
                frame_len,
                payload_end,
            });
        }

        let payload = buffer
            .get(header.header_len..payload_end)
            .ok_or_else(|| DecodeError::truncated(payload_end, buffer.len(), "TLV payload"))?;

        Ok(Self { header, payload })
    }

    pub fn tlvs(&self) -> TlvIter<'a> {
        iter_tlvs(self.payload, self.header.payload_length)
    }

    pub fn find(&self, tlv_type: u8) -> DecodeResult<Option<TlvRecord<'a>>> {
        find_tlv(self.payload, self.header.payload_length, tlv_type)
    }

    /// Leading record regardless of type (`None` for an empty payload)
    pub fn first_tlv(&self) -> DecodeResult<Option<TlvRecord<'a>>> {
        self.tlvs().next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MessageBuilder;

    fn sys_info_frame() -> Vec<u8> {
        MessageBuilder::new(128, ServiceType::Nas, 4, 0x0203, 0x004D)
            .and_then(|b| b.add_tlv(0x02, &[0x00, 0x00, 0x00, 0x00]))
            .and_then(|b| b.add_tlv(0x12, &[0x02, 0x02, 0x01]))
            .and_then(|b| b.add_tlv(0x12, &[0x00, 0x00, 0x00]))
            .map(MessageBuilder::build)
            .unwrap()
    }

    #[test]
    fn test_decode_generic_header() {
        let frame = sys_info_frame();
        let header = decode_header(&frame).unwrap();

        assert_eq!(header.service, ServiceType::Nas);
        assert_eq!(header.client_id, 4);
        assert_eq!(header.transaction_id, 0x0203);
        assert_eq!(header.message_id, 0x004D);
        assert_eq!(header.payload_length, 7 + 6 + 6);
        assert_eq!(header.header_len, 13);
        assert_eq!(header.frame_len(), frame.len());
        assert_eq!(header.kind, MessageKind::Request);
    }

    #[test]
    fn test_decode_control_header() {
        let frame = MessageBuilder::new(32, ServiceType::Control, 0, 0x7F, 0x0022)
            .map(MessageBuilder::build)
            .unwrap();
        let header = decode_header(&frame).unwrap();

        assert_eq!(header.service, ServiceType::Control);
        assert_eq!(header.transaction_id, 0x7F);
        assert_eq!(header.message_id, 0x0022);
        assert_eq!(header.header_len, 12);
    }

    #[test]
    fn test_truncated_headers() {
        assert!(matches!(
            decode_header(&[0x01, 0x0C, 0x00]),
            Err(DecodeError::Truncated { need: 6, got: 3, .. })
        ));
        assert!(matches!(
            decode_header(&[0x01, 0x0C, 0x00, 0x80, 0x03, 0x01, 0x02, 0x01]),
            Err(DecodeError::Truncated { need: 13, got: 8, .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_interface() {
        let mut frame = sys_info_frame();
        frame[0] = 0x7E;
        assert_eq!(decode_header(&frame), Err(DecodeError::UnexpectedInterface(0x7E)));
    }

    #[test]
    fn test_walk_yields_records_in_order() {
        let frame = sys_info_frame();
        let parsed = Frame::parse(&frame).unwrap();
        let records: Vec<_> = parsed.tlvs().collect::<Result<_, _>>().unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].tlv_type, 0x02);
        assert_eq!(records[1].value, &[0x02, 0x02, 0x01]);
        assert_eq!(records[2].offset, 13);
        assert_eq!(records[2].end(), usize::from(parsed.header.payload_length));
    }

    #[test]
    fn test_walk_is_restartable() {
        let frame = sys_info_frame();
        let parsed = Frame::parse(&frame).unwrap();
        let first_pass = parsed.tlvs().count();
        let second_pass = parsed.tlvs().count();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_overrun_is_terminal() {
        // second record claims 5 value bytes, only 1 remain before payload_length
        let payload = [0x01, 0x01, 0x00, 0xAA, 0x02, 0x05, 0x00, 0xBB, 0x03, 0x00, 0x00];
        let mut walk = iter_tlvs(&payload, 8);

        assert!(walk.next().unwrap().is_ok());
        match walk.next() {
            Some(Err(DecodeError::Malformed { offset, tlv_type, .. })) => {
                assert_eq!(offset, 4);
                assert_eq!(tlv_type, 0x02);
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_trailing_bytes_are_malformed() {
        let payload = [0x01, 0x00, 0x00, 0x09, 0x09];
        let items: Vec<_> = iter_tlvs(&payload, 5).collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(DecodeError::Malformed { offset: 3, .. })));
    }

    #[test]
    fn test_payload_missing_from_buffer() {
        let payload = [0x01, 0x04, 0x00, 0xAA];
        let items: Vec<_> = iter_tlvs(&payload, 7).collect();
        assert!(matches!(items[0], Err(DecodeError::Truncated { need: 7, got: 4, .. })));
    }

    #[test]
    fn test_find_returns_first_match() {
        let frame = sys_info_frame();
        let parsed = Frame::parse(&frame).unwrap();
        let gsm = parsed.find(0x12).unwrap().unwrap();

        assert_eq!(gsm.u8_at(0).unwrap(), 0x02);
        assert!(parsed.find(0x14).unwrap().is_none());
    }

    #[test]
    fn test_find_stops_before_corrupt_tail() {
        let payload = [0x12, 0x01, 0x00, 0x02, 0x13, 0xFF, 0x00];
        let found = find_tlv(&payload, 7, 0x12).unwrap().unwrap();
        assert_eq!(found.value, &[0x02]);
        assert!(find_tlv(&payload, 7, 0x14).is_err());
    }

    #[test]
    fn test_record_field_access() {
        let frame = sys_info_frame();
        let parsed = Frame::parse(&frame).unwrap();
        let result = parsed.first_tlv().unwrap().unwrap();

        assert_eq!(result.u16_at(0).unwrap(), 0);
        assert!(matches!(result.u16_at(3), Err(DecodeError::Malformed { .. })));
        assert!(result.u8_at(4).is_err());
    }

    #[test]
    fn test_payload_past_frame_end_rejected() {
        // QMUX length covers the headers only; the service header claims 3 more
        let mut frame = MessageBuilder::new(32, ServiceType::Nas, 1, 1, 0x004D)
            .map(MessageBuilder::build)
            .unwrap();
        frame[11] = 0x03;
        frame.extend_from_slice(&[0x12, 0x00, 0x00]);

        assert_eq!(
            Frame::parse(&frame).unwrap_err(),
            DecodeError::LengthMismatch {
                frame_len: 13,
                payload_end: 16
            }
        );
    }

    #[test]
    fn test_payload_short_of_frame_end_rejected() {
        let mut frame = sys_info_frame();
        frame[11] -= 6;

        assert!(matches!(
            Frame::parse(&frame),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_frame_shorter_than_declared() {
        let frame = sys_info_frame();
        let cut = &frame[..frame.len() - 2];
        assert!(matches!(
            Frame::parse(cut),
            Err(DecodeError::Truncated { context: "frame", .. })
        ));
    }
}
