//! # Frame Builder - QMI Request Construction
//!
//! ## Purpose
//!
//! Writes outbound frames directly into a caller-provided buffer. A frame is
//! started with [`begin_message`] and grown one TLV at a time with
//! [`append_tlv`]; both length fields (QMUX `length` and the service header
//! `length`) are updated together on every append, so the buffer always holds
//! a complete, sendable frame.
//!
//! ## Length Bookkeeping
//!
//! ```text
//! [01][len:u16][flags][svc][cid][service header][T L V][T L V]...
//!      └──────────────── len counts from here ─────────────────┘
//!                                               └ payload_length ┘
//! ```
//!
//! The current QMUX length is the only cursor: the next TLV is written at
//! `length + 1`. TLVs cannot be removed or edited once appended.
//!
//! ## Capacity
//!
//! The buffer's length is its capacity. An append that would grow the frame
//! past it fails with [`EncodeError::BufferFull`] before touching any byte, so
//! the frame stays exactly as it was after the last successful append.

use crate::error::{EncodeError, EncodeResult};
use qmi_types::{
    CtlHeader, GenericHeader, QmuxHeader, ServiceHeader, ServiceType, TlvHeader,
    FRAME_MARKER_SIZE,
};
use zerocopy::{AsBytes, FromBytes};

/// Bytes written by [`begin_message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSpan {
    pub service: ServiceType,
    /// Marker, QMUX header and service header
    pub len: usize,
}

/// Write the QMUX header and the service header variant `service` requires,
/// with an empty payload.
///
/// `transaction_id` must already be advanced by the caller; zero is rejected,
/// as is anything wider than 8 bits for the control service.
pub fn begin_message(
    buffer: &mut [u8],
    service: ServiceType,
    client_id: u8,
    transaction_id: u16,
    message_id: u16,
) -> EncodeResult<HeaderSpan> {
    let invalid = EncodeError::InvalidTransactionId {
        transaction_id,
        service: service.name(),
    };
    if transaction_id == 0 {
        return Err(invalid);
    }

    let service_header =
        ServiceHeader::request(service, transaction_id, message_id).ok_or(invalid)?;
    let len = QmuxHeader::SIZE + service_header.size();
    if buffer.len() < len {
        return Err(EncodeError::HeaderDoesNotFit {
            need: len,
            capacity: buffer.len(),
        });
    }

    let mut qmux = QmuxHeader::request(service, client_id);
    qmux.set_length((len - FRAME_MARKER_SIZE) as u16);

    buffer[..QmuxHeader::SIZE].copy_from_slice(qmux.as_bytes());
    buffer[QmuxHeader::SIZE..len].copy_from_slice(service_header.as_bytes());

    Ok(HeaderSpan { service, len })
}

/// Append one TLV and grow both length fields by `3 + value.len()`.
///
/// Returns the frame length so far, marker included, which is the number of
/// bytes a transport must write.
pub fn append_tlv(buffer: &mut [u8], tlv_type: u8, value: &[u8]) -> EncodeResult<usize> {
    let capacity = buffer.len();
    let (mut qmux, mut service_header) = read_headers(buffer)?;

    let frame_len = usize::from(qmux.length()) + FRAME_MARKER_SIZE;
    let record_len = TlvHeader::SIZE + value.len();
    let need = frame_len + record_len;

    if need > capacity || need - FRAME_MARKER_SIZE > usize::from(u16::MAX) {
        return Err(EncodeError::BufferFull { need, capacity });
    }
    let payload_length = service_header
        .payload_length()
        .checked_add(record_len as u16)
        .ok_or(EncodeError::BufferFull { need, capacity })?;

    let value_start = frame_len + TlvHeader::SIZE;
    buffer[frame_len..value_start]
        .copy_from_slice(TlvHeader::new(tlv_type, value.len() as u16).as_bytes());
    buffer[value_start..need].copy_from_slice(value);

    qmux.set_length((need - FRAME_MARKER_SIZE) as u16);
    service_header.set_payload_length(payload_length);

    let service_end = QmuxHeader::SIZE + service_header.size();
    buffer[..QmuxHeader::SIZE].copy_from_slice(qmux.as_bytes());
    buffer[QmuxHeader::SIZE..service_end].copy_from_slice(service_header.as_bytes());

    Ok(need)
}

fn read_headers(buffer: &[u8]) -> EncodeResult<(QmuxHeader, ServiceHeader)> {
    let capacity = buffer.len();
    let qmux = QmuxHeader::read_from_prefix(buffer).ok_or(EncodeError::HeaderDoesNotFit {
        need: QmuxHeader::SIZE,
        capacity,
    })?;

    let rest = &buffer[QmuxHeader::SIZE..];
    let service_header = if qmux.service() == ServiceType::Control {
        CtlHeader::read_from_prefix(rest).map(ServiceHeader::Control)
    } else {
        GenericHeader::read_from_prefix(rest).map(ServiceHeader::Generic)
    }
    .ok_or(EncodeError::HeaderDoesNotFit {
        need: QmuxHeader::SIZE + ServiceHeader::size_for(qmux.service()),
        capacity,
    })?;

    Ok((qmux, service_header))
}

/// Owning builder over a zeroed buffer of fixed capacity
///
/// ```
/// use qmi_codec::MessageBuilder;
/// use qmi_types::ServiceType;
///
/// let frame = MessageBuilder::new(64, ServiceType::Nas, 2, 1, 0x0033)
///     .and_then(|b| b.add_tlv(0x11, &0x0004u16.to_le_bytes()))
///     .map(MessageBuilder::build)
///     .unwrap();
/// assert_eq!(frame.len(), 18);
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buffer: Vec<u8>,
    len: usize,
    tlv_count: usize,
}

impl MessageBuilder {
    pub fn new(
        capacity: usize,
        service: ServiceType,
        client_id: u8,
        transaction_id: u16,
        message_id: u16,
    ) -> EncodeResult<Self> {
        let mut buffer = vec![0u8; capacity];
        let span = begin_message(&mut buffer, service, client_id, transaction_id, message_id)?;
        Ok(Self {
            buffer,
            len: span.len,
            tlv_count: 0,
        })
    }

    /// Append a TLV, consuming the builder (abandon it on error)
    pub fn add_tlv(mut self, tlv_type: u8, value: &[u8]) -> EncodeResult<Self> {
        self.push_tlv(tlv_type, value)?;
        Ok(self)
    }

    /// Append a TLV in place; the frame is unchanged on error
    pub fn push_tlv(&mut self, tlv_type: u8, value: &[u8]) -> EncodeResult<usize> {
        self.len = append_tlv(&mut self.buffer, tlv_type, value)?;
        self.tlv_count += 1;
        Ok(self.len)
    }

    /// The frame built so far, marker included
    pub fn frame(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    pub fn frame_len(&self) -> usize {
        self.len
    }

    pub fn tlv_count(&self) -> usize {
        self.tlv_count
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Take the frame bytes, dropping unused capacity
    pub fn build(mut self) -> Vec<u8> {
        self.buffer.truncate(self.len);
        self.buffer
    }
}
