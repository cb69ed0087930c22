//! Header Layouts
//!
//! Every multi-byte field is little-endian on the wire. All structs are
//! `Unaligned`, so they can be read from and written to any offset of a frame
//! buffer by copy (`read_from_prefix` / `write_to_prefix`); nothing here
//! reinterprets a borrowed buffer in place.
//!
//! ```text
//! QmuxHeader    if_type:u8 length:u16 control_flags:u8 service_type:u8 client_id:u8
//! CtlHeader     control_flags:u8 transaction_id:u8  message_id:u16 length:u16
//! GenericHeader control_flags:u8 transaction_id:u16 message_id:u16 length:u16
//! TlvHeader     tlv_type:u8 length:u16
//! ```

use super::constants::{QMUX_IF_TYPE, REQUEST_CONTROL_FLAGS};
use super::service::ServiceType;
use zerocopy::byteorder::{LittleEndian, U16};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

/// Multiplexing header (6 bytes, marker included)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct QmuxHeader {
    pub if_type: u8,
    /// Bytes after `if_type` through the end of the last TLV
    pub length: U16<LittleEndian>,
    pub control_flags: u8,
    pub service_type: u8,
    pub client_id: u8,
}

impl QmuxHeader {
    pub const SIZE: usize = 6;

    /// Header for a daemon-originated request with no service header yet counted.
    pub fn request(service: ServiceType, client_id: u8) -> Self {
        Self {
            if_type: QMUX_IF_TYPE,
            length: U16::new((Self::SIZE - 1) as u16),
            control_flags: REQUEST_CONTROL_FLAGS,
            service_type: service.into(),
            client_id,
        }
    }

    pub fn length(&self) -> u16 {
        self.length.get()
    }

    pub fn set_length(&mut self, length: u16) {
        self.length.set(length);
    }

    pub fn service(&self) -> ServiceType {
        ServiceType::from(self.service_type)
    }
}

/// Service header used only by the control service (6 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct CtlHeader {
    pub control_flags: u8,
    pub transaction_id: u8,
    pub message_id: U16<LittleEndian>,
    pub length: U16<LittleEndian>,
}

impl CtlHeader {
    pub const SIZE: usize = 6;
}

/// Service header used by every service other than control (7 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct GenericHeader {
    pub control_flags: u8,
    pub transaction_id: U16<LittleEndian>,
    pub message_id: U16<LittleEndian>,
    pub length: U16<LittleEndian>,
}

impl GenericHeader {
    pub const SIZE: usize = 7;
}

/// TLV record header (3 bytes); `length` counts only the value bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct TlvHeader {
    pub tlv_type: u8,
    pub length: U16<LittleEndian>,
}

impl TlvHeader {
    pub const SIZE: usize = 3;

    pub fn new(tlv_type: u8, length: u16) -> Self {
        Self {
            tlv_type,
            length: U16::new(length),
        }
    }
}

/// Direction of a message as encoded in the service header control flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
    Indication,
}

/// Either service header variant; the variant is chosen by the QMUX service type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceHeader {
    Control(CtlHeader),
    Generic(GenericHeader),
}

impl ServiceHeader {
    /// Empty request header of the variant `service` requires.
    ///
    /// `None` when `transaction_id` does not fit the control variant's 8 bits.
    pub fn request(service: ServiceType, transaction_id: u16, message_id: u16) -> Option<Self> {
        let header = if service == ServiceType::Control {
            Self::Control(CtlHeader {
                control_flags: REQUEST_CONTROL_FLAGS,
                transaction_id: u8::try_from(transaction_id).ok()?,
                message_id: U16::new(message_id),
                length: U16::new(0),
            })
        } else {
            Self::Generic(GenericHeader {
                control_flags: REQUEST_CONTROL_FLAGS,
                transaction_id: U16::new(transaction_id),
                message_id: U16::new(message_id),
                length: U16::new(0),
            })
        };
        Some(header)
    }

    /// On-wire size of the header variant used by `service`.
    pub fn size_for(service: ServiceType) -> usize {
        if service == ServiceType::Control {
            CtlHeader::SIZE
        } else {
            GenericHeader::SIZE
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Control(_) => CtlHeader::SIZE,
            Self::Generic(_) => GenericHeader::SIZE,
        }
    }

    pub fn control_flags(&self) -> u8 {
        match self {
            Self::Control(h) => h.control_flags,
            Self::Generic(h) => h.control_flags,
        }
    }

    pub fn transaction_id(&self) -> u16 {
        match self {
            Self::Control(h) => u16::from(h.transaction_id),
            Self::Generic(h) => h.transaction_id.get(),
        }
    }

    pub fn message_id(&self) -> u16 {
        match self {
            Self::Control(h) => h.message_id.get(),
            Self::Generic(h) => h.message_id.get(),
        }
    }

    /// Byte count of the TLV chain that follows this header
    pub fn payload_length(&self) -> u16 {
        match self {
            Self::Control(h) => h.length.get(),
            Self::Generic(h) => h.length.get(),
        }
    }

    pub fn set_payload_length(&mut self, length: u16) {
        match self {
            Self::Control(h) => h.length.set(length),
            Self::Generic(h) => h.length.set(length),
        }
    }

    /// Control and generic headers put the response/indication bits in
    /// different positions.
    pub fn kind(&self) -> MessageKind {
        let (response, indication) = match self {
            Self::Control(_) => (0x01, 0x02),
            Self::Generic(_) => (0x02, 0x04),
        };
        let flags = self.control_flags();
        if flags & indication != 0 {
            MessageKind::Indication
        } else if flags & response != 0 {
            MessageKind::Response
        } else {
            MessageKind::Request
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Control(h) => h.as_bytes(),
            Self::Generic(h) => h.as_bytes(),
        }
    }
}
