//! # QMI Wire Types
//!
//! Pure layout and semantic types for the QMI control protocol spoken over a
//! modem's control character device.
//!
//! ## Frame Layout
//!
//! ```text
//! ┌────────┬──────────────────────────┬─────────────────────┬──────────────┐
//! │ IfType │ QMUX (len, flags, svc,   │ Service header      │ TLV records  │
//! │ 0x01   │ client)                  │ (CTL: 6 / gen: 7 B) │ (packed)     │
//! └────────┴──────────────────────────┴─────────────────────┴──────────────┘
//!   1 byte    5 bytes
//! ```
//!
//! The leading interface-type byte doubles as the framing marker: the QMUX
//! `length` field counts every byte after it, so a complete frame on the wire
//! is always `length + 1` bytes.
//!
//! ## What This Crate Contains
//! - Fixed-size header layouts ([`QmuxHeader`], [`CtlHeader`], [`GenericHeader`],
//!   [`TlvHeader`]) as `zerocopy` structs with little-endian fields
//! - [`ServiceType`] and the NAS message/TLV registry in [`nas`]
//!
//! ## What This Crate Does NOT Contain
//! - Building or walking frames (belongs in `qmi-codec`)
//! - Session state (belongs in `qmi-nas`)

pub mod nas;
pub mod protocol;

pub use nas::{
    NasMessage, QmiResult, RadioTechnology, RegistrationState, ServiceStatus, ServiceTechnology,
};
pub use protocol::{
    constants::*, CtlHeader, GenericHeader, MessageKind, QmuxHeader, ServiceHeader, ServiceType,
    TlvHeader,
};
