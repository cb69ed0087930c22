//! # QMI Codec
//!
//! ## Purpose
//!
//! The "rules" layer between the pure wire layouts in `qmi-types` and the NAS
//! session: building outbound frames into a caller-provided buffer and walking
//! received frames without ever reading past a declared boundary.
//!
//! ## Architecture Role
//!
//! ```text
//! qmi-types → [qmi-codec] → qmi-nas → transport
//!     ↑            ↓            ↓
//! Layouts     begin_message   send()
//! Registry    append_tlv      handle_reply()
//!             decode_header
//!             iter_tlvs
//! ```
//!
//! ## What This Crate Contains
//! - [`begin_message`] / [`append_tlv`] with synchronized QMUX and service
//!   header length bookkeeping, and the owning [`MessageBuilder`]
//! - [`decode_header`] normalizing both service header variants
//! - [`iter_tlvs`], a lazy, restartable, fused TLV sequence that surfaces a
//!   corrupt record as a terminal error item
//! - [`dump`] helpers for diagnostic frame descriptions
//!
//! ## What This Crate Does NOT Contain
//! - Device I/O or retry policy
//! - Session state (belongs in `qmi-nas`)

pub mod builder;
pub mod dump;
pub mod error;
pub mod parser;

pub use builder::{append_tlv, begin_message, HeaderSpan, MessageBuilder};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use parser::{decode_header, find_tlv, iter_tlvs, DecodedHeader, Frame, TlvIter, TlvRecord};
