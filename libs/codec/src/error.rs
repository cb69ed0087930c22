//! Codec errors
//!
//! Every failure is recoverable: the caller abandons the frame being built or
//! drops the buffer being decoded. Nothing in the codec panics on bad input.

use thiserror::Error;

/// Frame construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Appending would grow the frame past the buffer capacity
    #[error("Buffer full: frame would need {need} bytes, capacity is {capacity}")]
    BufferFull { need: usize, capacity: usize },

    /// Buffer cannot even hold the headers of the requested variant
    #[error("Header does not fit: need {need} bytes, buffer has {capacity}")]
    HeaderDoesNotFit { need: usize, capacity: usize },

    /// Transaction ids are non-zero, and 8-bit for the control service
    #[error("Invalid transaction id {transaction_id} for service {service}")]
    InvalidTransactionId { transaction_id: u16, service: &'static str },
}

/// Frame parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is shorter than a required fixed layout
    #[error("Truncated: need {need} bytes, got {got} (context: {context})")]
    Truncated {
        need: usize,
        got: usize,
        context: &'static str,
    },

    /// A TLV breaks the payload boundary or carries an unusable value
    #[error("Malformed TLV {tlv_type:#04x} at payload offset {offset}: {reason}")]
    Malformed {
        offset: usize,
        tlv_type: u8,
        reason: String,
    },

    /// QMUX length and service header payload length describe different frames
    #[error("Length mismatch: QMUX frame is {frame_len} bytes, service header ends payload at {payload_end}")]
    LengthMismatch { frame_len: usize, payload_end: usize },

    /// First byte of the frame is not the QMUX interface type
    #[error("Unexpected interface type {0:#04x}, expected 0x01")]
    UnexpectedInterface(u8),
}

impl DecodeError {
    pub fn truncated(need: usize, got: usize, context: &'static str) -> Self {
        Self::Truncated { need, got, context }
    }

    pub fn malformed(offset: usize, tlv_type: u8, reason: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            tlv_type,
            reason: reason.into(),
        }
    }
}

pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
