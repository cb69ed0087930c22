//! Session errors

use qmi_codec::{DecodeError, EncodeError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NasError {
    /// Request could not be built; the attempt is abandoned
    #[error("Failed to build request: {0}")]
    Encode(#[from] EncodeError),

    /// Reply could not be decoded; the buffer is dropped
    #[error("Failed to decode reply: {0}")]
    Decode(#[from] DecodeError),

    /// Frame was built but not written
    #[error("Transport write failed: {0}")]
    Transport(#[from] io::Error),

    /// Reply carries no TLV to read the result code from
    #[error("Reply to message {message_id:#06x} carries no result TLV")]
    MissingResult { message_id: u16 },
}

pub type NasResult<T> = std::result::Result<T, NasError>;
