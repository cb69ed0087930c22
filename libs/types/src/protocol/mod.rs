//! Protocol layer: framing constants, header layouts and service registry.

pub mod constants;
pub mod header;
pub mod service;

pub use header::{CtlHeader, GenericHeader, MessageKind, QmuxHeader, ServiceHeader, TlvHeader};
pub use service::ServiceType;
