//! # NAS Session
//!
//! ## Purpose
//!
//! Per-device protocol state for the QMI Network Access Service: which request
//! goes out next, how replies advance the session, and when the modem gains or
//! loses service.
//!
//! ## Data Flow
//!
//! ```text
//! event loop ──send()──────────→ codec ──→ Transport::write_frame
//! device ──frame──→ handle_reply() ──→ Frame::parse ──→ state transition
//!                        │                                  │
//!                        └── AttachObserver::attach_changed ┘
//!                        └── send() again (Indication Register success)
//! ```
//!
//! The session is single-threaded and synchronous. Retry and timeout policy
//! belong to the caller: re-invoking [`NasSession::send`] in the current state
//! is always safe.

pub mod error;
pub mod hooks;
pub mod session;
pub mod state;
pub mod sys_info;
pub mod transport;

pub use error::{NasError, NasResult};
pub use hooks::{AttachObserver, FrameTap, TracingTap};
pub use session::{HandleOutcome, NasOptions, NasSession, OutboundMessage};
pub use state::{NasState, TransactionCounter};
pub use sys_info::{ServingSystem, SysInfoReport};
pub use transport::{DeviceTransport, Transport};
