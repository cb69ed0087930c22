//! Diagnostic frame descriptions
//!
//! Human-readable rendering of a frame for debug logs and the `qmid decode`
//! tool. Rendering never fails: undecodable parts are described inline.

use crate::parser::{decode_header, iter_tlvs};
use qmi_types::ServiceType;
use std::fmt::Write;
use tracing::{debug, Level};

/// Multi-line description: raw bytes, QMUX header, service header, TLV chain.
pub fn describe(frame: &[u8]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "frame ({} bytes): {}", frame.len(), hex::encode(frame));

    let header = match decode_header(frame) {
        Ok(header) => header,
        Err(e) => {
            let _ = writeln!(out, "  undecodable: {e}");
            return out;
        }
    };

    let _ = writeln!(
        out,
        "QMUX: length {} flags {:#04x} service {} ({:#04x}) client {}",
        header.total_length,
        header.qmux_flags,
        header.service.name(),
        u8::from(header.service),
        header.client_id
    );
    let variant = if header.service == ServiceType::Control {
        "control"
    } else {
        "service"
    };
    let _ = writeln!(
        out,
        "QMI ({variant}): flags {:#04x} ({:?}) transaction {} message {:#06x} length {}",
        header.control_flags,
        header.kind,
        header.transaction_id,
        header.message_id,
        header.payload_length
    );

    let payload_end = header.header_len + usize::from(header.payload_length);
    if payload_end != header.frame_len() {
        let _ = writeln!(
            out,
            "  length mismatch: QMUX frame is {} bytes, payload ends at {payload_end}",
            header.frame_len()
        );
    }

    let payload = frame.get(header.header_len..).unwrap_or_default();
    for record in iter_tlvs(payload, header.payload_length) {
        match record {
            Ok(tlv) => {
                let _ = writeln!(
                    out,
                    "  TLV {:#04x} len {}: {}",
                    tlv.tlv_type,
                    tlv.value_len(),
                    hex::encode(tlv.value)
                );
            }
            Err(e) => {
                let _ = writeln!(out, "  {e}");
            }
        }
    }

    out
}

/// Emit the description of `frame` as debug events tagged with `direction`.
pub fn trace_frame(direction: &'static str, frame: &[u8]) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    for line in describe(frame).lines() {
        debug!(direction, "{line}");
    }
}
