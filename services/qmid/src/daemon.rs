//! Device event loop
//!
//! A reader thread forwards frames from the device; the main thread owns the
//! session, feeds it replies and resends on timeout.

use crate::link::LinkControl;
use anyhow::{bail, Context, Result};
use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use qmi_codec::{decode_header, DecodeError};
use qmi_nas::{DeviceTransport, HandleOutcome, NasOptions, NasSession, NasState, TracingTap};
use qmi_types::QMUX_IF_TYPE;
use qmid_config::DaemonConfig;
use std::fs::OpenOptions;
use std::io::{self, Read};
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const READ_BUFFER_SIZE: usize = 4096;
const CHANNEL_DEPTH: usize = 64;

pub fn run(config: &DaemonConfig) -> Result<()> {
    let device = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&config.device)
        .with_context(|| format!("Failed to open {:?}", config.device))?;
    let reader = device.try_clone().context("Failed to clone device handle")?;

    let (tx, rx) = bounded(CHANNEL_DEPTH);
    thread::Builder::new()
        .name("qmi-reader".to_string())
        .spawn(move || {
            if let Err(e) = read_frames(reader, &tx) {
                error!(error = %e, "QMI device read failed");
            }
        })
        .context("Failed to spawn reader thread")?;

    let options = NasOptions {
        mode_preference: config.mode_preference_mask(),
        max_message_size: config.max_message_size,
    };
    let mut session = NasSession::new(
        config.nas_client_id,
        DeviceTransport::new(device),
        LinkControl::new(&config.interface),
    )
    .with_options(options);
    if config.dump_frames {
        session = session.with_tap(TracingTap);
    }

    info!(
        device = ?config.device,
        client_id = config.nas_client_id,
        mode_preference = options.mode_preference,
        "NAS session started"
    );
    session.send().context("Failed to send system selection preference")?;

    let interval = config.retry_interval();
    let mut sys_info_seen = false;
    let mut deadline = Instant::now() + interval;

    loop {
        match rx.recv_deadline(deadline) {
            Ok(frame) => match session.handle_reply(&frame) {
                Ok(HandleOutcome::Advanced) => deadline = Instant::now() + interval,
                Ok(HandleOutcome::Processed) => sys_info_seen = true,
                Ok(HandleOutcome::Rejected(reason)) => {
                    warn!(%reason, state = ?session.state(), "Request rejected, will retry")
                }
                Ok(HandleOutcome::Ignored) => {}
                Err(e) => warn!(error = %e, "Dropping undecodable frame"),
            },
            Err(RecvTimeoutError::Timeout) => {
                if needs_retry(session.state(), sys_info_seen) {
                    debug!(state = ?session.state(), "No reply, resending");
                    if let Err(e) = session.send() {
                        warn!(error = %e, "Resend failed");
                    }
                }
                deadline = Instant::now() + interval;
            }
            Err(RecvTimeoutError::Disconnected) => bail!("QMI device reader stopped"),
        }
    }
}

/// Once System Info has been seen, indications keep the session current.
fn needs_retry(state: NasState, sys_info_seen: bool) -> bool {
    state != NasState::SystemInfoQuery || !sys_info_seen
}

/// Forward frames until EOF or the receiver goes away.
fn read_frames<R: Read>(mut reader: R, tx: &Sender<Vec<u8>>) -> io::Result<()> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut assembler = FrameAssembler::default();
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        for frame in assembler.push(&buffer[..n]) {
            if tx.send(frame).is_err() {
                return Ok(());
            }
        }
    }

    if assembler.pending() > 0 {
        warn!(bytes = assembler.pending(), "Device closed inside a frame");
    }
    Ok(())
}

/// Reassembles frames from reads by their declared length
///
/// A frame split across reads is held until its last byte arrives. Bytes that
/// do not start with a QMUX header are forwarded whole so the session reports
/// them.
#[derive(Debug, Default)]
struct FrameAssembler {
    pending: Vec<u8>,
}

impl FrameAssembler {
    fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(&first) = self.pending.first() {
            if first != QMUX_IF_TYPE {
                frames.push(std::mem::take(&mut self.pending));
                break;
            }
            match decode_header(&self.pending) {
                Ok(header) if header.frame_len() <= self.pending.len() => {
                    frames.push(self.pending.drain(..header.frame_len()).collect());
                }
                Ok(_) | Err(DecodeError::Truncated { .. }) => break,
                Err(_) => frames.push(std::mem::take(&mut self.pending)),
            }
        }
        frames
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}
