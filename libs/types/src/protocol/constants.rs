//! Framing constants shared by the codec and the daemon.

/// Interface type carried in the first byte of every frame.
///
/// This byte is also the framing marker: it is not counted by the QMUX length.
pub const QMUX_IF_TYPE: u8 = 0x01;

/// Bytes preceding the QMUX length count (the interface-type marker).
pub const FRAME_MARKER_SIZE: usize = 1;

/// Default upper bound on a complete frame, marker included.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 2048;

/// Client id the device uses for indications broadcast to every client.
pub const BROADCAST_CLIENT_ID: u8 = 0xFF;

/// Control flags for daemon-originated requests.
pub const REQUEST_CONTROL_FLAGS: u8 = 0x00;
