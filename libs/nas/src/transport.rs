//! Frame transport
//!
//! The device descriptor lifecycle is owned by the caller; the session only
//! needs a blocking "write this frame" primitive.

use qmi_codec::decode_header;
use std::io::{self, Write};
use tracing::trace;

/// Blocking write of one complete frame
pub trait Transport {
    /// Returns the number of bytes written
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<usize> {
        (**self).write_frame(frame)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<usize> {
        (**self).write_frame(frame)
    }
}

/// Writes frames to a character device (or any `Write`)
///
/// Exactly `length + 1` bytes go out: the declared QMUX length plus the
/// interface-type marker it does not count.
#[derive(Debug)]
pub struct DeviceTransport<W> {
    writer: W,
}

impl<W: Write> DeviceTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for DeviceTransport<W> {
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<usize> {
        let header =
            decode_header(frame).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let len = header.frame_len();
        let bytes = frame.get(..len).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame declares {len} bytes, buffer has {}", frame.len()),
            )
        })?;

        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        trace!(len, "frame written");
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmi_codec::MessageBuilder;
    use qmi_types::ServiceType;

    fn frame() -> Vec<u8> {
        MessageBuilder::new(64, ServiceType::Nas, 1, 1, 0x0003)
            .and_then(|b| b.add_tlv(0x18, &[0x01]))
            .map(MessageBuilder::build)
            .unwrap()
    }

    #[test]
    fn test_writes_declared_length_plus_marker() {
        let frame = frame();
        let declared = usize::from(u16::from_le_bytes([frame[1], frame[2]]));

        let mut transport = DeviceTransport::new(Vec::new());
        let written = transport.write_frame(&frame).unwrap();

        assert_eq!(written, declared + 1);
        assert_eq!(transport.get_ref().as_slice(), frame.as_slice());
    }

    #[test]
    fn test_ignores_bytes_past_the_frame() {
        let mut padded = frame();
        let len = padded.len();
        padded.extend_from_slice(&[0xEE; 8]);

        let mut transport = DeviceTransport::new(Vec::new());
        assert_eq!(transport.write_frame(&padded).unwrap(), len);
        assert_eq!(transport.into_inner().len(), len);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let frame = frame();
        let mut transport = DeviceTransport::new(Vec::new());
        let err = transport.write_frame(&frame[..frame.len() - 1]).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(transport.get_ref().is_empty());
    }
}
