//! Interleaved binary frames (RFC 2326 Section 10.12)
//!
//! RTP and RTCP packets can be tunneled over the RTSP control connection.
//! Each one is framed as:
//!
//! ```text
//! ┌────────────┬────────────┬──────────────┬──────────────────┐
//! │ Marker (1B)│ Channel    │ Length       │ Payload          │
//! │ 0x24 '$'   │ (1B)       │ (2B BE)      │ (Length bytes)   │
//! └────────────┴────────────┴──────────────┴──────────────────┘
//! ```
//!
//! This layer never looks inside the payload.

use super::parser::read_message;
use super::{Error, Result, WireMessage, INTERLEAVED_MARKER};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{self, BufRead, Read, Write};
use tracing::trace;

/// Frame header: marker (1) + channel (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// An interleaved frame with its channel id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedFrame {
    pub channel: u8,
    pub payload: Bytes,
}

impl InterleavedFrame {
    pub fn new(channel: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            channel,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Read one frame; the next byte must be the `$` marker.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if header[0] != INTERLEAVED_MARKER {
            return Err(Error::InvalidFrameMarker(header[0]));
        }

        let channel = header[1];
        let len = u16::from_be_bytes([header[2], header[3]]) as usize;

        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload)?;

        Ok(Self {
            channel,
            payload: Bytes::from(payload),
        })
    }

    /// Encode the frame into the wire format.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        if self.payload.len() > MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge {
                size: self.payload.len(),
            });
        }
        dst.reserve(self.wire_size());
        dst.put_u8(INTERLEAVED_MARKER);
        dst.put_u8(self.channel);
        dst.put_u16(self.payload.len() as u16);
        dst.put_slice(&self.payload);
        Ok(())
    }

    /// Write the frame and flush the writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        writer.write_all(&buf).map_err(Error::Io)?;
        writer.flush().map_err(Error::Io)?;
        Ok(())
    }
}

/// Either an interleaved frame or a message, whichever came next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming<M> {
    Frame(InterleavedFrame),
    Message(M),
}

/// Look at the next byte without consuming it; `None` at end of stream.
fn peek_byte<R: BufRead>(reader: &mut R) -> Result<Option<u8>> {
    loop {
        match reader.fill_buf() {
            Ok(buf) => return Ok(buf.first().copied()),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::Io(err)),
        }
    }
}

/// Consume one frame, discarding its payload through `scratch`.
fn skip_frame<R: Read>(reader: &mut R, scratch: &mut [u8]) -> Result<()> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let channel = header[1];
    let mut remaining = u16::from_be_bytes([header[2], header[3]]) as usize;
    trace!(channel, len = remaining, "skipping interleaved frame");

    if remaining > 0 && scratch.is_empty() {
        return Err(Error::EmptyScratchBuffer);
    }

    while remaining > 0 {
        let n = remaining.min(scratch.len());
        reader.read_exact(&mut scratch[..n])?;
        remaining -= n;
    }
    Ok(())
}

/// Discard interleaved frames until the next byte is not a frame marker.
///
/// Returns at end of stream too; the following message read reports the
/// truncation.
pub fn skip_frames<R: BufRead>(reader: &mut R, scratch: &mut [u8]) -> Result<()> {
    while peek_byte(reader)? == Some(INTERLEAVED_MARKER) {
        skip_frame(reader, scratch)?;
    }
    Ok(())
}

/// Read the next frame or message without discarding anything.
pub fn read_frame_or_message<R, M>(reader: &mut R) -> Result<Incoming<M>>
where
    R: BufRead,
    M: WireMessage + Default,
{
    if peek_byte(reader)? == Some(INTERLEAVED_MARKER) {
        return InterleavedFrame::read(reader).map(Incoming::Frame);
    }

    let mut message = M::default();
    read_message(reader, &mut message)?;
    Ok(Incoming::Message(message))
}
