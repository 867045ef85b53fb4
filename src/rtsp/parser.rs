//! RTSP message reading and writing
//!
//! Reading works on any `BufRead`: the first line, then header lines up to
//! a blank line, then exactly `Content-Length` bytes of body. Nothing past
//! the body is consumed, so the next message (or interleaved frame) is
//! left in the reader.
//!
//! Writing encodes the whole message first and then writes and flushes it
//! in one go.

use super::interleaved::skip_frames;
use super::{Error, Header, Limits, Result, WireMessage, CRLF};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{BufRead, Read, Write};
use tracing::{debug, trace};

/// Read one CRLF-terminated line, without the terminator
///
/// The bytes are returned as received. A line cut off by end of stream is
/// `Truncated`; a line that reaches `limit` bytes without a LF is
/// `LineTooLong`.
pub fn read_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(limit as u64)
        .read_until(b'\n', &mut buf)?;

    if buf.last() != Some(&b'\n') {
        if read < limit || reader.fill_buf()?.is_empty() {
            return Err(Error::Truncated);
        }
        return Err(Error::LineTooLong { limit });
    }
    buf.pop();

    if buf.last() != Some(&b'\r') {
        return Err(Error::InvalidLineEnding);
    }
    buf.pop();

    Ok(buf)
}

/// Read header lines up to and including the blank line
pub fn read_headers<R: BufRead>(
    reader: &mut R,
    header: &mut Header,
    limits: &Limits,
) -> Result<()> {
    let mut count = 0;

    loop {
        let line = read_line(reader, limits.max_line_length)?;
        if line.is_empty() {
            // Empty line marks end of headers
            return Ok(());
        }

        if count >= limits.max_headers {
            return Err(Error::TooManyHeaders {
                limit: limits.max_headers,
            });
        }

        let line = String::from_utf8(line).map_err(|err| {
            Error::MalformedHeader(format!(
                "header line is not UTF-8: {:?}",
                String::from_utf8_lossy(err.as_bytes())
            ))
        })?;
        let (name, value) = Header::parse_header_line(&line)?;
        header.insert(name, value);
        count += 1;
    }
}

/// Read the body announced by `Content-Length`, or nothing if absent
pub fn read_body<R: Read>(reader: &mut R, header: &Header, limits: &Limits) -> Result<Bytes> {
    let content_length = match header.content_length()? {
        Some(len) => len,
        None => return Ok(Bytes::new()),
    };

    if content_length > limits.max_content_length {
        return Err(Error::ContentTooLarge {
            size: content_length,
            limit: limits.max_content_length,
        });
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    Ok(Bytes::from(body))
}

/// Read the next message, failing on anything that is not one
///
/// `message` is reset first, so nothing of its previous content survives,
/// on success or on error.
pub fn read_message<R, M>(reader: &mut R, message: &mut M) -> Result<()>
where
    R: BufRead,
    M: WireMessage,
{
    read_message_with_limits(reader, message, &Limits::default())
}

/// Like [`read_message`] with explicit limits
pub fn read_message_with_limits<R, M>(
    reader: &mut R,
    message: &mut M,
    limits: &Limits,
) -> Result<()>
where
    R: BufRead,
    M: WireMessage,
{
    message.reset();

    let result = read_parts(reader, message, limits);
    if let Err(err) = &result {
        debug!(error = %err, "rejected rtsp message");
    }
    result
}

fn read_parts<R, M>(reader: &mut R, message: &mut M, limits: &Limits) -> Result<()>
where
    R: BufRead,
    M: WireMessage,
{
    let first_line = read_line(reader, limits.max_line_length)?;
    let first_line = String::from_utf8(first_line).map_err(|err| {
        Error::InvalidStartLine(String::from_utf8_lossy(err.as_bytes()).into_owned())
    })?;
    message.parse_first_line(&first_line)?;

    read_headers(reader, message.header_mut(), limits)?;

    let body = read_body(reader, message.header(), limits)?;
    message.set_body(body);

    trace!(
        first_line = %first_line,
        headers = message.header().line_count(),
        body_len = message.body().len(),
        "read rtsp message"
    );
    Ok(())
}

/// Read the next message, discarding any interleaved frames before it
///
/// `scratch` is used to discard frame payloads and may be of any non-empty
/// size.
pub fn read_message_skipping_frames<R, M>(
    reader: &mut R,
    message: &mut M,
    scratch: &mut [u8],
) -> Result<()>
where
    R: BufRead,
    M: WireMessage,
{
    skip_frames(reader, scratch)?;
    read_message(reader, message)
}

/// Encode a message into wire format
///
/// Headers are emitted in ascending name order, one line per value. The
/// body is appended verbatim; `Content-Length` is not computed.
pub fn encode_message<M: WireMessage>(message: &M) -> Bytes {
    let header = message.header();
    let body = message.body();

    let mut buf = BytesMut::with_capacity(128 + header.line_count() * 32 + body.len());
    message.write_first_line(&mut buf);
    header.write_to(&mut buf);
    buf.put_slice(CRLF.as_bytes());
    buf.put_slice(body);
    buf.freeze()
}

/// Write a message and flush the writer
pub fn write_message<W, M>(writer: &mut W, message: &M) -> Result<()>
where
    W: Write,
    M: WireMessage,
{
    let wire = encode_message(message);
    writer.write_all(&wire).map_err(Error::Io)?;
    writer.flush().map_err(Error::Io)?;

    trace!(
        bytes = wire.len(),
        headers = message.header().line_count(),
        body_len = message.body().len(),
        "wrote rtsp message"
    );
    Ok(())
}
