//! RTSP/1.0 message layer
//!
//! This module reads and writes RTSP requests and responses over a single
//! byte stream that may also carry interleaved binary frames (RTP/RTCP
//! tunneled over the control connection, RFC 2326 Section 10.12).
//!
//! # Architecture
//!
//! - `Header` stores header lines as key -> ordered values
//! - `Request` and `Response` implement `WireMessage`, which supplies the
//!   first-line grammar; header and body handling is shared in `parser`
//! - `interleaved` recognizes `$`-prefixed frames and either skips them or
//!   hands them to the caller
//!
//! # Examples
//!
//! ```
//! use rtsp_wire::rtsp::{Response, StatusCode};
//! use std::io::BufReader;
//!
//! let wire = b"RTSP/1.0 200 OK\r\nCSeq: 1\r\n\r\n";
//! let mut response = Response::default();
//! response.read(&mut BufReader::new(&wire[..])).unwrap();
//! assert_eq!(response.status_code, StatusCode::OK);
//! assert_eq!(response.header.get("CSeq"), Some("1"));
//! ```

pub mod headers;
pub mod interleaved;
pub mod limits;
pub mod message;
pub mod parser;
pub mod status;

pub use headers::Header;
pub use interleaved::{read_frame_or_message, skip_frames, Incoming, InterleavedFrame};
pub use limits::Limits;
pub use message::{Method, Request, Response, WireMessage};
pub use parser::{
    encode_message, read_message, read_message_skipping_frames, read_message_with_limits,
    write_message,
};
pub use status::StatusCode;

use std::io;

/// Result type for RTSP operations
pub type Result<T> = std::result::Result<T, Error>;

/// RTSP message layer errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stream ended before a line, token or byte count was complete
    #[error("Truncated input")]
    Truncated,

    #[error("Protocol mismatch: {0}")]
    ProtocolMismatch(String),

    #[error("Invalid status code: {0}")]
    InvalidStatusCode(String),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// The request or status line is not valid UTF-8
    #[error("Invalid start line: {0:?}")]
    InvalidStartLine(String),

    #[error("Invalid RTSP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A line ended with a bare LF
    #[error("Invalid line ending (expected CRLF)")]
    InvalidLineEnding,

    #[error("Line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Too many headers (max {limit})")]
    TooManyHeaders { limit: usize },

    #[error("Content-Length {size} exceeds limit {limit}")]
    ContentTooLarge { size: usize, limit: usize },

    #[error("Invalid interleaved frame marker: 0x{0:02x}")]
    InvalidFrameMarker(u8),

    #[error("Interleaved payload too large ({size} bytes)")]
    PayloadTooLarge { size: usize },

    #[error("Scratch buffer must not be empty")]
    EmptyScratchBuffer,

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl Error {
    /// True if the stream ran out before the message was complete
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::Truncated
        } else {
            Error::Io(err)
        }
    }
}

/// The only protocol version this layer speaks
pub const RTSP_VERSION: &str = "RTSP/1.0";

/// CRLF line ending
pub const CRLF: &str = "\r\n";

/// Leading byte of an interleaved binary frame (`$`)
pub const INTERLEAVED_MARKER: u8 = 0x24;
