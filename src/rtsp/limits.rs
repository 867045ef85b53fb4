//! Read-side size limits

/// Default maximum length of a single line, terminator included
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Default maximum number of header lines per message
pub const DEFAULT_MAX_HEADERS: usize = 255;

/// Default maximum body size: 128 KiB.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 128 * 1024;

/// Limits applied while reading a message.
///
/// They bound memory use against a misbehaving peer; writing is never
/// limited except by the 16-bit interleaved frame length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum bytes in one line, including the CRLF.
    pub max_line_length: usize,
    /// Maximum number of header lines (repeated keys count once per line).
    pub max_headers: usize,
    /// Maximum accepted `Content-Length`.
    pub max_content_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_headers: DEFAULT_MAX_HEADERS,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl Limits {
    /// Limits large enough to never trigger in practice.
    pub fn unbounded() -> Self {
        Self {
            max_line_length: usize::MAX,
            max_headers: usize::MAX,
            max_content_length: usize::MAX,
        }
    }
}
