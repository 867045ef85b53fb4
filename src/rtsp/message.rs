//! RTSP message types
//!
//! This module defines requests and responses. Both carry the same header
//! and body machinery; only the first line differs, which is what
//! [`WireMessage`] abstracts.

use super::headers::parse_decimal;
use super::parser;
use super::{Error, Header, Limits, Result, StatusCode, CRLF, RTSP_VERSION};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// A message that can travel on an RTSP control connection
///
/// Implementors describe their first line; the shared reader and writer in
/// [`parser`] handle headers and body.
pub trait WireMessage {
    /// Parse the first line (without its CRLF) into this message
    fn parse_first_line(&mut self, line: &str) -> Result<()>;

    /// Append the first line, CRLF included
    fn write_first_line(&self, buf: &mut BytesMut);

    fn header(&self) -> &Header;

    fn header_mut(&mut self) -> &mut Header;

    fn body(&self) -> &[u8];

    fn set_body(&mut self, body: Bytes);

    /// Drop all content so the value can be read into again
    fn reset(&mut self);
}

/// RTSP methods (RFC 2326 Section 10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    Announce,
    Describe,
    GetParameter,
    #[default]
    Options,
    Pause,
    Play,
    Record,
    Redirect,
    Setup,
    SetParameter,
    Teardown,
}

impl Method {
    /// Convert method to its wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Announce => "ANNOUNCE",
            Method::Describe => "DESCRIBE",
            Method::GetParameter => "GET_PARAMETER",
            Method::Options => "OPTIONS",
            Method::Pause => "PAUSE",
            Method::Play => "PLAY",
            Method::Record => "RECORD",
            Method::Redirect => "REDIRECT",
            Method::Setup => "SETUP",
            Method::SetParameter => "SET_PARAMETER",
            Method::Teardown => "TEARDOWN",
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ANNOUNCE" => Ok(Method::Announce),
            "DESCRIBE" => Ok(Method::Describe),
            "GET_PARAMETER" => Ok(Method::GetParameter),
            "OPTIONS" => Ok(Method::Options),
            "PAUSE" => Ok(Method::Pause),
            "PLAY" => Ok(Method::Play),
            "RECORD" => Ok(Method::Record),
            "REDIRECT" => Ok(Method::Redirect),
            "SETUP" => Ok(Method::Setup),
            "SET_PARAMETER" => Ok(Method::SetParameter),
            "TEARDOWN" => Ok(Method::Teardown),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn check_version(token: &str) -> Result<()> {
    if token == RTSP_VERSION {
        Ok(())
    } else {
        Err(Error::ProtocolMismatch(token.to_string()))
    }
}

/// Parse RTSP request line
///
/// Format: METHOD URL VERSION
/// Example: DESCRIBE rtsp://example.com/media.mp4 RTSP/1.0
pub fn parse_request_line(line: &str) -> Result<(Method, String)> {
    let mut parts = line.splitn(3, ' ');

    let method = parts.next().unwrap_or_default();
    if method.is_empty() {
        return Err(Error::InvalidMethod(String::new()));
    }
    let method = method.parse::<Method>()?;

    let url = parts.next().ok_or(Error::Truncated)?;
    if url.is_empty() {
        return Err(Error::InvalidUrl(String::new()));
    }

    let version = parts.next().ok_or(Error::Truncated)?;
    check_version(version)?;

    Ok((method, url.to_string()))
}

/// Parse RTSP response status line
///
/// Format: VERSION CODE MESSAGE
/// Example: RTSP/1.0 200 OK
///
/// The message is everything after the second space and may be empty.
pub fn parse_status_line(line: &str) -> Result<(StatusCode, String)> {
    let mut parts = line.splitn(3, ' ');

    check_version(parts.next().unwrap_or_default())?;

    let code = parts.next().ok_or(Error::Truncated)?;
    let code = parse_decimal(code)
        .and_then(|c| u16::try_from(c).ok())
        .ok_or_else(|| Error::InvalidStatusCode(code.to_string()))?;

    let message = parts.next().unwrap_or_default();

    Ok((StatusCode(code), message.to_string()))
}

/// RTSP request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request target, usually an `rtsp://` URL or `*`
    pub url: String,
    pub header: Header,
    pub body: Bytes,
}

impl Request {
    /// Create a new request without headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Request {
            method,
            url: url.into(),
            header: Header::new(),
            body: Bytes::new(),
        }
    }

    /// Create a builder for constructing requests
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Read a request, failing on anything that is not one
    pub fn read<R: BufRead>(&mut self, reader: &mut R) -> Result<()> {
        parser::read_message(reader, self)
    }

    /// Like [`Request::read`] with explicit limits
    pub fn read_with_limits<R: BufRead>(
        &mut self,
        reader: &mut R,
        limits: &Limits,
    ) -> Result<()> {
        parser::read_message_with_limits(reader, self, limits)
    }

    /// Read a request, discarding interleaved frames in front of it
    pub fn read_ignore_frames<R: BufRead>(
        &mut self,
        reader: &mut R,
        scratch: &mut [u8],
    ) -> Result<()> {
        parser::read_message_skipping_frames(reader, self, scratch)
    }

    /// Serialize and flush the request
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        parser::write_message(writer, self)
    }

    /// Convert the request to wire format
    pub fn to_wire(&self) -> Bytes {
        parser::encode_message(self)
    }
}

impl WireMessage for Request {
    fn parse_first_line(&mut self, line: &str) -> Result<()> {
        let (method, url) = parse_request_line(line)?;
        self.method = method;
        self.url = url;
        Ok(())
    }

    fn write_first_line(&self, buf: &mut BytesMut) {
        buf.put_slice(self.method.as_str().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.url.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(RTSP_VERSION.as_bytes());
        buf.put_slice(CRLF.as_bytes());
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn set_body(&mut self, body: Bytes) {
        self.body = body;
    }

    fn reset(&mut self) {
        *self = Request::default();
    }
}

/// Builder for RTSP requests
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    url: Option<String>,
    header: Header,
    body: Bytes,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add a header (repeated names accumulate)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(name, value);
        self
    }

    /// Set the body; `Content-Length` is left to the caller
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method.unwrap_or_default(),
            url: self.url.unwrap_or_else(|| "*".to_string()),
            header: self.header,
            body: self.body,
        }
    }
}

/// RTSP response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status_code: StatusCode,
    /// Reason phrase; when empty, the canonical phrase is written instead
    pub status_message: String,
    pub header: Header,
    pub body: Bytes,
}

impl Response {
    /// Create a new response with an empty status message
    pub fn new(status_code: StatusCode) -> Self {
        Response {
            status_code,
            ..Response::default()
        }
    }

    /// Create a builder for constructing responses
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// Read a response, failing on anything that is not one
    pub fn read<R: BufRead>(&mut self, reader: &mut R) -> Result<()> {
        parser::read_message(reader, self)
    }

    /// Like [`Response::read`] with explicit limits
    pub fn read_with_limits<R: BufRead>(
        &mut self,
        reader: &mut R,
        limits: &Limits,
    ) -> Result<()> {
        parser::read_message_with_limits(reader, self, limits)
    }

    /// Read a response, discarding interleaved frames in front of it
    ///
    /// `scratch` may be any non-empty size; frame payloads larger than it
    /// are discarded in several passes.
    pub fn read_ignore_frames<R: BufRead>(
        &mut self,
        reader: &mut R,
        scratch: &mut [u8],
    ) -> Result<()> {
        parser::read_message_skipping_frames(reader, self, scratch)
    }

    /// Serialize and flush the response
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        parser::write_message(writer, self)
    }

    /// Convert the response to wire format
    pub fn to_wire(&self) -> Bytes {
        parser::encode_message(self)
    }

    /// Status message as it goes on the wire
    pub fn effective_status_message(&self) -> &str {
        if self.status_message.is_empty() {
            self.status_code.canonical_reason().unwrap_or_default()
        } else {
            &self.status_message
        }
    }
}

impl WireMessage for Response {
    fn parse_first_line(&mut self, line: &str) -> Result<()> {
        let (status_code, status_message) = parse_status_line(line)?;
        self.status_code = status_code;
        self.status_message = status_message;
        Ok(())
    }

    fn write_first_line(&self, buf: &mut BytesMut) {
        buf.put_slice(RTSP_VERSION.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.status_code.0.to_string().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.effective_status_message().as_bytes());
        buf.put_slice(CRLF.as_bytes());
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn set_body(&mut self, body: Bytes) {
        self.body = body;
    }

    fn reset(&mut self) {
        *self = Response::default();
    }
}

/// Builder for RTSP responses
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    status_code: Option<StatusCode>,
    status_message: String,
    header: Header,
    body: Bytes,
}

impl ResponseBuilder {
    pub fn status(mut self, status_code: StatusCode) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.status_message = message.into();
        self
    }

    /// Add a header (repeated names accumulate)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(name, value);
        self
    }

    /// Set the body; `Content-Length` is left to the caller
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status_code: self.status_code.unwrap_or(StatusCode::OK),
            status_message: self.status_message,
            header: self.header,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!("DESCRIBE".parse::<Method>().unwrap(), Method::Describe);
        assert_eq!(
            "GET_PARAMETER".parse::<Method>().unwrap(),
            Method::GetParameter
        );
        assert!(matches!(
            "describe".parse::<Method>(),
            Err(Error::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_default_request_is_options() {
        assert_eq!(Method::default(), Method::Options);
        assert_eq!(Request::default().method, Method::Options);
    }

    #[test]
    fn test_parse_status_line() {
        let (code, message) = parse_status_line("RTSP/1.0 200 OK").unwrap();
        assert_eq!(code, StatusCode::OK);
        assert_eq!(message, "OK");

        let (code, message) = parse_status_line("RTSP/1.0 454 Session Not Found").unwrap();
        assert_eq!(code.code(), 454);
        assert_eq!(message, "Session Not Found");

        // Empty message is legal
        let (_, message) = parse_status_line("RTSP/1.0 200 ").unwrap();
        assert_eq!(message, "");
        let (_, message) = parse_status_line("RTSP/1.0 200").unwrap();
        assert_eq!(message, "");
    }

    #[test]
    fn test_parse_status_line_errors() {
        assert!(matches!(
            parse_status_line("RTSP/2.0 200 OK"),
            Err(Error::ProtocolMismatch(v)) if v == "RTSP/2.0"
        ));
        assert!(matches!(
            parse_status_line("HTTP/1.1 200 OK"),
            Err(Error::ProtocolMismatch(_))
        ));
        assert!(matches!(
            parse_status_line("RTSP/1.0 string OK"),
            Err(Error::InvalidStatusCode(_))
        ));
        assert!(matches!(
            parse_status_line("RTSP/1.0 +200 OK"),
            Err(Error::InvalidStatusCode(_))
        ));
        assert!(matches!(
            parse_status_line("RTSP/1.0 70000 OK"),
            Err(Error::InvalidStatusCode(_))
        ));
        assert!(matches!(parse_status_line("RTSP/1.0"), Err(Error::Truncated)));
        assert!(matches!(parse_status_line(""), Err(Error::ProtocolMismatch(_))));
    }

    #[test]
    fn test_parse_request_line() {
        let (method, url) =
            parse_request_line("DESCRIBE rtsp://example.com/media.mp4 RTSP/1.0").unwrap();
        assert_eq!(method, Method::Describe);
        assert_eq!(url, "rtsp://example.com/media.mp4");

        let (method, url) = parse_request_line("OPTIONS * RTSP/1.0").unwrap();
        assert_eq!(method, Method::Options);
        assert_eq!(url, "*");
    }

    #[test]
    fn test_parse_request_line_errors() {
        assert!(matches!(
            parse_request_line("FETCH rtsp://host/ RTSP/1.0"),
            Err(Error::InvalidMethod(_))
        ));
        assert!(matches!(
            parse_request_line(" rtsp://host/ RTSP/1.0"),
            Err(Error::InvalidMethod(_))
        ));
        assert!(matches!(
            parse_request_line("PLAY  RTSP/1.0"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_request_line("PLAY rtsp://host/"),
            Err(Error::Truncated)
        ));
        assert!(matches!(
            parse_request_line("PLAY rtsp://host/ RTSP/2.0"),
            Err(Error::ProtocolMismatch(_))
        ));
    }

    #[test]
    fn test_response_builder() {
        let res = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("CSeq", "4")
            .build();

        assert_eq!(res.status_code, StatusCode::NOT_FOUND);
        assert_eq!(res.status_message, "");
        assert_eq!(res.effective_status_message(), "Not Found");
        assert_eq!(res.header.get("CSeq"), Some("4"));
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_request_to_wire() {
        let req = Request::builder()
            .method(Method::Setup)
            .url("rtsp://example.com/media.mp4/trackID=0")
            .header("Transport", "RTP/AVP/TCP;unicast;interleaved=0-1")
            .header("CSeq", "3")
            .build();

        assert_eq!(
            &req.to_wire()[..],
            &b"SETUP rtsp://example.com/media.mp4/trackID=0 RTSP/1.0\r\n\
               CSeq: 3\r\n\
               Transport: RTP/AVP/TCP;unicast;interleaved=0-1\r\n\
               \r\n"[..]
        );
    }

    #[test]
    fn test_response_to_wire_unknown_code() {
        let res = Response::new(StatusCode(299));
        assert_eq!(&res.to_wire()[..], b"RTSP/1.0 299 \r\n\r\n");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut res = Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .message("Unauthorized")
            .header("WWW-Authenticate", "Basic realm=\"x\"")
            .body(&b"abc"[..])
            .build();
        res.reset();
        assert_eq!(res, Response::default());
    }
}
