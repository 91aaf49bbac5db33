//! HTTP/1.1 message types and the wire codec shared by both transports.
//!
//! # Design
//! `HttpRequest` and `HttpResponse` are plain owned data. Serialization and
//! parsing are free functions over `Write` / `Read` so the plaintext and TLS
//! transports run exactly the same code, and unit tests can drive the codec
//! with in-memory cursors.
//!
//! The response head is parsed with `httparse`. The body is framed by, in
//! order of precedence: the status code (1xx, 204 and 304 carry no body),
//! `Transfer-Encoding: chunked`, `Content-Length`, and finally connection
//! close. Only the head is size-limited; the body is read in full.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};

use crate::config::{MAX_HEADERS, MAX_HEAD_SIZE};
use crate::error::{Error, Result};

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request target in origin form, e.g. `/index.html?x=1`.
    pub target: String,
    /// Header fields in the order they are sent.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            headers: Vec::new(),
        }
    }

    /// Append a header field.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Serialize the request head. GET requests have no body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        out.extend_from_slice(b"GET ");
        out.extend_from_slice(self.target.as_bytes());
        out.extend_from_slice(b" HTTP/1.1\r\n");
        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        out
    }
}

/// A complete HTTP response: status line, headers and the full body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Minor version from the status line (`1` for HTTP/1.1).
    pub version: u8,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// First value of `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Write the status line, the headers and the body bytes unchanged.
    ///
    /// The body is the decoded payload, so a `Transfer-Encoding: chunked`
    /// header is printed above a body that no longer carries chunk framing.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "HTTP/1.{} {} {}\r\n", self.version, self.status, self.reason)?;
        for (name, value) in &self.headers {
            write!(out, "{name}: {value}\r\n")?;
        }
        out.write_all(b"\r\n")?;
        out.write_all(&self.body)
    }
}

/// Status line, headers and the body as lossy UTF-8. Meant for logs and
/// text bodies; use [`HttpResponse::write_to`] to emit the exact bytes.
impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/1.{} {} {}\r\n", self.version, self.status, self.reason)?;
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        write!(f, "\r\n{}", self.body_text())
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Send `request` and flush.
pub fn write_request<W: Write>(writer: &mut W, request: &HttpRequest) -> io::Result<()> {
    writer.write_all(&request.to_bytes())?;
    writer.flush()
}

/// Read exactly one response from `reader`.
///
/// Blocks until the whole body has arrived; there is no timeout.
pub fn read_response<R: Read>(reader: R) -> Result<HttpResponse> {
    let mut reader = BufReader::new(reader);
    let head = read_head(&mut reader)?;

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Response::new(&mut headers);
    match parsed.parse(&head) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) => return Err(Error::malformed("incomplete response head")),
        Err(e) => return Err(Error::malformed(e.to_string())),
    }

    let mut response = HttpResponse {
        version: parsed.version.unwrap_or(1),
        status: parsed.code.unwrap_or_default(),
        reason: parsed.reason.unwrap_or_default().to_string(),
        headers: parsed
            .headers
            .iter()
            .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).into_owned()))
            .collect(),
        body: Vec::new(),
    };

    response.body = match body_framing(&response)? {
        Framing::Empty => Vec::new(),
        Framing::Chunked => read_chunked(&mut reader)?,
        Framing::Length(len) => read_sized(&mut reader, len)?,
        Framing::UntilClose => read_until_close(&mut reader)?,
    };

    Ok(response)
}

#[derive(Debug, PartialEq, Eq)]
enum Framing {
    Empty,
    Chunked,
    Length(usize),
    UntilClose,
}

fn body_framing(response: &HttpResponse) -> Result<Framing> {
    if (100..200).contains(&response.status) || response.status == 204 || response.status == 304 {
        return Ok(Framing::Empty);
    }

    if let Some(encoding) = response.header("transfer-encoding") {
        let last = encoding.rsplit(',').next().unwrap_or_default().trim();
        if last.eq_ignore_ascii_case("chunked") {
            return Ok(Framing::Chunked);
        }
        return Ok(Framing::UntilClose);
    }

    match response.header("content-length") {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map(Framing::Length)
            .map_err(|_| Error::malformed(format!("invalid Content-Length: {value:?}"))),
        None => Ok(Framing::UntilClose),
    }
}

/// Collect bytes up to and including the blank line that ends the head.
fn read_head<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(1024);
    loop {
        let remaining = MAX_HEAD_SIZE.saturating_sub(head.len());
        if remaining == 0 {
            return Err(Error::malformed(format!(
                "response head exceeds {MAX_HEAD_SIZE} bytes"
            )));
        }

        let start = head.len();
        let n = reader
            .by_ref()
            .take(remaining as u64)
            .read_until(b'\n', &mut head)
            .map_err(Error::Read)?;
        if n == 0 {
            let what = if head.is_empty() {
                "connection closed before a response was received"
            } else {
                "connection closed inside the response head"
            };
            return Err(Error::malformed(what));
        }

        let line = &head[start..];
        if start > 0 && (line == b"\r\n" || line == b"\n") {
            return Ok(head);
        }
    }
}

fn read_sized<R: BufRead>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(len.min(MAX_HEAD_SIZE));
    let n = reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut body)
        .map_err(Error::Read)?;
    if n < len {
        return Err(Error::malformed(format!(
            "body truncated: expected {len} bytes, got {n}"
        )));
    }
    Ok(body)
}

fn read_until_close<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    match reader.read_to_end(&mut body) {
        Ok(_) => Ok(body),
        // TLS peers often drop the socket without close_notify.
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(body),
        Err(e) => Err(Error::Read(e)),
    }
}

fn read_chunked<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(Error::Read)? == 0 {
            return Err(Error::malformed("connection closed inside chunked body"));
        }

        let text = String::from_utf8_lossy(&line);
        let size_field = text.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| Error::malformed(format!("invalid chunk size: {size_field:?}")))?;

        if size == 0 {
            skip_trailers(reader)?;
            return Ok(body);
        }

        let chunk = read_sized(reader, size)?;
        body.extend_from_slice(&chunk);

        line.clear();
        reader.read_until(b'\n', &mut line).map_err(Error::Read)?;
        if line != b"\r\n" && line != b"\n" {
            return Err(Error::malformed("missing CRLF after chunk data"));
        }
    }
}

fn skip_trailers<R: BufRead>(reader: &mut R) -> Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).map_err(Error::Read)?;
        if n == 0 || line == b"\r\n" || line == b"\n" {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(raw: &str) -> Result<HttpResponse> {
        read_response(Cursor::new(raw.as_bytes().to_vec()))
    }

    #[test]
    fn request_serializes_in_header_order() {
        let req = HttpRequest::get("/a?b=1")
            .header("Host", "example.com")
            .header("User-Agent", "Richard-Agent");
        assert_eq!(
            req.to_bytes(),
            b"GET /a?b=1 HTTP/1.1\r\nHost: example.com\r\nUser-Agent: Richard-Agent\r\n\r\n"
        );
        assert_eq!(req.header_value("user-agent"), Some("Richard-Agent"));
    }

    #[test]
    fn content_length_body() {
        let res = parse("HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello").unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.reason, "OK");
        assert_eq!(res.version, 1);
        assert_eq!(res.body, b"hello");
        assert_eq!(res.header("content-length"), Some("5"));
    }

    #[test]
    fn content_length_ignores_trailing_bytes() {
        let res = parse("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhiEXTRA").unwrap();
        assert_eq!(res.body, b"hi");
    }

    #[test]
    fn chunked_body_is_reassembled() {
        let raw = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
                   5\r\nhello\r\n7;ext=1\r\n, world\r\n0\r\nX-Trailer: t\r\n\r\n";
        let res = parse(raw).unwrap();
        assert_eq!(res.body_text(), "hello, world");
    }

    #[test]
    fn body_until_close() {
        let res = parse("HTTP/1.0 200 OK\r\nServer: x\r\n\r\nall of it").unwrap();
        assert_eq!(res.version, 0);
        assert_eq!(res.body, b"all of it");
    }

    #[test]
    fn no_body_statuses() {
        let res = parse("HTTP/1.1 204 No Content\r\nContent-Length: 10\r\n\r\n").unwrap();
        assert!(res.body.is_empty());
        let res = parse("HTTP/1.1 304 Not Modified\r\n\r\nignored").unwrap();
        assert!(res.body.is_empty());
    }

    #[test]
    fn truncated_body_is_malformed() {
        let err = parse("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn garbage_status_line_is_malformed() {
        let err = parse("SSH-2.0-OpenSSH_9.0\r\n\r\n").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn empty_stream_is_malformed() {
        let err = parse("").unwrap_err();
        assert!(err.to_string().contains("before a response"));
    }

    #[test]
    fn bad_chunk_size_is_malformed() {
        let err = parse("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn bad_content_length_is_malformed() {
        let err = parse("HTTP/1.1 200 OK\r\nContent-Length: lots\r\n\r\n").unwrap_err();
        assert!(err.to_string().contains("Content-Length"));
    }

    #[test]
    fn oversized_head_is_rejected() {
        let raw = format!("HTTP/1.1 200 OK\r\nX-Big: {}\r\n\r\n", "a".repeat(MAX_HEAD_SIZE));
        let err = parse(&raw).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn write_to_keeps_binary_body() {
        let mut raw = b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\n".to_vec();
        raw.extend_from_slice(&[0xff, 0xfe, 0x00]);
        let res = read_response(Cursor::new(raw.clone())).unwrap();
        assert_eq!(res.body, [0xffu8, 0xfe, 0x00]);

        let mut out = Vec::new();
        res.write_to(&mut out).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn write_to_emits_dechunked_body() {
        let raw = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n";
        let res = parse(raw).unwrap();

        let mut out = Vec::new();
        res.write_to(&mut out).unwrap();
        assert_eq!(out, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nabc");
    }

    #[test]
    fn display_matches_wire_form() {
        let res = parse("HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello").unwrap();
        assert_eq!(
            res.to_string(),
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello"
        );
    }
}
