//! Plaintext and TLS channels behind one connect/write/read/close contract.
//!
//! # Design
//! A transport owns exactly one socket (or one TLS session over one socket)
//! for the lifetime of one request. `close` takes the socket out of the
//! transport, so a second `close` is a no-op and any later `write`/`read`
//! reports `Error::NotConnected`. If a transport is dropped while still
//! connected, for example because `write` failed, `Drop` performs the same
//! graceful shutdown and logs a failure instead of returning it.

use std::fmt;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, StreamOwned};

use crate::error::{Error, Result};
use crate::http::{self, HttpRequest, HttpResponse};

/// A single-use channel that carries one HTTP exchange.
pub trait Transport {
    /// Connect to the first endpoint in `endpoints` that accepts. `server_name`
    /// is the host without port; the TLS variant sends it as SNI.
    fn connect(&mut self, server_name: &str, endpoints: &[SocketAddr]) -> Result<()>;

    /// Serialize and send the full request.
    fn write(&mut self, request: &HttpRequest) -> Result<()>;

    /// Block until one complete response has been received.
    fn read(&mut self) -> Result<HttpResponse>;

    /// Gracefully shut the channel down. "Not connected" is not an error.
    fn close(&mut self) -> Result<()>;
}

/// HTTP over a bare TCP socket.
#[derive(Debug, Default)]
pub struct PlainTransport {
    stream: Option<TcpStream>,
}

impl PlainTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl Transport for PlainTransport {
    fn connect(&mut self, _server_name: &str, endpoints: &[SocketAddr]) -> Result<()> {
        let stream = TcpStream::connect(endpoints).map_err(Error::Connect)?;
        tracing::debug!(peer = ?stream.peer_addr().ok(), "TCP connected");
        self.stream = Some(stream);
        Ok(())
    }

    fn write(&mut self, request: &HttpRequest) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        http::write_request(stream, request).map_err(Error::Write)
    }

    fn read(&mut self) -> Result<HttpResponse> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        http::read_response(stream)
    }

    fn close(&mut self) -> Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        tolerate_shutdown(stream.shutdown(Shutdown::Both))
    }
}

impl Drop for PlainTransport {
    fn drop(&mut self) {
        if self.stream.is_some() {
            if let Err(e) = self.close() {
                tracing::warn!("failed to close TCP transport: {e}");
            }
        }
    }
}

/// HTTP over a TLS session (rustls) over a TCP socket.
pub struct TlsTransport {
    config: Arc<ClientConfig>,
    stream: Option<StreamOwned<ClientConnection, TcpStream>>,
}

impl TlsTransport {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl fmt::Debug for TlsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsTransport")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl Transport for TlsTransport {
    fn connect(&mut self, server_name: &str, endpoints: &[SocketAddr]) -> Result<()> {
        let name = ServerName::try_from(server_name.to_string())
            .map_err(|_| Error::InvalidServerName(server_name.to_string()))?;

        let sock = TcpStream::connect(endpoints).map_err(Error::Connect)?;
        tracing::debug!(peer = ?sock.peer_addr().ok(), "TCP connected");

        let conn = ClientConnection::new(self.config.clone(), name)?;
        let mut stream = StreamOwned::new(conn, sock);
        while stream.conn.is_handshaking() {
            stream
                .conn
                .complete_io(&mut stream.sock)
                .map_err(Error::Handshake)?;
        }
        tracing::debug!(
            version = ?stream.conn.protocol_version(),
            suite = ?stream.conn.negotiated_cipher_suite().map(|s| s.suite()),
            "TLS handshake complete"
        );

        self.stream = Some(stream);
        Ok(())
    }

    fn write(&mut self, request: &HttpRequest) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        http::write_request(stream, request).map_err(Error::Write)
    }

    fn read(&mut self) -> Result<HttpResponse> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        http::read_response(stream)
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        stream.conn.send_close_notify();
        let mut flushed = Ok(());
        while stream.conn.wants_write() {
            if let Err(e) = stream.conn.write_tls(&mut stream.sock) {
                flushed = Err(e);
                break;
            }
        }
        tolerate_shutdown(flushed)?;
        tolerate_shutdown(stream.sock.shutdown(Shutdown::Both))
    }
}

impl Drop for TlsTransport {
    fn drop(&mut self) {
        if self.stream.is_some() {
            if let Err(e) = self.close() {
                tracing::warn!("failed to close TLS transport: {e}");
            }
        }
    }
}

/// The peer may already be gone when we shut down; that is not a failure.
fn tolerate_shutdown(result: io::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if is_tolerated_shutdown_error(&e) => {
            tracing::debug!("ignoring shutdown error: {e}");
            Ok(())
        }
        Err(e) => Err(Error::Shutdown(e)),
    }
}

fn is_tolerated_shutdown_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotConnected | io::ErrorKind::UnexpectedEof
    )
}
