//! Error types for the request pipeline.
//!
//! # Design
//! One variant per failure category of a single request: resolution,
//! connect, TLS handshake, write, read/framing and shutdown. None of them is
//! retried or recovered inside the crate; they all propagate to the caller.
//! A URL that does not parse cleanly is not an error at all (see
//! `ParsedUri::parse`).

use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `Client` and the transports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// DNS lookup of `host:port` failed.
    #[error("failed to resolve {authority}: {source}")]
    Resolve {
        authority: String,
        #[source]
        source: io::Error,
    },

    /// DNS lookup succeeded but returned no addresses.
    #[error("no addresses found for {0}")]
    NoAddress(String),

    /// None of the resolved endpoints accepted a TCP connection.
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    /// The host cannot be used as a TLS server name.
    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// I/O failure while completing the TLS handshake.
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] io::Error),

    /// rustls rejected the configuration or the session.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Sending the request failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// Receiving the response failed at the I/O level.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// The peer sent something that is not a valid HTTP/1.x response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Graceful shutdown failed for a reason other than "not connected".
    #[error("shutdown failed: {0}")]
    Shutdown(#[source] io::Error),

    /// Echoing the request summary or the response to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    /// The transport was used before `connect` or after `close`.
    #[error("transport is not connected")]
    NotConnected,
}

impl Error {
    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}
