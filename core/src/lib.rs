//! Blocking single-request HTTP/HTTPS GET client.
//!
//! # Overview
//! `Client::get` parses a URL with `ParsedUri`, resolves the host, opens a
//! plaintext or TLS `Transport`, sends one HTTP/1.1 GET and returns the
//! complete `HttpResponse`. Nothing is pooled, retried, redirected or run
//! concurrently.
//!
//! # Design
//! - `uri` never fails; malformed URLs degrade to empty fields.
//! - `http` holds the message types and the codec shared by both transports.
//! - `transport` exposes the connect/write/read/close contract with one
//!   plaintext and one TLS implementation, chosen once per request.
//! - `tls` builds the rustls configuration. Certificate verification is
//!   DISABLED; see that module before relying on HTTPS results.
//! - No timeouts anywhere: every call blocks until it completes or fails.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod tls;
pub mod transport;
pub mod uri;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{HttpRequest, HttpResponse};
pub use transport::{PlainTransport, TlsTransport, Transport};
pub use uri::ParsedUri;
