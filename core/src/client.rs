//! Blocking one-shot GET client.
//!
//! # Design
//! `Client` holds the TLS configuration and the `ClientConfig`; nothing else
//! survives between calls. Every `get` parses the URL, resolves the host,
//! opens a fresh transport (TLS when the scheme is `https`), sends one
//! request, reads one response and closes the transport. DNS results and
//! connections are never reused.
//!
//! The host is resolved together with the scheme's default port unless the
//! authority already names a port (`127.0.0.1:8080`), in which case that
//! authority is resolved as written. The `Host` header always carries the
//! authority exactly as it appeared in the URL.

use std::io::{self, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use rustls::ClientConfig as TlsClientConfig;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::tls;
use crate::transport::{PlainTransport, TlsTransport, Transport};
use crate::uri::ParsedUri;

/// Synchronous client that performs exactly one request per call.
#[derive(Debug, Clone)]
pub struct Client {
    tls: Arc<TlsClientConfig>,
    config: ClientConfig,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            tls: tls::insecure_client_config()?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch `url` and return the response.
    ///
    /// A URL that does not parse into a usable host fails at resolution,
    /// not here.
    pub fn get(&self, url: &str) -> Result<HttpResponse> {
        let uri = ParsedUri::parse(url);
        if self.config.echo_response {
            echo(|out| writeln!(out, "{uri}"))?;
        }
        tracing::info!(url, host = uri.host(), port = uri.port(), "GET");

        let target = request_target(&uri);
        self.request(uri.host(), uri.port(), &target, uri.is_secure())
    }

    /// Run one GET exchange against `host` on `port`.
    ///
    /// `target` is sent as the request target; an empty target becomes `/`.
    /// On any failure the transport is shut down before the error is
    /// returned.
    pub fn request(
        &self,
        host: &str,
        port: &str,
        target: &str,
        secure: bool,
    ) -> Result<HttpResponse> {
        let endpoints = resolve(host, port)?;

        let mut transport: Box<dyn Transport> = if secure {
            Box::new(TlsTransport::new(self.tls.clone()))
        } else {
            Box::new(PlainTransport::new())
        };

        transport.connect(server_name(host), &endpoints)?;

        let request = self.build_get(host, target);
        transport.write(&request)?;
        tracing::debug!(request_target = %request.target, "request sent");

        let response = transport.read()?;
        tracing::debug!(
            status = response.status,
            body_len = response.body.len(),
            "response received"
        );

        if self.config.echo_response {
            echo(|out| {
                response.write_to(out)?;
                writeln!(out)
            })?;
        }

        transport.close()?;
        Ok(response)
    }

    /// Build the GET request sent for `host` and `target`.
    pub fn build_get(&self, host: &str, target: &str) -> HttpRequest {
        let target = if target.is_empty() { "/" } else { target };
        HttpRequest::get(target)
            .header("Host", host)
            .header("User-Agent", self.config.user_agent.as_str())
    }
}

/// Write to stdout and flush, reporting failure instead of panicking.
fn echo(f: impl FnOnce(&mut io::StdoutLock<'static>) -> io::Result<()>) -> Result<()> {
    let mut out = io::stdout().lock();
    f(&mut out).and_then(|()| out.flush()).map_err(Error::Output)
}

/// Path plus `?query` when the URL carried one.
fn request_target(uri: &ParsedUri) -> String {
    if uri.query().is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), uri.query())
    }
}

/// Split a trailing `:digits` port off an authority.
fn split_port(host: &str) -> (&str, Option<&str>) {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (name, Some(port))
        }
        _ => (host, None),
    }
}

/// Host name without any port, as used for SNI.
fn server_name(host: &str) -> &str {
    split_port(host).0
}

fn resolve(host: &str, port: &str) -> Result<Vec<SocketAddr>> {
    let authority = match split_port(host) {
        (_, Some(_)) => host.to_string(),
        (name, None) => format!("{name}:{port}"),
    };

    let endpoints: Vec<SocketAddr> = authority
        .to_socket_addrs()
        .map_err(|source| Error::Resolve {
            authority: authority.clone(),
            source,
        })?
        .collect();
    if endpoints.is_empty() {
        return Err(Error::NoAddress(authority));
    }

    tracing::debug!(%authority, ?endpoints, "resolved");
    Ok(endpoints)
}
