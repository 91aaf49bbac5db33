//! Minimal URL splitting for the request pipeline.
//!
//! # Design
//! `ParsedUri` is deliberately permissive: it never fails. Input without a
//! `://` separator produces a value with every field at its default, and
//! anything after the separator is split on the first `/` and the first `?`
//! without further validation. There is no percent-decoding, no IPv6 bracket
//! handling, and no user-info or explicit-port extraction: an authority such
//! as `host:8080` stays in `host` verbatim and `port` keeps its scheme default.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{HTTPS_PORT, HTTP_PORT};

const SCHEME_SEPARATOR: &str = "://";

/// A URL split into the parts the request pipeline needs.
///
/// `protocol` and `host` are ASCII-lowercased; `path` and `query` keep their
/// original case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUri {
    protocol: String,
    host: String,
    path: String,
    query: String,
    port: String,
}

impl Default for ParsedUri {
    fn default() -> Self {
        Self {
            protocol: String::new(),
            host: String::new(),
            path: String::new(),
            query: String::new(),
            port: HTTP_PORT.to_string(),
        }
    }
}

impl ParsedUri {
    pub fn parse(url: &str) -> Self {
        let mut uri = Self::default();

        let Some(scheme_end) = url.find(SCHEME_SEPARATOR) else {
            return uri;
        };

        uri.protocol = url[..scheme_end].to_ascii_lowercase();
        if uri.is_secure() {
            uri.port = HTTPS_PORT.to_string();
        }

        let rest = &url[scheme_end + SCHEME_SEPARATOR.len()..];
        let path_start = rest.find('/').unwrap_or(rest.len());
        uri.host = rest[..path_start].to_ascii_lowercase();

        let rest = &rest[path_start..];
        match rest.find('?') {
            Some(query_start) => {
                uri.path = rest[..query_start].to_string();
                uri.query = rest[query_start + 1..].to_string();
            }
            None => uri.path = rest.to_string(),
        }

        uri
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// True when the scheme selects the TLS transport.
    pub fn is_secure(&self) -> bool {
        self.protocol == "https"
    }
}

impl FromStr for ParsedUri {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Renders the `host port path` summary printed before a request.
impl fmt::Display for ParsedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.host, self.port, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_url() {
        let uri = ParsedUri::parse("http://Example.com/a/b?x=1");
        assert_eq!(uri.protocol(), "http");
        assert_eq!(uri.host(), "example.com");
        assert_eq!(uri.path(), "/a/b");
        assert_eq!(uri.query(), "x=1");
        assert_eq!(uri.port(), "80");
        assert!(!uri.is_secure());
    }

    #[test]
    fn https_defaults_to_443() {
        let uri = ParsedUri::parse("https://example.com");
        assert_eq!(uri.protocol(), "https");
        assert_eq!(uri.host(), "example.com");
        assert_eq!(uri.path(), "");
        assert_eq!(uri.query(), "");
        assert_eq!(uri.port(), "443");
        assert!(uri.is_secure());
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let uri = ParsedUri::parse("HTTPS://Example.COM/Mixed/Case?Q=1");
        assert_eq!(uri.protocol(), "https");
        assert_eq!(uri.host(), "example.com");
        assert_eq!(uri.path(), "/Mixed/Case");
        assert_eq!(uri.query(), "Q=1");
        assert_eq!(uri.port(), "443");
    }

    #[test]
    fn only_https_overrides_port() {
        let uri = ParsedUri::parse("ftp://x");
        assert_eq!(uri.protocol(), "ftp");
        assert_eq!(uri.host(), "x");
        assert_eq!(uri.port(), "80");
    }

    #[test]
    fn missing_separator_leaves_defaults() {
        let uri = ParsedUri::parse("not-a-url");
        assert_eq!(uri, ParsedUri::default());
        assert_eq!(uri.protocol(), "");
        assert_eq!(uri.port(), "80");
    }

    #[test]
    fn explicit_port_stays_in_host() {
        let uri = ParsedUri::parse("http://127.0.0.1:8080/status");
        assert_eq!(uri.host(), "127.0.0.1:8080");
        assert_eq!(uri.port(), "80");
        assert_eq!(uri.path(), "/status");
    }

    #[test]
    fn query_only_splits_on_first_question_mark() {
        let uri = ParsedUri::parse("http://h/p?a=1?b=2");
        assert_eq!(uri.path(), "/p");
        assert_eq!(uri.query(), "a=1?b=2");
    }

    #[test]
    fn trailing_slash_is_the_whole_path() {
        let uri = ParsedUri::parse("http://h/");
        assert_eq!(uri.path(), "/");
        assert_eq!(uri.query(), "");
    }

    #[test]
    fn display_is_host_port_path() {
        let uri: ParsedUri = "https://Example.com/index.html".parse().unwrap();
        assert_eq!(uri.to_string(), "example.com 443 /index.html");
    }
}
