//! Client configuration and protocol constants.
//!
//! Nothing here is read from the environment or from files; callers that
//! want a different `User-Agent` or a silent client build a `ClientConfig`
//! and hand it to `Client::with_config`.

/// `User-Agent` header value sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Richard-Agent";

/// Port used when the scheme is anything other than `https`.
pub const HTTP_PORT: &str = "80";

/// Port used when the scheme is `https`.
pub const HTTPS_PORT: &str = "443";

/// Upper bound on the size of a response head (status line plus headers).
/// The body has no limit.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Maximum number of response headers accepted.
pub const MAX_HEADERS: usize = 100;

/// Settings applied to every request issued by a `Client`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Value of the `User-Agent` request header.
    pub user_agent: String,
    /// Print the `host port path` line and the response to stdout while the
    /// request runs, in addition to returning the response.
    pub echo_response: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            echo_response: true,
        }
    }
}
