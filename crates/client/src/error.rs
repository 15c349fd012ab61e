use zync_core::error::CoreError;

/// Errors from the Zync client.
///
/// Wraps [`CoreError`] for submission-side failures (preflight, parameter
/// validation) and adds the transport and session variants.
#[derive(Debug, thiserror::Error)]
pub enum ZyncError {
    /// A domain-level error from `zync_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The site rejected the credentials, or no session cookie exists.
    #[error("Zync authentication failed: {0}")]
    Authentication(String),

    /// The site could not be reached.
    #[error("Zync is down at URL: {0}")]
    Connection(String),

    /// The site answered with a non-200 status code.
    #[error("{url}: {status}: {body}")]
    Remote {
        /// Request URL without its query string.
        url: String,
        status: u16,
        body: String,
    },

    /// The site answered 200 but the body did not have the expected shape.
    #[error("Unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ZyncError {
    /// Whether this error came from a blocking preflight check.
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::Core(CoreError::Preflight(_)))
    }
}
