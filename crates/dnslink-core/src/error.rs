//! Error types for the dnslink pipeline
//!
//! This module defines all error types used throughout the crate, plus the
//! classification the retry primitive relies on.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dnslink pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (empty CID, missing artifact path, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Local I/O errors (reading the artifact tree)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connect, timeout, reset)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Remote resource not (yet) available
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Non-success response from a backend API, body kept as detail
    #[error("{provider} API returned {status}: {body}")]
    Api {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Provider-specific error (malformed response, unexpected shape)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A retried operation never succeeded within its budget
    #[error("{resource} failed after {attempts} attempt(s): {last}")]
    RetryExhausted {
        /// What was being retried
        resource: String,
        /// Attempts made
        attempts: u32,
        /// The last observed failure
        last: Box<Error>,
    },

    /// The gateway never served the CID within the verification budget
    #[error("CID {cid} not retrievable from {gateway} after {attempts} attempt(s)")]
    PropagationTimeout {
        /// The CID being verified
        cid: String,
        /// Gateway base URL
        gateway: String,
        /// Attempts made
        attempts: u32,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// How the retry primitive treats a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Sleep and try again while budget remains
    Retryable,
    /// Surface immediately
    Fatal,
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create an "unavailable" error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an API status error
    pub fn api(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Default failure classification used by [`crate::RetryPolicy`]
    ///
    /// Transport failures, unavailability, rate limiting, request timeouts
    /// and 5xx responses are transient. Everything else (bad input, bad
    /// credentials, 4xx, malformed responses) will not heal by waiting.
    pub fn disposition(&self) -> Disposition {
        match self {
            Error::Http(_) | Error::Unavailable(_) | Error::RateLimited(_) => {
                Disposition::Retryable
            }
            Error::Api { status, .. } if *status == 408 || *status == 429 || *status >= 500 => {
                Disposition::Retryable
            }
            _ => Disposition::Fatal,
        }
    }

    /// Whether the default classification treats this error as transient
    pub fn is_retryable(&self) -> bool {
        self.disposition() == Disposition::Retryable
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Outcome of one best-effort cleanup action (unpin, stale record delete)
///
/// Cleanup failures never fail a run. They are collected here and surfaced
/// as warnings next to the primary result.
#[derive(Debug)]
pub struct CleanupReport {
    /// What was being cleaned up (a CID or a DNS record id)
    pub target: String,
    /// Result of the cleanup call
    pub result: Result<()>,
}

impl CleanupReport {
    /// Record a cleanup result for `target`
    pub fn new(target: impl Into<String>, result: Result<()>) -> Self {
        Self {
            target: target.into(),
            result,
        }
    }

    /// Whether the cleanup succeeded
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Human-readable warning for a failed cleanup
    pub fn warning(&self) -> Option<String> {
        self.result
            .as_ref()
            .err()
            .map(|e| format!("cleanup of {} failed: {}", self.target, e))
    }
}
