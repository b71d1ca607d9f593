//! Error types for the SDK.

use thiserror::Error;

/// SDK error type.
///
/// Local construction errors (`InvalidArgument`, `MissingInput`,
/// `ConflictingInput`, `MissingFeatures`, `InvalidConfig`) are raised before
/// any network traffic. The remaining variants classify the outcome of a call
/// to the service.
#[derive(Error, Debug)]
pub enum Error {
    /// A feature or request option failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// None of `text`, `url` or `html` was supplied.
    #[error("Missing input: one of text, url or html is required")]
    MissingInput,

    /// More than one input source was supplied.
    #[error("Conflicting input: only one of text, url or html may be set (got {})", .0.join(", "))]
    ConflictingInput(Vec<&'static str>),

    /// The request carries no features.
    #[error("Missing features: at least one analysis feature is required")]
    MissingFeatures,

    /// Client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The service rejected the request (HTTP 4xx).
    #[error("API error ({code}): {message}")]
    ClientError {
        /// Error code reported by the service (falls back to the HTTP status).
        code: u16,
        /// Error message from the service.
        message: String,
    },

    /// The service could not be reached or failed (HTTP 5xx, timeout, transport).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The response body did not match the expected schema.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The call was cancelled by the caller.
    #[error("Request cancelled")]
    Cancelled,
}

impl Error {
    /// Whether the caller may retry the same request later.
    ///
    /// Only transport failures, timeouts and 5xx responses qualify. The SDK
    /// never retries on its own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::ServiceUnavailable(format!("failed to read response body: {err}"))
        } else {
            Self::ServiceUnavailable(err.to_string())
        }
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;
