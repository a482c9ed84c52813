use thiserror::Error;

/// Errors returned by payment processor clients.
///
/// The `Display` text of [`ProcessorError::UpstreamError`] contains the processor's response body. It is meant for
/// logs and must not be forwarded to API callers verbatim.
#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Payment processor returned an error. Status {status}. {message}")]
    UpstreamError { status: u16, message: String },
    #[error("Could not encode or decode processor payload: {0}")]
    EncodingError(String),
    #[error("Could not reach the payment processor: {0}")]
    NetworkError(String),
}

impl ProcessorError {
    /// A description of the error that is safe to hand back to API clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Initialization(_) => "The payment processor client is not configured correctly",
            Self::UpstreamError { .. } => "The payment processor rejected the request",
            Self::EncodingError(_) => "The payment processor returned an unexpected response",
            Self::NetworkError(_) => "The payment processor could not be reached",
        }
    }
}

impl From<reqwest::Error> for ProcessorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_body() {
            Self::EncodingError(e.to_string())
        } else if e.is_builder() {
            Self::Initialization(e.to_string())
        } else {
            Self::NetworkError(e.to_string())
        }
    }
}
