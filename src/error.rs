//! Error types shared by the spider middleware manager.

use thiserror::Error;

/// Errors flowing through a scrape chain.
///
/// `InvalidOutput` is the framework's own contract-violation signal. It is
/// never handed to an exception hook: once raised it travels to the end of
/// the chain and surfaces to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpiderError {
    /// A middleware hook returned a value outside its return contract.
    #[error("Middleware {middleware} must return {expected}, got {got}")]
    InvalidOutput {
        middleware: String,
        expected: &'static str,
        got: String,
    },

    /// An error raised by a hook body, a spider callback, or mid-sequence.
    #[error("{kind}: {message}")]
    Exception { kind: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Unknown middleware: {0}")]
    UnknownMiddleware(String),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Channel closed")]
    ChannelClosed,
}

impl SpiderError {
    /// Shorthand for an ordinary error of the given kind.
    pub fn exception(kind: impl Into<String>, message: impl Into<String>) -> Self {
        SpiderError::Exception {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_output(
        middleware: impl Into<String>,
        expected: &'static str,
        got: impl Into<String>,
    ) -> Self {
        SpiderError::InvalidOutput {
            middleware: middleware.into(),
            expected,
            got: got.into(),
        }
    }

    /// Returns true for the internal contract-violation variant.
    pub fn is_invalid_output(&self) -> bool {
        matches!(self, SpiderError::InvalidOutput { .. })
    }

    /// Short name used as the `spider_exceptions/<kind>` stat key.
    pub fn kind(&self) -> &str {
        match self {
            SpiderError::InvalidOutput { .. } => "InvalidOutput",
            SpiderError::Exception { kind, .. } => kind,
            SpiderError::ConfigurationError(_) => "ConfigurationError",
            SpiderError::UnknownMiddleware(_) => "UnknownMiddleware",
            SpiderError::UrlParseError(_) => "UrlParseError",
            SpiderError::Json(_) => "Json",
            SpiderError::ChannelClosed => "ChannelClosed",
        }
    }
}

impl From<serde_json::Error> for SpiderError {
    fn from(err: serde_json::Error) -> Self {
        SpiderError::Json(err.to_string())
    }
}
