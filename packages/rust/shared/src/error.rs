//! Error types for ArticleChat.
//!
//! Library crates use [`ArticleChatError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Nothing in here knows about HTTP status codes. A transport decides how to
//! present each variant; [`ArticleChatError::is_client_error`] is the only hint
//! the core offers.

use std::path::PathBuf;

/// Top-level error type for all ArticleChat operations.
#[derive(Debug, thiserror::Error)]
pub enum ArticleChatError {
    /// The article (or excerpt) has no usable text.
    #[error("empty content: {message}")]
    EmptyContent { message: String },

    /// A stored-document identifier did not match any article.
    #[error("article not found: {id}")]
    NotFound { id: String },

    /// Page retrieval failed (network error, timeout, or non-success status).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The page was fetched but contained no extractable paragraph text.
    #[error("no extractable article text at {url}")]
    Extraction { url: String },

    /// The text-generation client was never initialized.
    #[error("text generation client is not initialized")]
    GenerationUnavailable,

    /// The text-generation provider rejected or failed the call.
    #[error("generation error: {0}")]
    Generation(#[from] ProviderError),

    /// The request itself is malformed (e.g. a question is missing).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failures raised by a text-generation provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Connection failed or timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response (quota, auth, bad request).
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The provider answered without any usable completion text.
    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArticleChatError>;

impl ArticleChatError {
    /// Create an empty-content error from any displayable message.
    pub fn empty_content(msg: impl Into<String>) -> Self {
        Self::EmptyContent {
            message: msg.into(),
        }
    }

    /// Create a not-found error for the given identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an invalid-request error from any displayable message.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure was caused by the caller's input rather than by
    /// an upstream service or the local environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyContent { .. }
                | Self::NotFound { .. }
                | Self::InvalidRequest { .. }
                | Self::Extraction { .. }
        )
    }
}
