pub mod gemini;
pub mod groq;
mod http_errors;

use thiserror::Error;

/// Failure kinds at the remote model boundary.
///
/// Classification happens where the HTTP call is made, from status codes
/// and transport error types, so callers can pick a user-facing reply per
/// kind without inspecting raw error text.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("model API authentication failed: {0}")]
    Auth(String),

    #[error("model API quota or rate limit exhausted: {0}")]
    Quota(String),

    #[error("model request timed out after {0}s")]
    Timeout(u64),

    #[error("model request failed: {0}")]
    Other(String),
}
