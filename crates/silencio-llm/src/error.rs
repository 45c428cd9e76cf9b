/// Failure classes at the embedder/generator boundary.
///
/// Callers never show these to end users; they pick a canned answer by class.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{provider} rejected the credential")]
    Unauthenticated { provider: String },

    #[error("rate limited")]
    RateLimited,

    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("malformed response from {provider}: {detail}")]
    MalformedResponse { provider: String, detail: String },

    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("provider unavailable")]
    Unavailable,

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: String },

    #[error("{0}")]
    Other(String),
}

/// Coarse failure class used to choose the user-facing fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Missing or rejected credential, provider not configured.
    Unavailable,
    /// Quota, network or timeout trouble; the same question may work later.
    Transient,
    /// The provider answered but the payload was unusable.
    Malformed,
}

impl LlmError {
    #[must_use]
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Unauthenticated { .. } | Self::Unavailable | Self::EmbedUnsupported { .. } => {
                FailureClass::Unavailable
            }
            Self::MalformedResponse { .. } | Self::EmptyResponse { .. } | Self::Json(_) => {
                FailureClass::Malformed
            }
            Self::Http(_)
            | Self::RateLimited
            | Self::Transient(_)
            | Self::Timeout(_)
            | Self::Other(_) => FailureClass::Transient,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
