#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("invalid splitter config: {0}")]
    InvalidConfig(String),

    #[error("no chunks produced from {0}")]
    NoChunks(String),

    #[error("embedder returned {got} vectors for {expected} chunks")]
    VectorCountMismatch { expected: usize, got: usize },

    #[error("embedding failed: {0}")]
    Embedding(#[from] silencio_llm::LlmError),

    #[error("storage error: {0}")]
    Storage(#[from] crate::error::CorpusError),
}
