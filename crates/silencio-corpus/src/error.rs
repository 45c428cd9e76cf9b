use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("corpus file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("corpus file {} contains no valid records", .0.display())]
    Empty(PathBuf),

    #[error("{chunks} chunks but {vectors} embedding vectors")]
    CountMismatch { chunks: usize, vectors: usize },

    #[error("record {index} has dimension {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to move corpus file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}
