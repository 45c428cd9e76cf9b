use std::path::Path;

use crate::error::CorpusError;
use crate::retriever::{RetrievalResult, retrieve};
use crate::store::{EmbeddingRecord, LoadStats, load_records};

/// Row-major matrix of embeddings, one row per record.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// # Errors
    ///
    /// Returns [`CorpusError::DimensionMismatch`] if any row differs in length from the first.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a [f32]>) -> Result<Self, CorpusError> {
        let mut data = Vec::new();
        let mut count = 0;
        let mut dim = 0;
        for (index, row) in rows.into_iter().enumerate() {
            if index == 0 {
                dim = row.len();
            } else if row.len() != dim {
                return Err(CorpusError::DimensionMismatch {
                    index,
                    expected: dim,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
            count += 1;
        }
        Ok(Self {
            data,
            rows: count,
            dim,
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        self.data.get(start..start + self.dim)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.rows).filter_map(|i| self.row(i))
    }
}

/// Immutable loaded corpus: records and their embedding matrix, row-aligned.
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<EmbeddingRecord>,
    matrix: EmbeddingMatrix,
    stats: LoadStats,
}

impl Corpus {
    /// Load and index a JSONL corpus file.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::NotFound`] if the file is missing and
    /// [`CorpusError::Empty`] if it holds no valid records.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let (records, stats) = load_records(path)?;
        if records.is_empty() {
            return Err(CorpusError::Empty(path.to_path_buf()));
        }
        let corpus = Self::with_stats(records, stats)?;
        tracing::info!(
            path = %path.display(),
            records = corpus.len(),
            skipped = stats.skipped,
            dim = corpus.dimension(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Build a corpus from in-memory records.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DimensionMismatch`] if records disagree on dimension.
    pub fn from_records(records: Vec<EmbeddingRecord>) -> Result<Self, CorpusError> {
        let stats = LoadStats {
            loaded: records.len(),
            skipped: 0,
        };
        Self::with_stats(records, stats)
    }

    fn with_stats(records: Vec<EmbeddingRecord>, stats: LoadStats) -> Result<Self, CorpusError> {
        let matrix = EmbeddingMatrix::from_rows(records.iter().map(|r| r.embedding.as_slice()))?;
        Ok(Self {
            records,
            matrix,
            stats,
        })
    }

    #[must_use]
    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    #[must_use]
    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.matrix.dim()
    }

    /// Top-`k` records by cosine similarity to `query`.
    #[must_use]
    pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievalResult> {
        retrieve(query, &self.matrix, &self.records, k)
    }
}
