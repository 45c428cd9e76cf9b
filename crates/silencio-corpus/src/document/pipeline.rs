use silencio_llm::Embedder;

use super::{Chunk, Document, DocumentError, DocumentLoader, TextSplitter};
use crate::store::RecordWriter;

pub const DEFAULT_EMBED_BATCH_SIZE: usize = 32;

/// Offline ingestion: split -> embed -> write corpus file.
pub struct IngestionPipeline<E> {
    splitter: TextSplitter,
    embedder: E,
    writer: RecordWriter,
    batch_size: usize,
}

impl<E: Embedder> IngestionPipeline<E> {
    pub fn new(splitter: TextSplitter, embedder: E, writer: RecordWriter) -> Self {
        Self {
            splitter,
            embedder,
            writer,
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed chunk texts in batches, checking each batch's vector count.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails or returns the wrong number of vectors.
    pub async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, DocumentError> {
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embedded = self.embedder.embed_documents(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(DocumentError::VectorCountMismatch {
                    expected: texts.len(),
                    got: embedded.len(),
                });
            }
            vectors.extend(embedded);
            tracing::debug!(done = vectors.len(), total = chunks.len(), "embedded batch");
        }
        Ok(vectors)
    }

    /// Ingest documents into a freshly written corpus file. Returns chunk count.
    ///
    /// Chunks are numbered consecutively across all `documents`.
    ///
    /// # Errors
    ///
    /// Returns an error if no chunks are produced, embedding fails, or the
    /// corpus cannot be written. The existing corpus file is left untouched on error.
    pub async fn ingest(&self, documents: Vec<Document>) -> Result<usize, DocumentError> {
        let mut chunks = Vec::new();
        for doc in &documents {
            let doc_chunks = self.splitter.split(doc);
            tracing::info!(
                source = %doc.metadata.source,
                chunks = doc_chunks.len(),
                "document split"
            );
            // chunk_index runs across the whole batch so record ids stay unique
            for mut chunk in doc_chunks {
                chunk.chunk_index = chunks.len();
                chunks.push(chunk);
            }
        }

        if chunks.is_empty() {
            let source = documents
                .first()
                .map_or_else(String::new, |d| d.metadata.source.clone());
            return Err(DocumentError::NoChunks(source));
        }

        tracing::info!(
            chunks = chunks.len(),
            model = self.embedder.model(),
            "embedding chunks"
        );
        let vectors = self.embed_chunks(&chunks).await?;
        Ok(self.writer.write(&chunks, vectors)?)
    }

    /// # Errors
    ///
    /// Returns an error if loading, embedding, or storage fails.
    pub async fn load_and_ingest(
        &self,
        loader: &(dyn DocumentLoader + '_),
        path: &std::path::Path,
    ) -> Result<usize, DocumentError> {
        let documents = loader.load(path).await?;
        self.ingest(documents).await
    }
}
