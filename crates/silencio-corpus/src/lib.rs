//! Corpus preparation and retrieval: chunking, JSONL embedding store, cosine top-k search.

pub mod corpus;
pub mod document;
pub mod error;
pub mod retriever;
pub mod store;

pub use corpus::{Corpus, EmbeddingMatrix};
pub use error::CorpusError;
pub use retriever::{RetrievalResult, retrieve};
pub use store::{EmbeddingRecord, LoadStats, RecordMetadata, RecordWriter, load_records};
