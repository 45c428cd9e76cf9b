use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub id: String,
    pub score: f32,
    pub chunk_index: usize,
}

/// Body of a `POST /ask` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskReply {
    pub answer: String,
    pub outcome: String,
    pub sources: Vec<SourceRef>,
}

/// Answers questions on behalf of the gateway.
///
/// Implementations never fail: degraded answers are reported through `outcome`.
pub trait QuestionHandler: Send + Sync {
    fn ask<'a>(
        &'a self,
        question: &'a str,
        top_k: Option<usize>,
    ) -> Pin<Box<dyn Future<Output = AskReply> + Send + 'a>>;

    /// Number of records in the loaded corpus.
    fn records(&self) -> usize;
}
