use std::future::Future;

use crate::error::LlmError;

/// Text → fixed-length vector capability.
///
/// `embed_documents` and `embed_query` of one value must produce vectors in the
/// same space: same model, same version, same dimension.
pub trait Embedder: Send + Sync {
    /// Embed a batch of documents, one vector per input, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or returns an unusable payload.
    fn embed_documents(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send;

    /// Embed a single query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or returns an unusable payload.
    fn embed_query(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    /// Model identifier recorded in logs.
    fn model(&self) -> &str;

    fn name(&self) -> &str;
}

/// Prompt → text capability.
pub trait Generator: Send + Sync {
    /// Answer `question` under the grounding `system_prompt`.
    ///
    /// Implementations make exactly one upstream call; retry policy belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns a tagged [`LlmError`] describing why no answer was produced.
    fn generate(
        &self,
        system_prompt: &str,
        question: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &str;
}
