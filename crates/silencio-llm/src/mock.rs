//! Test-only mock embedder and generator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{FailureClass, LlmError};
use crate::provider::{Embedder, Generator};

fn error_for(class: FailureClass) -> LlmError {
    match class {
        FailureClass::Unavailable => LlmError::Unavailable,
        FailureClass::Transient => LlmError::Transient("mock transient failure".into()),
        FailureClass::Malformed => LlmError::MalformedResponse {
            provider: "mock".into(),
            detail: "mock malformed payload".into(),
        },
    }
}

/// Embedder returning fixed vectors, optionally keyed by exact input text.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub default_vector: Vec<f32>,
    pub vectors: HashMap<String, Vec<f32>>,
    pub fail_with: Option<FailureClass>,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            default_vector: vec![0.0; 384],
            vectors: HashMap::new(),
            fail_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn with_default(vector: Vec<f32>) -> Self {
        Self {
            default_vector: vector,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    #[must_use]
    pub fn failing(class: FailureClass) -> Self {
        Self {
            fail_with: Some(class),
            ..Self::default()
        }
    }

    /// Batch sizes of every `embed_documents` call so far.
    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }

    fn lookup(&self, text: &str) -> Vec<f32> {
        self.vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_vector.clone())
    }
}

impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if let Some(class) = self.fail_with {
            return Err(error_for(class));
        }
        self.calls.lock().unwrap().push(texts.len());
        Ok(texts.iter().map(|t| self.lookup(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if let Some(class) = self.fail_with {
            return Err(error_for(class));
        }
        Ok(self.lookup(text))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn model(&self) -> &str {
        "mock-embedding"
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

/// Generator replaying queued responses, then a default one.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<(String, String)>>>,
    pub default_response: String,
    pub fail_with: Option<FailureClass>,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            fail_with: None,
            delay_ms: 0,
        }
    }
}

impl MockGenerator {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing(class: FailureClass) -> Self {
        Self {
            fail_with: Some(class),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// `(system_prompt, question)` pairs received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Generator for MockGenerator {
    async fn generate(&self, system_prompt: &str, question: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_owned(), question.to_owned()));
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if let Some(class) = self.fail_with {
            return Err(error_for(class));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedder_uses_keyed_vector() {
        let e = MockEmbedder::with_default(vec![0.0, 0.0]).with_vector("key", vec![1.0, 0.0]);
        assert_eq!(e.embed_query("key").await.unwrap(), vec![1.0, 0.0]);
        assert_eq!(e.embed_query("other").await.unwrap(), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn embedder_records_batch_sizes() {
        let e = MockEmbedder::default();
        e.embed_documents(&["a".into(), "b".into()]).await.unwrap();
        e.embed_documents(&["c".into()]).await.unwrap();
        assert_eq!(e.batch_sizes(), vec![2, 1]);
    }

    #[tokio::test]
    async fn failing_embedder_reports_class() {
        let e = MockEmbedder::failing(FailureClass::Unavailable);
        let err = e.embed_query("x").await.unwrap_err();
        assert_eq!(err.class(), FailureClass::Unavailable);
    }

    #[tokio::test]
    async fn generator_replays_then_defaults() {
        let g = MockGenerator::with_responses(vec!["first".into()]);
        assert_eq!(g.generate("s", "q").await.unwrap(), "first");
        assert_eq!(g.generate("s", "q").await.unwrap(), "mock response");
        assert_eq!(g.prompts().len(), 2);
    }

    #[tokio::test]
    async fn failing_generator_reports_class() {
        let g = MockGenerator::failing(FailureClass::Malformed);
        let err = g.generate("s", "q").await.unwrap_err();
        assert_eq!(err.class(), FailureClass::Malformed);
    }
}
