use crate::gemini::GeminiProvider;
#[cfg(feature = "mock")]
use crate::mock::{MockEmbedder, MockGenerator};
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::provider::{Embedder, Generator};
use crate::LlmError;

/// Generates a match over all `AnyEmbedder` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_embedder {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyEmbedder::Ollama($p) => $expr,
            AnyEmbedder::OpenAi($p) => $expr,
            #[cfg(feature = "mock")]
            AnyEmbedder::Mock($p) => $expr,
        }
    };
}

macro_rules! delegate_generator {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyGenerator::Gemini($p) => $expr,
            AnyGenerator::OpenAi($p) => $expr,
            AnyGenerator::Ollama($p) => $expr,
            #[cfg(feature = "mock")]
            AnyGenerator::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyEmbedder {
    Ollama(OllamaProvider),
    OpenAi(OpenAiProvider),
    #[cfg(feature = "mock")]
    Mock(MockEmbedder),
}

impl Embedder for AnyEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        delegate_embedder!(self, |p| p.embed_documents(texts).await)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        delegate_embedder!(self, |p| p.embed_query(text).await)
    }

    fn model(&self) -> &str {
        delegate_embedder!(self, |p| p.model())
    }

    fn name(&self) -> &str {
        delegate_embedder!(self, |p| Embedder::name(p))
    }
}

#[derive(Debug, Clone)]
pub enum AnyGenerator {
    Gemini(GeminiProvider),
    OpenAi(OpenAiProvider),
    Ollama(OllamaProvider),
    #[cfg(feature = "mock")]
    Mock(MockGenerator),
}

impl Generator for AnyGenerator {
    async fn generate(&self, system_prompt: &str, question: &str) -> Result<String, LlmError> {
        delegate_generator!(self, |p| p.generate(system_prompt, question).await)
    }

    fn name(&self) -> &str {
        delegate_generator!(self, |p| Generator::name(p))
    }
}
