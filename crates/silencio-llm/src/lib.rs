//! Embedding and generation capabilities with Ollama, OpenAI-compatible, and Gemini backends.

pub mod any;
pub mod error;
pub mod gemini;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod provider;

pub use error::LlmError;
pub use provider::{Embedder, Generator};
