use std::sync::Arc;
use std::time::{Duration, Instant};

use silencio_corpus::Corpus;
use silencio_llm::error::FailureClass;
use silencio_llm::{Embedder, Generator};

use crate::answer::{Answer, Outcome};
use crate::config::TimeoutConfig;
use crate::prompt::PromptBuilder;

/// Question answering over a loaded corpus: embed, retrieve, prompt, generate.
///
/// Holds only shared read-only state, so one value serves every session.
/// A missing embedder or generator degrades every answer to the
/// unavailability text instead of failing.
pub struct Assistant<E, G> {
    corpus: Arc<Corpus>,
    embedder: Option<E>,
    generator: Option<G>,
    prompt: PromptBuilder,
    timeouts: TimeoutConfig,
}

impl<E: Embedder, G: Generator> Assistant<E, G> {
    #[must_use]
    pub fn new(corpus: Arc<Corpus>, embedder: Option<E>, generator: Option<G>) -> Self {
        if embedder.is_none() {
            tracing::warn!("no embedder configured, questions will not be answered");
        }
        if generator.is_none() {
            tracing::warn!("no generator configured, questions will not be answered");
        }
        Self {
            corpus,
            embedder,
            generator,
            prompt: PromptBuilder::new("Mulholland Drive"),
            timeouts: TimeoutConfig::default(),
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        self.prompt.subject()
    }

    /// Answer `question` from the `top_k` closest passages.
    ///
    /// Never fails: every error path yields a canned [`Answer`] whose
    /// [`Outcome`] tells the caller what happened.
    pub async fn ask(&self, question: &str, top_k: usize) -> Answer {
        let start = Instant::now();
        let answer = self.answer(question.trim(), top_k).await;
        tracing::info!(
            outcome = %answer.outcome,
            sources = answer.sources.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "question handled"
        );
        answer
    }

    async fn answer(&self, question: &str, top_k: usize) -> Answer {
        let subject = self.prompt.subject();
        if question.is_empty() {
            return Answer::canned(Outcome::EmptyQuestion, subject);
        }

        let Some(embedder) = &self.embedder else {
            return Answer::canned(Outcome::Unavailable, subject);
        };
        let embed_timeout = Duration::from_secs(self.timeouts.embedding_seconds);
        let query = match tokio::time::timeout(embed_timeout, embedder.embed_query(question)).await
        {
            Ok(Ok(v)) => v,
            Ok(Err(e)) => {
                tracing::warn!(embedder = embedder.name(), "query embedding failed: {e}");
                return Answer::canned(Outcome::EmbedderFailed, subject);
            }
            Err(_) => {
                tracing::warn!(
                    embedder = embedder.name(),
                    timeout_secs = self.timeouts.embedding_seconds,
                    "query embedding timed out"
                );
                return Answer::canned(Outcome::EmbedderFailed, subject);
            }
        };

        let sources = self.corpus.search(&query, top_k);
        if sources.is_empty() {
            tracing::warn!(top_k, "no passages retrieved");
            return Answer::canned(Outcome::NoResults, subject);
        }

        let Some(generator) = &self.generator else {
            return Answer::canned(Outcome::Unavailable, subject);
        };
        let system_prompt = self.prompt.build(&sources);
        let llm_timeout = Duration::from_secs(self.timeouts.llm_seconds);
        let outcome =
            match tokio::time::timeout(llm_timeout, generator.generate(&system_prompt, question))
                .await
            {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    return Answer {
                        text: text.trim().to_owned(),
                        outcome: Outcome::Answered,
                        sources,
                    };
                }
                Ok(Ok(_)) => {
                    tracing::warn!(generator = generator.name(), "generator returned blank text");
                    Outcome::from(FailureClass::Malformed)
                }
                Ok(Err(e)) => {
                    tracing::warn!(generator = generator.name(), "generation failed: {e}");
                    Outcome::from(e.class())
                }
                Err(_) => {
                    tracing::warn!(
                        generator = generator.name(),
                        timeout_secs = self.timeouts.llm_seconds,
                        "generation timed out"
                    );
                    Outcome::from(FailureClass::Transient)
                }
            };
        Answer::canned(outcome, subject)
    }
}
