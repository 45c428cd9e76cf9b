use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use silencio_core::{Answer, Assistant};
use silencio_gateway::{AskReply, QuestionHandler, SourceRef};
use silencio_llm::{Embedder, Generator};

/// Serves gateway questions from a shared assistant.
pub(crate) struct AssistantHandler<E, G> {
    assistant: Arc<Assistant<E, G>>,
    default_top_k: usize,
}

impl<E, G> AssistantHandler<E, G> {
    pub(crate) fn new(assistant: Arc<Assistant<E, G>>, default_top_k: usize) -> Self {
        Self {
            assistant,
            default_top_k,
        }
    }
}

fn to_reply(answer: Answer) -> AskReply {
    AskReply {
        outcome: answer.outcome.to_string(),
        sources: answer
            .sources
            .into_iter()
            .map(|s| SourceRef {
                id: s.record.id,
                score: s.score,
                chunk_index: s.record.metadata.chunk_index,
            })
            .collect(),
        answer: answer.text,
    }
}

impl<E, G> QuestionHandler for AssistantHandler<E, G>
where
    E: Embedder + 'static,
    G: Generator + 'static,
{
    fn ask<'a>(
        &'a self,
        question: &'a str,
        top_k: Option<usize>,
    ) -> Pin<Box<dyn Future<Output = AskReply> + Send + 'a>> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        Box::pin(async move { to_reply(self.assistant.ask(question, top_k).await) })
    }

    fn records(&self) -> usize {
        self.assistant.corpus().len()
    }
}
