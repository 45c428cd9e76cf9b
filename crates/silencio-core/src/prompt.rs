use silencio_corpus::RetrievalResult;

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 600;
pub const TRUNCATION_MARKER: &str = " …";

/// Builds the generator system prompt from retrieved passages.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    subject: String,
    max_chars: usize,
}

impl PromptBuilder {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            max_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }

    #[must_use]
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn build(&self, results: &[RetrievalResult]) -> String {
        if results.is_empty() {
            return self.fallback();
        }
        let context = results
            .iter()
            .map(|r| truncate_chars(&r.record.text, self.max_chars))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "You are an expert on the film {subject}. Answer the question directly and \
             concisely using only the information below.\n\n\
             Film information: {context}\n\n\
             Focus only on what was asked and leave out unnecessary detail.",
            subject = self.subject,
        )
    }

    fn fallback(&self) -> String {
        format!(
            "Give general information about the film {subject}. If there is not enough \
             information about a specific topic, suggest other things the user could ask \
             about the film, for example its characters, symbols, scenes or themes.",
            subject = self.subject,
        )
    }
}

/// Cut `text` to at most `max` characters, appending the marker when cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_owned(),
    }
}
