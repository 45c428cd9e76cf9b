use serde::Serialize;
use silencio_corpus::RetrievalResult;
use silencio_llm::error::FailureClass;

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Answered,
    EmptyQuestion,
    NoResults,
    /// Query embedding failed; the corpus could not be searched.
    EmbedderFailed,
    Unavailable,
    NotFound,
    Incomplete,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::EmptyQuestion => "empty_question",
            Self::NoResults => "no_results",
            Self::EmbedderFailed => "embedder_failed",
            Self::Unavailable => "unavailable",
            Self::NotFound => "not_found",
            Self::Incomplete => "incomplete",
        }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        self == Self::Answered
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FailureClass> for Outcome {
    fn from(class: FailureClass) -> Self {
        match class {
            FailureClass::Unavailable => Self::Unavailable,
            FailureClass::Transient => Self::NotFound,
            FailureClass::Malformed => Self::Incomplete,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub outcome: Outcome,
    /// Passages the answer was grounded on, best first.
    pub sources: Vec<RetrievalResult>,
}

impl Answer {
    #[must_use]
    pub fn canned(outcome: Outcome, subject: &str) -> Self {
        Self {
            text: canned_text(outcome, subject),
            outcome,
            sources: Vec::new(),
        }
    }
}

/// User-safe text for every outcome that is not a generated answer.
///
/// Never carries internal error detail, and always suggests a next step.
#[must_use]
pub fn canned_text(outcome: Outcome, subject: &str) -> String {
    match outcome {
        Outcome::EmptyQuestion => format!("Please enter a question about {subject}."),
        Outcome::NoResults => format!(
            "Not enough information was found on this topic. {}",
            suggestions(subject)
        ),
        Outcome::EmbedderFailed | Outcome::Unavailable => {
            "The system is currently unavailable. Please try again later.".to_owned()
        }
        Outcome::NotFound => format!(
            "Sorry, I could not find enough information on that. {}",
            suggestions(subject)
        ),
        Outcome::Incomplete => {
            "The analysis could not be completed. Please try rephrasing your question.".to_owned()
        }
        Outcome::Answered => String::new(),
    }
}

fn suggestions(subject: &str) -> String {
    format!(
        "Could you ask about another aspect of {subject}? For example its characters \
         (Betty, Diane, Rita), symbols (the blue key, Club Silencio), particular scenes, \
         or themes such as dream, reality and Hollywood."
    )
}
