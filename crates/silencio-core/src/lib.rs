//! Question answering pipeline, prompt building, configuration loading, and vault.

pub mod answer;
pub mod assistant;
pub mod bootstrap;
pub mod config;
pub mod prompt;
pub mod vault;

pub use answer::{Answer, Outcome};
pub use assistant::Assistant;
pub use config::Config;
pub use prompt::PromptBuilder;
