use std::io::Write;

use serial_test::serial;
use silencio_corpus::document::SplitStrategy;

use super::*;
use crate::vault::{MockVaultProvider, Secret};

const ENV_KEYS: [&str; 26] = [
    "SILENCIO_CONFIG",
    "SILENCIO_EMBEDDER",
    "SILENCIO_GENERATOR",
    "SILENCIO_GEMINI_MODEL",
    "SILENCIO_GEMINI_BASE_URL",
    "SILENCIO_OPENAI_BASE_URL",
    "SILENCIO_OPENAI_MODEL",
    "SILENCIO_OPENAI_EMBEDDING_MODEL",
    "SILENCIO_OLLAMA_BASE_URL",
    "SILENCIO_OLLAMA_MODEL",
    "SILENCIO_OLLAMA_EMBEDDING_MODEL",
    "SILENCIO_CORPUS_INPUT",
    "SILENCIO_CORPUS_PATH",
    "SILENCIO_CHUNK_SIZE",
    "SILENCIO_CHUNK_OVERLAP",
    "SILENCIO_SPLIT_STRATEGY",
    "SILENCIO_SUBJECT",
    "SILENCIO_TOP_K",
    "SILENCIO_MAX_CONTEXT_CHARS",
    "SILENCIO_TIMEOUT_LLM",
    "SILENCIO_TIMEOUT_EMBEDDING",
    "SILENCIO_GATEWAY_BIND",
    "SILENCIO_GATEWAY_PORT",
    "SILENCIO_GATEWAY_RATE_LIMIT",
    "SILENCIO_GEMINI_API_KEY",
    "GOOGLE_API_KEY",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

fn write_config(body: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(f, "{body}").unwrap();
    (dir, path)
}

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.assistant.subject, "Mulholland Drive");
    assert_eq!(config.assistant.top_k, 5);
    assert_eq!(config.assistant.max_context_chars, 600);
    assert_eq!(config.assistant.example_questions.len(), 6);
    assert_eq!(config.llm.embedder, EmbedderKind::Ollama);
    assert_eq!(config.llm.generator, GeneratorKind::Gemini);
    assert_eq!(config.llm.gemini.model, "gemini-2.0-flash");
    assert_eq!(config.llm.ollama.embedding_model, "all-minilm");
    assert_eq!(config.corpus.path, "chunks.jsonl");
    assert_eq!(config.corpus.chunk_size, 800);
    assert_eq!(config.corpus.chunk_overlap, 120);
    assert_eq!(config.corpus.embed_batch_size, 32);
    assert_eq!(config.gateway.bind, "127.0.0.1");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    clear_env();
    let config = Config::load(Path::new("/nonexistent/silencio.toml")).unwrap();
    assert_eq!(config.corpus.chunk_size, 800);
    assert_eq!(config.llm.generator, GeneratorKind::Gemini);
}

#[test]
#[serial]
fn parse_valid_toml() {
    let (_dir, path) = write_config(
        r#"
[assistant]
subject = "Lost Highway"
top_k = 3
example_questions = ["Who is the Mystery Man?"]

[llm]
embedder = "openai"
generator = "ollama"

[llm.ollama]
model = "qwen2.5:7b"

[corpus]
path = "./data/chunks.jsonl"
chunk_size = 500
chunk_overlap = 50
strategy = "paragraph"

[gateway]
port = 9000
"#,
    );
    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.assistant.subject, "Lost Highway");
    assert_eq!(config.assistant.top_k, 3);
    assert_eq!(config.assistant.example_questions, vec!["Who is the Mystery Man?"]);
    assert_eq!(config.assistant.max_context_chars, 600);
    assert_eq!(config.llm.embedder, EmbedderKind::OpenAi);
    assert_eq!(config.llm.generator, GeneratorKind::Ollama);
    assert_eq!(config.llm.ollama.model, "qwen2.5:7b");
    assert_eq!(config.llm.ollama.base_url, "http://localhost:11434");
    assert_eq!(config.corpus.path, "./data/chunks.jsonl");
    assert_eq!(config.corpus.strategy, SplitStrategy::Paragraph);
    assert_eq!(config.gateway.port, 9000);
}

#[test]
#[serial]
fn malformed_toml_is_an_error() {
    let (_dir, path) = write_config("[corpus\nchunk_size = ");
    clear_env();
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn unknown_generator_kind_is_an_error() {
    let (_dir, path) = write_config("[llm]\ngenerator = \"claude\"\n");
    clear_env();
    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    unsafe {
        std::env::set_var("SILENCIO_GENERATOR", "openai");
        std::env::set_var("SILENCIO_EMBEDDER", "openai");
        std::env::set_var("SILENCIO_CORPUS_PATH", "/tmp/other.jsonl");
        std::env::set_var("SILENCIO_CHUNK_SIZE", "400");
        std::env::set_var("SILENCIO_CHUNK_OVERLAP", "40");
        std::env::set_var("SILENCIO_SPLIT_STRATEGY", "paragraph");
        std::env::set_var("SILENCIO_TOP_K", "8");
        std::env::set_var("SILENCIO_TIMEOUT_LLM", "5");
        std::env::set_var("SILENCIO_GATEWAY_PORT", "9999");
    }

    let config = Config::load(Path::new("/nonexistent/silencio.toml")).unwrap();
    clear_env();

    assert_eq!(config.llm.generator, GeneratorKind::OpenAi);
    assert_eq!(config.llm.embedder, EmbedderKind::OpenAi);
    assert_eq!(config.corpus.path, "/tmp/other.jsonl");
    assert_eq!(config.corpus.chunk_size, 400);
    assert_eq!(config.corpus.chunk_overlap, 40);
    assert_eq!(config.corpus.strategy, SplitStrategy::Paragraph);
    assert_eq!(config.assistant.top_k, 8);
    assert_eq!(config.timeouts.llm_seconds, 5);
    assert_eq!(config.gateway.port, 9999);
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("SILENCIO_GENERATOR", "claude");
        std::env::set_var("SILENCIO_CHUNK_SIZE", "many");
        std::env::set_var("SILENCIO_SPLIT_STRATEGY", "sentences");
    }

    let config = Config::load(Path::new("/nonexistent/silencio.toml")).unwrap();
    clear_env();

    assert_eq!(config.llm.generator, GeneratorKind::Gemini);
    assert_eq!(config.corpus.chunk_size, 800);
    assert_eq!(config.corpus.strategy, SplitStrategy::Recursive);
}

#[test]
#[serial]
fn overlap_not_smaller_than_chunk_size_is_rejected() {
    let (_dir, path) = write_config("[corpus]\nchunk_size = 100\nchunk_overlap = 100\n");
    clear_env();
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("chunk_overlap"));
}

#[test]
fn validate_rejects_zero_values() {
    let mut config = Config::default();
    config.assistant.top_k = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.corpus.chunk_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.timeouts.embedding_seconds = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.assistant.subject = "  ".into();
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn resolve_secrets_prefers_silencio_key() {
    let vault = MockVaultProvider::new()
        .with_secret("SILENCIO_GEMINI_API_KEY", "primary")
        .with_secret("GOOGLE_API_KEY", "fallback")
        .with_secret("SILENCIO_OPENAI_API_KEY", "sk-test");
    let mut config = Config::default();
    config.resolve_secrets(&vault).await.unwrap();

    assert_eq!(
        config.secrets.gemini_api_key.as_ref().map(Secret::expose),
        Some("primary")
    );
    assert_eq!(
        config.secrets.openai_api_key.as_ref().map(Secret::expose),
        Some("sk-test")
    );
}

#[tokio::test]
async fn resolve_secrets_falls_back_to_google_key() {
    let vault = MockVaultProvider::new().with_secret("GOOGLE_API_KEY", "fallback");
    let mut config = Config::default();
    config.resolve_secrets(&vault).await.unwrap();

    assert_eq!(
        config.secrets.gemini_api_key.as_ref().map(Secret::expose),
        Some("fallback")
    );
    assert!(config.secrets.openai_api_key.is_none());
}

#[test]
fn secrets_are_redacted_in_debug() {
    let mut config = Config::default();
    config.secrets.gemini_api_key = Some(Secret::new("AIza-super-secret"));
    let debug = format!("{config:?}");
    assert!(!debug.contains("AIza-super-secret"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
#[serial]
fn config_path_resolution_order() {
    clear_env();
    assert_eq!(resolve_config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));

    unsafe { std::env::set_var("SILENCIO_CONFIG", "/etc/silencio.toml") };
    assert_eq!(resolve_config_path(None), PathBuf::from("/etc/silencio.toml"));
    assert_eq!(
        resolve_config_path(Some(Path::new("cli.toml"))),
        PathBuf::from("cli.toml")
    );
    clear_env();
}
