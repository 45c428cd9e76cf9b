//! Application bootstrap: config resolution, provider construction, corpus loading, ingestion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use silencio_corpus::document::{
    IngestionPipeline, SplitStrategy, SplitterConfig, TextLoader, TextSplitter,
};
use silencio_corpus::{Corpus, RecordWriter};
use silencio_llm::any::{AnyEmbedder, AnyGenerator};
use silencio_llm::gemini::GeminiProvider;
use silencio_llm::ollama::OllamaProvider;
use silencio_llm::openai::OpenAiProvider;
use silencio_llm::{Embedder, Generator};

use crate::assistant::Assistant;
use crate::config::{Config, EmbedderKind, GeneratorKind, resolve_config_path};
use crate::prompt::PromptBuilder;
use crate::vault::{EnvVaultProvider, VaultProvider};

pub type AppAssistant = Assistant<AnyEmbedder, AnyGenerator>;

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

impl AppBuilder {
    /// Resolve the config path, load it, and resolve secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed or is invalid.
    pub async fn from_env(cli_config: Option<&Path>) -> anyhow::Result<Self> {
        Self::with_vault(cli_config, &EnvVaultProvider).await
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be parsed or is invalid, or the vault fails.
    pub async fn with_vault(
        cli_config: Option<&Path>,
        vault: &dyn VaultProvider,
    ) -> anyhow::Result<Self> {
        let config_path = resolve_config_path(cli_config);
        let mut config = Config::load(&config_path)
            .with_context(|| format!("invalid config {}", config_path.display()))?;
        config.resolve_secrets(vault).await?;
        tracing::debug!(path = %config_path.display(), "config loaded");
        Ok(Self {
            config,
            config_path,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the corpus and wire the query pipeline.
    ///
    /// A provider that cannot be constructed is logged and left out, so the
    /// assistant answers with the unavailability text instead of refusing to start.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus file is missing or holds no valid records.
    pub fn build_assistant(&self) -> anyhow::Result<AppAssistant> {
        let corpus = load_corpus(Path::new(&self.config.corpus.path))?;
        let embedder = create_embedder(&self.config, None)
            .inspect_err(|e| tracing::warn!("embedder unavailable: {e:#}"))
            .ok();
        let generator = create_generator(&self.config)
            .inspect_err(|e| tracing::warn!("generator unavailable: {e:#}"))
            .ok();
        Ok(assemble(&self.config, corpus, embedder, generator))
    }
}

/// Wire an assistant from already constructed parts.
pub fn assemble<E: Embedder, G: Generator>(
    config: &Config,
    corpus: Arc<Corpus>,
    embedder: Option<E>,
    generator: Option<G>,
) -> Assistant<E, G> {
    let prompt = PromptBuilder::new(config.assistant.subject.clone())
        .with_max_chars(config.assistant.max_context_chars);
    Assistant::new(corpus, embedder, generator)
        .with_prompt(prompt)
        .with_timeouts(config.timeouts)
}

/// # Errors
///
/// Returns an error naming the missing file, or if it holds no valid records.
pub fn load_corpus(path: &Path) -> anyhow::Result<Arc<Corpus>> {
    let corpus = Corpus::load(path).with_context(|| {
        format!(
            "cannot load corpus {}; run `silencio ingest` first",
            path.display()
        )
    })?;
    Ok(Arc::new(corpus))
}

/// Build the configured embedder. `model` overrides the configured embedding model.
///
/// # Errors
///
/// Returns an error if a required credential is missing or the client cannot be built.
pub fn create_embedder(config: &Config, model: Option<&str>) -> anyhow::Result<AnyEmbedder> {
    match config.llm.embedder {
        EmbedderKind::Ollama => {
            let ollama = &config.llm.ollama;
            let embedding_model = model.map_or_else(|| ollama.embedding_model.clone(), str::to_owned);
            Ok(AnyEmbedder::Ollama(OllamaProvider::new(
                &ollama.base_url,
                ollama.model.clone(),
                embedding_model,
            )))
        }
        EmbedderKind::OpenAi => {
            let openai = &config.llm.openai;
            let api_key = config
                .secrets
                .openai_api_key
                .as_ref()
                .context("openai embedder requires SILENCIO_OPENAI_API_KEY")?;
            let embedding_model = model.map_or_else(|| openai.embedding_model.clone(), str::to_owned);
            let provider = OpenAiProvider::new(
                api_key.expose().to_owned(),
                openai.base_url.clone(),
                openai.model.clone(),
                openai.max_tokens,
                Some(embedding_model),
            )?;
            Ok(AnyEmbedder::OpenAi(provider))
        }
    }
}

/// # Errors
///
/// Returns an error if a required credential is missing or the client cannot be built.
pub fn create_generator(config: &Config) -> anyhow::Result<AnyGenerator> {
    match config.llm.generator {
        GeneratorKind::Gemini => {
            let gemini = &config.llm.gemini;
            let api_key = config
                .secrets
                .gemini_api_key
                .as_ref()
                .context("gemini generator requires SILENCIO_GEMINI_API_KEY or GOOGLE_API_KEY")?;
            let provider = GeminiProvider::new(
                api_key.expose().to_owned(),
                &gemini.base_url,
                gemini.model.clone(),
                gemini.max_tokens,
            )?;
            Ok(AnyGenerator::Gemini(provider))
        }
        GeneratorKind::OpenAi => {
            let openai = &config.llm.openai;
            let api_key = config
                .secrets
                .openai_api_key
                .as_ref()
                .context("openai generator requires SILENCIO_OPENAI_API_KEY")?;
            let provider = OpenAiProvider::new(
                api_key.expose().to_owned(),
                openai.base_url.clone(),
                openai.model.clone(),
                openai.max_tokens,
                None,
            )?;
            Ok(AnyGenerator::OpenAi(provider))
        }
        GeneratorKind::Ollama => {
            let ollama = &config.llm.ollama;
            Ok(AnyGenerator::Ollama(OllamaProvider::new(
                &ollama.base_url,
                ollama.model.clone(),
                ollama.embedding_model.clone(),
            )))
        }
    }
}

/// Parameters of one offline ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub strategy: SplitStrategy,
    pub batch_size: usize,
    /// Embedding model override; `None` keeps the configured one.
    pub model: Option<String>,
}

impl IngestOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            input: PathBuf::from(&config.corpus.input),
            output: PathBuf::from(&config.corpus.path),
            chunk_size: config.corpus.chunk_size,
            chunk_overlap: config.corpus.chunk_overlap,
            strategy: config.corpus.strategy,
            batch_size: config.corpus.embed_batch_size,
            model: None,
        }
    }
}

/// Split, embed and write the corpus. Returns the number of chunks written.
///
/// # Errors
///
/// Returns an error if the input is missing, no chunks are produced, the
/// embedder fails, or the corpus file cannot be written.
pub async fn ingest<E: Embedder>(options: &IngestOptions, embedder: E) -> anyhow::Result<usize> {
    if !options.input.is_file() {
        bail!("input file not found: {}", options.input.display());
    }
    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size: options.chunk_size,
        chunk_overlap: options.chunk_overlap,
        strategy: options.strategy,
    })?;
    tracing::info!(
        input = %options.input.display(),
        output = %options.output.display(),
        chunk_size = options.chunk_size,
        chunk_overlap = options.chunk_overlap,
        embedder = embedder.name(),
        "starting ingestion"
    );

    let pipeline = IngestionPipeline::new(splitter, embedder, RecordWriter::new(&options.output))
        .with_batch_size(options.batch_size);
    let count = pipeline
        .load_and_ingest(&TextLoader::default(), &options.input)
        .await
        .with_context(|| format!("ingestion of {} failed", options.input.display()))?;
    Ok(count)
}

/// Ingest with the configured embedder, constructed for this run.
///
/// # Errors
///
/// Returns an error if the embedder cannot be constructed or ingestion fails.
pub async fn ingest_with_config(config: &Config, options: &IngestOptions) -> anyhow::Result<usize> {
    let embedder = create_embedder(config, options.model.as_deref())?;
    if let AnyEmbedder::Ollama(ollama) = &embedder {
        ollama
            .health_check()
            .await
            .with_context(|| format!("ollama not reachable at {}", config.llm.ollama.base_url))?;
    }
    ingest(options, embedder).await
}
