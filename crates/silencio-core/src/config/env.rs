use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_corpus();
        self.apply_env_overrides_runtime();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("SILENCIO_EMBEDDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.embedder = kind;
            } else {
                tracing::warn!("ignoring invalid SILENCIO_EMBEDDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SILENCIO_GENERATOR") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.generator = kind;
            } else {
                tracing::warn!("ignoring invalid SILENCIO_GENERATOR value: {v}");
            }
        }
        if let Ok(v) = std::env::var("SILENCIO_GEMINI_MODEL") {
            self.llm.gemini.model = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_GEMINI_BASE_URL") {
            self.llm.gemini.base_url = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_OPENAI_BASE_URL") {
            self.llm.openai.base_url = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_OPENAI_MODEL") {
            self.llm.openai.model = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_OPENAI_EMBEDDING_MODEL") {
            self.llm.openai.embedding_model = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_OLLAMA_BASE_URL") {
            self.llm.ollama.base_url = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_OLLAMA_MODEL") {
            self.llm.ollama.model = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_OLLAMA_EMBEDDING_MODEL") {
            self.llm.ollama.embedding_model = v;
        }
    }

    fn apply_env_overrides_corpus(&mut self) {
        if let Ok(v) = std::env::var("SILENCIO_CORPUS_INPUT") {
            self.corpus.input = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_CORPUS_PATH") {
            self.corpus.path = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_CHUNK_SIZE")
            && let Ok(size) = v.parse::<usize>()
        {
            self.corpus.chunk_size = size;
        }
        if let Ok(v) = std::env::var("SILENCIO_CHUNK_OVERLAP")
            && let Ok(overlap) = v.parse::<usize>()
        {
            self.corpus.chunk_overlap = overlap;
        }
        if let Ok(v) = std::env::var("SILENCIO_SPLIT_STRATEGY") {
            match v.parse() {
                Ok(strategy) => self.corpus.strategy = strategy,
                Err(_) => tracing::warn!("ignoring invalid SILENCIO_SPLIT_STRATEGY value: {v}"),
            }
        }
    }

    fn apply_env_overrides_runtime(&mut self) {
        if let Ok(v) = std::env::var("SILENCIO_SUBJECT")
            && !v.trim().is_empty()
        {
            self.assistant.subject = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.assistant.top_k = k;
        }
        if let Ok(v) = std::env::var("SILENCIO_MAX_CONTEXT_CHARS")
            && let Ok(n) = v.parse::<usize>()
        {
            self.assistant.max_context_chars = n;
        }
        if let Ok(v) = std::env::var("SILENCIO_TIMEOUT_LLM")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.llm_seconds = secs;
        }
        if let Ok(v) = std::env::var("SILENCIO_TIMEOUT_EMBEDDING")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.timeouts.embedding_seconds = secs;
        }
        if let Ok(v) = std::env::var("SILENCIO_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("SILENCIO_GATEWAY_PORT")
            && let Ok(port) = v.parse::<u16>()
        {
            self.gateway.port = port;
        }
        if let Ok(v) = std::env::var("SILENCIO_GATEWAY_RATE_LIMIT")
            && let Ok(limit) = v.parse::<u32>()
        {
            self.gateway.rate_limit = limit;
        }
    }
}
