use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the corpus snapshot is stored
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Origin allowed to call the API from a browser
    pub allowed_origin: String,
    /// Maximum accepted upload size in MB
    pub max_upload_mb: usize,
    /// Number of chunks retrieved to ground an answer
    pub top_k: usize,
    /// Word-window chunking parameters
    pub chunking: ChunkingConfig,
    /// LLM provider configuration
    pub llm: LlmConfig,
}

/// Word-window chunking parameters.
///
/// Each chunk starts `stride` words after the previous one and spans `window`
/// words, so consecutive chunks share `window - stride` words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub window: usize,
    pub stride: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window: 110,
            stride: 100,
        }
    }
}

impl ChunkingConfig {
    /// Words shared by two consecutive chunks of the same page.
    pub fn overlap(&self) -> usize {
        self.window.saturating_sub(self.stride)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.stride == 0 {
            anyhow::bail!("Chunk stride must be at least 1 word");
        }
        if self.window < self.stride {
            anyhow::bail!(
                "Chunk window ({}) is smaller than the stride ({}); words between windows would be lost",
                self.window,
                self.stride
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama", "openai" or "gemini"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for answer generation
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension, fixed for the process lifetime
    pub embedding_dim: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:8000".to_string(),
            allowed_origin: "http://localhost:5173".to_string(),
            max_upload_mb: 25,
            top_k: 3,
            chunking: ChunkingConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            embedding_model: "all-minilm".to_string(),
            api_key: None,
            embedding_dim: 384,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("DOC_RAG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("DOC_RAG_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(origin) = std::env::var("DOC_RAG_ALLOWED_ORIGIN") {
            config.allowed_origin = origin;
        }
        if let Ok(val) = std::env::var("DOC_RAG_MAX_UPLOAD_MB") {
            if let Ok(v) = val.parse() {
                config.max_upload_mb = v;
            }
        }
        if let Ok(val) = std::env::var("DOC_RAG_TOP_K") {
            if let Ok(v) = val.parse() {
                config.top_k = v;
            }
        }
        if let Ok(val) = std::env::var("DOC_RAG_CHUNK_WINDOW") {
            if let Ok(v) = val.parse() {
                config.chunking.window = v;
            }
        }
        if let Ok(val) = std::env::var("DOC_RAG_CHUNK_STRIDE") {
            if let Ok(v) = val.parse() {
                config.chunking.stride = v;
            }
        }

        // LLM config
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
            if config.llm.provider == "gemini" {
                config.llm.base_url = "https://generativelanguage.googleapis.com".to_string();
                config.llm.chat_model = "gemini-flash-latest".to_string();
                config.llm.embedding_model = "text-embedding-004".to_string();
                config.llm.embedding_dim = 768;
            }
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY").or_else(|_| std::env::var("GOOGLE_API_KEY")) {
            config.llm.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("LLM_EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }

        config
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.chunking.validate()?;
        if self.llm.embedding_dim == 0 {
            anyhow::bail!("Embedding dimension must be positive");
        }
        if self.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        Ok(())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(crate::corpus::snapshot::INDEX_BLOB)
    }

    pub fn docstore_path(&self) -> PathBuf {
        self.data_dir.join(crate::corpus::snapshot::DOCSTORE_BLOB)
    }
}
