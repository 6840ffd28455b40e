use std::sync::Arc;

use crate::config::Config;
use crate::corpus::CorpusManager;
use crate::llm::{Generator, HttpEmbedder, HttpGenerator};
use crate::storage::FsBlobStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub corpus: Arc<CorpusManager>,
    pub generator: Arc<dyn Generator>,
}

impl AppState {
    /// Wire the corpus to on-disk storage and the configured LLM provider,
    /// loading any existing snapshot.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let store = Arc::new(FsBlobStore::open(&config.data_dir)?);
        let embedder = Arc::new(HttpEmbedder::new(http_client.clone(), config.llm.clone()));
        let generator = Arc::new(HttpGenerator::new(http_client, config.llm.clone()));
        let corpus = CorpusManager::open(store, embedder, config.chunking)?;

        Ok(Self::from_parts(config, Arc::new(corpus), generator))
    }

    pub fn from_parts(config: Config, corpus: Arc<CorpusManager>, generator: Arc<dyn Generator>) -> Self {
        Self {
            config,
            corpus,
            generator,
        }
    }
}
