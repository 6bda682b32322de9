use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::TextExtractor;
use crate::history::HistoryStore;
use crate::llm_client::ModelClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when `GOOGLE_API_KEY` is not configured.
    pub llm: Option<Arc<dyn ModelClient>>,
    pub extractor: Arc<dyn TextExtractor>,
    /// Session history. The mutex makes the store the single owner of history mutation.
    pub history: Arc<Mutex<HistoryStore>>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        llm: Option<Arc<dyn ModelClient>>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            llm,
            extractor,
            history: Arc::new(Mutex::new(HistoryStore::new())),
            config,
        }
    }

    /// The model client, or a configuration error if no credential was provided.
    pub fn llm(&self) -> Result<&dyn ModelClient, AppError> {
        self.llm.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "GOOGLE_API_KEY is not set. Configure it and restart the service.".to_string(),
            )
        })
    }
}
