use folio_common::{AppConfig, Result};
use folio_vector::VectorSearchEngine;
use std::sync::Arc;

use crate::job_manager::JobManager;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Embedding and search engine
    pub engine: Arc<VectorSearchEngine>,

    /// Background refresh jobs
    pub job_manager: Arc<JobManager>,
}

impl AppState {
    /// Create application state from configuration
    pub async fn new(config: AppConfig) -> Result<Self> {
        let engine = VectorSearchEngine::from_config(&config).await?;
        Ok(Self::with_engine(config, engine))
    }

    /// Create application state around an existing engine
    pub fn with_engine(config: AppConfig, engine: VectorSearchEngine) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            job_manager: Arc::new(JobManager::new()),
        }
    }
}
