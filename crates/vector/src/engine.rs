use folio_common::{AppConfig, FolioError, Result};
use folio_embed::{
    content_hash, prepare_document, prepare_query, EmbeddingProvider, GeminiClient, TaskType,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::similarity::rank;
use crate::store::{JsonRecordStore, RecordStore};
use crate::types::{EmbeddingInfo, EmbeddingState, IndexStats, Record, RecordKind, SearchHit};

/// Default number of search results
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound on requested search results
pub const MAX_TOP_K: usize = 100;

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Expected vector length for the configured model
    pub embedding_dim: usize,

    /// Body word budget for document input
    pub body_word_limit: usize,

    /// Records per refresh batch
    pub batch_size: usize,

    /// Pause between refresh batches
    pub batch_delay: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            embedding_dim: config.embedding_dim,
            body_word_limit: config.body_word_limit,
            batch_size: config.embed_batch_size.max(1),
            batch_delay: config.batch_delay(),
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Validated search request
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub kind: Option<RecordKind>,
    pub min_score: Option<f32>,
}

impl SearchRequest {
    /// Build a request, rejecting empty queries and out-of-range limits
    pub fn new(query: impl Into<String>, top_k: usize) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(FolioError::invalid_input("query cannot be empty"));
        }
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(FolioError::invalid_input(format!(
                "top_k must be between 1 and {}",
                MAX_TOP_K
            )));
        }
        Ok(Self {
            query,
            top_k,
            kind: None,
            min_score: None,
        })
    }

    pub fn with_kind(mut self, kind: Option<RecordKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_min_score(mut self, min_score: Option<f32>) -> Result<Self> {
        if let Some(score) = min_score {
            if !(-1.0..=1.0).contains(&score) {
                return Err(FolioError::invalid_input("min_score must be within [-1, 1]"));
            }
        }
        self.min_score = min_score;
        Ok(self)
    }
}

/// Result of [`VectorSearchEngine::ensure_embedding`]
#[derive(Debug, Clone)]
pub struct EnsuredEmbedding {
    pub embedding: EmbeddingInfo,

    /// False when the stored embedding was reused
    pub regenerated: bool,
}

/// Vector search engine over a record store
pub struct VectorSearchEngine {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) provider: Arc<dyn EmbeddingProvider>,
    pub(crate) options: EngineOptions,
}

impl VectorSearchEngine {
    /// Create new vector search engine
    pub fn new(
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn EmbeddingProvider>,
        options: EngineOptions,
    ) -> Self {
        info!(
            "Vector search engine initialized - model={}, dim={}",
            provider.model(),
            options.embedding_dim
        );
        Self {
            store,
            provider,
            options,
        }
    }

    /// Wire the Gemini client and the JSON record store from configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = GeminiClient::from_config(config)?;
        let store = JsonRecordStore::open(&config.records_path).await?;
        Ok(Self::new(
            Arc::new(store),
            Arc::new(provider),
            EngineOptions::from_config(config),
        ))
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Prepared document input and its hash, `None` if the record has no text
    fn prepared(&self, record: &Record) -> Option<(String, String)> {
        let text = prepare_document(record.document_text(), self.options.body_word_limit)?;
        let hash = content_hash(&text);
        Some((text, hash))
    }

    /// Classify a record's embedding against its current text and model
    pub fn embedding_state(&self, record: &Record) -> EmbeddingState {
        let Some((_, hash)) = self.prepared(record) else {
            return EmbeddingState::Empty;
        };
        match &record.embedding {
            None => EmbeddingState::Missing,
            Some(e)
                if e.content_hash == hash
                    && e.model == self.provider.model()
                    && e.dimension == self.options.embedding_dim
                    && e.vector.len() == e.dimension =>
            {
                EmbeddingState::Fresh
            }
            Some(_) => EmbeddingState::Stale,
        }
    }

    /// Generate a query embedding
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let text = prepare_query(query)
            .ok_or_else(|| FolioError::invalid_input("query cannot be empty"))?;
        let vector = self.provider.embed(&text, TaskType::RetrievalQuery).await?;
        self.check_dimension(&vector)?;
        Ok(vector)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.options.embedding_dim {
            return Err(FolioError::dimension_mismatch(
                self.options.embedding_dim,
                vector.len(),
            ));
        }
        Ok(())
    }

    /// Make sure a record has an embedding matching its current text.
    ///
    /// Reuses the stored vector without calling the provider unless it is
    /// stale or `force` is set.
    pub async fn ensure_embedding(&self, id: &str, force: bool) -> Result<EnsuredEmbedding> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| FolioError::not_found(format!("record {}", id)))?;
        self.embed_record(&record, force).await
    }

    pub(crate) async fn embed_record(&self, record: &Record, force: bool) -> Result<EnsuredEmbedding> {
        let (text, hash) = self.prepared(record).ok_or_else(|| {
            FolioError::invalid_input(format!("record {} has no text to embed", record.id))
        })?;

        if !force && self.embedding_state(record) == EmbeddingState::Fresh {
            if let Some(existing) = &record.embedding {
                debug!("Embedding for {} is up to date, skipping", record.id);
                return Ok(EnsuredEmbedding {
                    embedding: existing.clone(),
                    regenerated: false,
                });
            }
        }

        info!("Generating embedding for record: {}", record.id);
        let vector = self.provider.embed(&text, TaskType::RetrievalDocument).await?;
        self.check_dimension(&vector)?;

        let embedding = EmbeddingInfo::new(vector, self.provider.model(), hash);
        self.store.set_embedding(&record.id, embedding.clone()).await?;

        Ok(EnsuredEmbedding {
            embedding,
            regenerated: true,
        })
    }

    /// Insert or replace a record, then embed it best-effort.
    ///
    /// Embedding failures are logged; the record is saved regardless.
    pub async fn upsert_record(&self, mut record: Record) -> Result<Record> {
        if record.id.trim().is_empty() {
            return Err(FolioError::invalid_input("record id cannot be empty"));
        }

        if let Some(existing) = self.store.get(&record.id).await? {
            record.created_at = existing.created_at;
            if record.embedding.is_none() {
                record.embedding = existing.embedding;
            }
        }
        record.updated_at = chrono::Utc::now();
        self.store.save(record.clone()).await?;

        match self.embed_record(&record, false).await {
            Ok(ensured) => record.embedding = Some(ensured.embedding),
            Err(FolioError::InvalidInput(msg)) => debug!("Not embedding {}: {}", record.id, msg),
            Err(e) => warn!("Failed to embed record {}: {}", record.id, e),
        }

        Ok(record)
    }

    /// Delete record and its embedding
    pub async fn delete_record(&self, id: &str) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(FolioError::not_found(format!("record {}", id)));
        }
        info!("Record deleted: {}", id);
        Ok(())
    }

    /// Rank records by similarity to a query.
    ///
    /// Only fresh embeddings take part; stale ones are skipped until they
    /// are refreshed.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        debug!(
            "Searching for: {} (top_k={}, kind={:?})",
            request.query, request.top_k, request.kind
        );

        let query = self.embed_query(&request.query).await?;
        let records = self.store.list().await?;
        let total_candidates = records.len();

        let mut skipped = 0usize;
        let candidates: Vec<&Record> = records
            .iter()
            .filter(|r| request.kind.map_or(true, |k| r.kind == k))
            .filter(|r| match self.embedding_state(r) {
                EmbeddingState::Fresh => true,
                EmbeddingState::Stale => {
                    skipped += 1;
                    false
                }
                _ => false,
            })
            .collect();

        if skipped > 0 {
            warn!("Skipped {} records with stale embeddings", skipped);
        }

        let by_id: HashMap<&str, &Record> = candidates.iter().map(|r| (r.id.as_str(), *r)).collect();
        let ranked = rank(
            &query,
            candidates.iter().filter_map(|r| {
                r.embedding
                    .as_ref()
                    .map(|e| (r.id.as_str(), e.vector.as_slice()))
            }),
            request.top_k,
            request.min_score,
        )?;

        let hits: Vec<SearchHit> = ranked
            .into_iter()
            .filter_map(|m| {
                by_id.get(m.id).map(|r| SearchHit {
                    id: r.id.clone(),
                    kind: r.kind,
                    title: r.title.clone(),
                    score: m.score,
                })
            })
            .collect();

        info!(
            "Search completed - {} results (from {} candidates)",
            hits.len(),
            total_candidates
        );
        Ok(hits)
    }

    /// Get index statistics
    pub async fn stats(&self) -> Result<IndexStats> {
        let records = self.store.list().await?;
        let mut stats = IndexStats {
            total_records: records.len(),
            embedding_model: self.provider.model().to_string(),
            embedding_dim: self.options.embedding_dim,
            ..IndexStats::default()
        };

        for record in &records {
            match self.embedding_state(record) {
                EmbeddingState::Fresh => stats.fresh += 1,
                EmbeddingState::Stale => stats.stale += 1,
                EmbeddingState::Missing => stats.missing += 1,
                EmbeddingState::Empty => stats.empty += 1,
            }
        }

        Ok(stats)
    }
}
