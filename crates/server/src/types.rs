use chrono::{DateTime, Utc};
use folio_common::{FolioError, Result};
use folio_vector::{
    EmbeddingInfo, EmbeddingState, Record, RecordKind, RefreshReport, SearchHit, SearchRequest,
    DEFAULT_TOP_K,
};
use serde::{Deserialize, Serialize};

/// Create/replace record request
#[derive(Debug, Deserialize)]
pub struct RecordPayload {
    /// Record ID (generated when absent)
    pub id: Option<String>,

    pub kind: RecordKind,

    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub body: String,
}

impl RecordPayload {
    /// Validate and convert into a record
    pub fn into_record(self) -> Result<Record> {
        if self.title.trim().is_empty() {
            return Err(FolioError::invalid_input("title cannot be empty"));
        }
        let id = match self.id {
            Some(id) if id.trim().is_empty() => {
                return Err(FolioError::invalid_input("id cannot be blank"))
            }
            Some(id) => id.trim().to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Record::new(id, self.kind, self.title.trim())
            .with_summary(self.summary)
            .with_tags(self.tags.into_iter().filter(|t| !t.trim().is_empty()))
            .with_body(self.body))
    }
}

/// Embedding metadata without the raw vector
#[derive(Debug, Serialize)]
pub struct EmbeddingMeta {
    pub model: String,
    pub dimension: usize,
    pub content_hash: String,
    pub generated_at: DateTime<Utc>,
}

impl From<&EmbeddingInfo> for EmbeddingMeta {
    fn from(info: &EmbeddingInfo) -> Self {
        Self {
            model: info.model.clone(),
            dimension: info.dimension,
            content_hash: info.content_hash.clone(),
            generated_at: info.generated_at,
        }
    }
}

/// Record as returned by the API
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub id: String,
    pub kind: RecordKind,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub embedding_state: EmbeddingState,
    pub embedding: Option<EmbeddingMeta>,
}

impl RecordView {
    pub fn new(record: &Record, state: EmbeddingState) -> Self {
        Self {
            id: record.id.clone(),
            kind: record.kind,
            title: record.title.clone(),
            summary: record.summary.clone(),
            tags: record.tags.clone(),
            body: record.body.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            embedding_state: state,
            embedding: record.embedding.as_ref().map(EmbeddingMeta::from),
        }
    }
}

/// Ensure-embedding query string
#[derive(Debug, Default, Deserialize)]
pub struct ForceQuery {
    #[serde(default)]
    pub force: bool,
}

/// Ensure-embedding response
#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub id: String,
    pub regenerated: bool,
    pub embedding: EmbeddingMeta,
}

/// Search query
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query text
    pub q: String,

    /// Top K results
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Restrict to one record kind
    pub kind: Option<String>,

    /// Drop results scoring below this
    pub min_score: Option<f32>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl SearchQuery {
    /// Validate into an engine request
    pub fn to_request(&self) -> Result<SearchRequest> {
        let kind = self
            .kind
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|k| k.parse::<RecordKind>().map_err(FolioError::invalid_input))
            .transpose()?;

        SearchRequest::new(self.q.clone(), self.top_k)?
            .with_kind(kind)
            .with_min_score(self.min_score)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

/// Task status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

/// Background task information
#[derive(Debug, Clone, Serialize)]
pub struct TaskInfo {
    pub task_id: String,

    pub task_type: String,

    pub status: TaskStatus,

    /// Progress percentage (0-100)
    pub progress: u8,

    pub message: String,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Per-record outcomes once finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RefreshReport>,
}

/// Refresh started response
#[derive(Debug, Serialize)]
pub struct RefreshStartedResponse {
    pub task_id: String,
    pub message: String,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
