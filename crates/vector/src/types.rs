use chrono::{DateTime, Utc};
use folio_embed::DocumentText;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of content record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Blog,
    File,
    Folder,
    Link,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::File => "file",
            Self::Folder => "folder",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blog" => Ok(Self::Blog),
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            "link" => Ok(Self::Link),
            other => Err(format!("unknown record kind: {}", other)),
        }
    }
}

/// Stored embedding with the metadata needed to detect staleness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingInfo {
    /// Embedding vector
    pub vector: Vec<f32>,

    /// Model that produced the vector
    pub model: String,

    /// Hash of the prepared text the vector was generated from
    pub content_hash: String,

    /// Vector length
    pub dimension: usize,

    /// Generation time
    pub generated_at: DateTime<Utc>,
}

impl EmbeddingInfo {
    pub fn new(vector: Vec<f32>, model: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            dimension: vector.len(),
            vector,
            model: model.into(),
            content_hash: content_hash.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Blog post or document record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Record ID
    pub id: String,

    pub kind: RecordKind,

    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Body text (blog content or extracted document text)
    #[serde(default)]
    pub body: String,

    /// Embedding, absent until generated
    #[serde(default)]
    pub embedding: Option<EmbeddingInfo>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create new record without body or embedding
    pub fn new(id: impl Into<String>, kind: RecordKind, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            summary: String::new(),
            tags: Vec::new(),
            body: String::new(),
            embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Fields that feed the document embedding
    pub fn document_text(&self) -> DocumentText<'_> {
        DocumentText {
            title: &self.title,
            summary: &self.summary,
            tags: &self.tags,
            body: &self.body,
        }
    }
}

/// Whether a record's embedding can be trusted for ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingState {
    /// Embedding matches the current text and model
    Fresh,
    /// Embedding exists but was generated from other text, model or dimension
    Stale,
    /// No embedding yet
    Missing,
    /// Record has no text to embed
    Empty,
}

/// Search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub kind: RecordKind,
    pub title: String,

    /// Cosine similarity; 0.0 means "no signal"
    pub score: f32,
}

/// Index statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub total_records: usize,
    pub fresh: usize,
    pub stale: usize,
    pub missing: usize,
    pub empty: usize,
    pub embedding_model: String,
    pub embedding_dim: usize,
}
