use crate::types::TaskType;
use async_trait::async_trait;
use folio_common::Result;

/// Common trait for embedding backends
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for non-empty text
    async fn embed(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>>;

    /// Model name recorded alongside generated vectors
    fn model(&self) -> &str;
}
