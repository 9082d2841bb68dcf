//! Test doubles shared by the engine and refresh tests.

use async_trait::async_trait;
use folio_common::{FolioError, Result};
use folio_embed::{EmbeddingProvider, TaskType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{EngineOptions, VectorSearchEngine};
use crate::store::MemoryRecordStore;
use crate::types::Record;

const VOCABULARY: [&str; 4] = ["rust", "cooking", "music", "travel"];

pub const DIM: usize = VOCABULARY.len();

/// Bag-of-words provider over a tiny vocabulary.
///
/// Text containing `FAIL` makes the call fail.
pub struct FakeProvider {
    calls: AtomicUsize,
    dimension: usize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::with_dimension(DIM)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            dimension,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeProvider {
    async fn embed(&self, text: &str, _task_type: TaskType) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("FAIL") {
            return Err(FolioError::embedding_failed("injected failure"));
        }

        let lower = text.to_lowercase();
        let mut vector = vec![0.1; self.dimension];
        for (slot, word) in vector.iter_mut().zip(VOCABULARY) {
            *slot += lower.matches(word).count() as f32;
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        "fake-embedding"
    }
}

pub fn options() -> EngineOptions {
    EngineOptions {
        embedding_dim: DIM,
        body_word_limit: 100,
        batch_size: 3,
        batch_delay: Duration::from_millis(1),
    }
}

pub fn engine_with(
    provider: Arc<FakeProvider>,
    records: impl IntoIterator<Item = Record>,
) -> (VectorSearchEngine, Arc<MemoryRecordStore>) {
    let store = Arc::new(MemoryRecordStore::with_records(records));
    let engine = VectorSearchEngine::new(store.clone(), provider, options());
    (engine, store)
}
