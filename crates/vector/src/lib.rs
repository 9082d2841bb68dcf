//! Folio Vector Search Engine
//!
//! Record embeddings, cosine similarity ranking and batch refresh

mod engine;
mod refresh;
pub mod similarity;
mod store;
mod types;

#[cfg(test)]
mod testing;

pub use engine::{
    EngineOptions, EnsuredEmbedding, SearchRequest, VectorSearchEngine, DEFAULT_TOP_K, MAX_TOP_K,
};
pub use refresh::{RefreshOutcome, RefreshProgress, RefreshReport};
pub use similarity::{cosine_similarity, rank, ScoredMatch};
pub use store::{JsonRecordStore, MemoryRecordStore, RecordStore};
pub use types::{EmbeddingInfo, EmbeddingState, IndexStats, Record, RecordKind, SearchHit};
