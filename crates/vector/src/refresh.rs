//! Batch embedding refresh.
//!
//! Records are embedded in fixed-size batches. Items inside a batch run
//! concurrently, batches run one after another with a pause in between so
//! the provider's rate limit is respected. A failing record is reported and
//! never stops the run.

use folio_common::Result;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::engine::VectorSearchEngine;
use crate::types::{EmbeddingState, Record};

/// Progress after a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RefreshProgress {
    pub processed: usize,
    pub total: usize,
    pub percentage: f32,
}

impl RefreshProgress {
    fn new(processed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            processed as f32 * 100.0 / total as f32
        };
        Self {
            processed,
            total,
            percentage,
        }
    }
}

/// Per-record result
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub id: String,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Whole-run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    pub outcomes: Vec<RefreshOutcome>,
}

impl RefreshReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RefreshOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

impl VectorSearchEngine {
    /// Records that need a (new) embedding.
    ///
    /// Without `force` that is every record lacking an embedding plus every
    /// record whose embedding is stale. With `force`, every record with text.
    pub async fn working_set(&self, force: bool) -> Result<Vec<Record>> {
        let mut set: BTreeMap<String, Record> = BTreeMap::new();

        if !force {
            for record in self.store.list_missing_embeddings().await? {
                if self.embedding_state(&record) == EmbeddingState::Missing {
                    set.insert(record.id.clone(), record);
                }
            }
        }

        for record in self.store.list().await? {
            let wanted = match self.embedding_state(&record) {
                EmbeddingState::Empty => false,
                EmbeddingState::Stale => true,
                EmbeddingState::Missing | EmbeddingState::Fresh => force,
            };
            if wanted {
                set.insert(record.id.clone(), record);
            }
        }

        Ok(set.into_values().collect())
    }

    /// Regenerate embeddings for the working set.
    ///
    /// `on_progress` is called once after every batch.
    pub async fn refresh<F>(&self, force: bool, mut on_progress: F) -> Result<RefreshReport>
    where
        F: FnMut(RefreshProgress) + Send,
    {
        let records = self.working_set(force).await?;
        let total = records.len();
        let batch_size = self.options.batch_size.max(1);
        let batch_count = total.div_ceil(batch_size);

        info!(
            "Starting embedding refresh: {} records in {} batches (force={})",
            total, batch_count, force
        );

        let mut report = RefreshReport::default();

        for (index, batch) in records.chunks(batch_size).enumerate() {
            debug!("Refresh batch {}/{} ({} records)", index + 1, batch_count, batch.len());

            let results = join_all(batch.iter().map(|record| self.embed_record(record, force))).await;

            for (record, result) in batch.iter().zip(results) {
                let outcome = match result {
                    Ok(_) => RefreshOutcome {
                        id: record.id.clone(),
                        success: true,
                        error: None,
                    },
                    Err(e) => {
                        warn!("Failed to refresh embedding for {}: {}", record.id, e);
                        RefreshOutcome {
                            id: record.id.clone(),
                            success: false,
                            error: Some(e.to_string()),
                        }
                    }
                };
                report.outcomes.push(outcome);
            }

            on_progress(RefreshProgress::new(report.total(), total));

            if index + 1 < batch_count && !self.options.batch_delay.is_zero() {
                tokio::time::sleep(self.options.batch_delay).await;
            }
        }

        info!(
            "Embedding refresh completed: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use crate::testing::{engine_with, FakeProvider};
    use crate::types::RecordKind;
    use std::sync::Arc;

    fn records(n: usize, failing: &[usize]) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let title = if failing.contains(&i) {
                    format!("FAIL post {}", i)
                } else {
                    format!("rust post {}", i)
                };
                Record::new(format!("r{:02}", i), RecordKind::Blog, title)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_refresh_reports_every_record() {
        let provider = Arc::new(FakeProvider::new());
        let (engine, _) = engine_with(provider, records(8, &[2, 6]));

        let report = engine.refresh(false, |_| {}).await.unwrap();

        assert_eq!(report.total(), 8);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.succeeded(), 6);
        let failed: Vec<_> = report.failures().map(|o| o.id.as_str()).collect();
        assert_eq!(failed, vec!["r02", "r06"]);
        assert!(report.failures().all(|o| o.error.is_some()));
    }

    #[tokio::test]
    async fn test_refresh_progress_per_batch() {
        let provider = Arc::new(FakeProvider::new());
        // batch size 3 -> batches of 3, 3, 1
        let (engine, _) = engine_with(provider, records(7, &[]));

        let mut seen = Vec::new();
        engine.refresh(false, |p| seen.push(p)).await.unwrap();

        let processed: Vec<_> = seen.iter().map(|p| p.processed).collect();
        assert_eq!(processed, vec![3, 6, 7]);
        assert!(seen.iter().all(|p| p.total == 7));
        assert_eq!(seen.last().unwrap().percentage, 100.0);
    }

    #[tokio::test]
    async fn test_refresh_skips_fresh_records() {
        let provider = Arc::new(FakeProvider::new());
        let (engine, store) = engine_with(provider.clone(), records(4, &[]));

        engine.refresh(false, |_| {}).await.unwrap();
        assert_eq!(provider.calls(), 4);

        let again = engine.refresh(false, |_| {}).await.unwrap();
        assert_eq!(again.total(), 0);
        assert_eq!(provider.calls(), 4);

        let mut edited = store.get("r01").await.unwrap().unwrap();
        edited.summary = "new summary".to_string();
        store.save(edited).await.unwrap();

        let stale = engine.refresh(false, |_| {}).await.unwrap();
        assert_eq!(stale.total(), 1);
        assert_eq!(stale.outcomes[0].id, "r01");
        assert_eq!(provider.calls(), 5);
    }

    #[tokio::test]
    async fn test_refresh_force_regenerates_all() {
        let provider = Arc::new(FakeProvider::new());
        let mut all = records(3, &[]);
        all.push(Record::new("blank", RecordKind::Folder, " "));
        let (engine, _) = engine_with(provider.clone(), all);

        engine.refresh(false, |_| {}).await.unwrap();
        let forced = engine.refresh(true, |_| {}).await.unwrap();

        assert_eq!(forced.total(), 3);
        assert_eq!(forced.succeeded(), 3);
        assert_eq!(provider.calls(), 6);
    }

    #[tokio::test]
    async fn test_refresh_empty_working_set() {
        let provider = Arc::new(FakeProvider::new());
        let (engine, _) = engine_with(provider, Vec::new());

        let mut calls = 0;
        let report = engine.refresh(false, |_| calls += 1).await.unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(calls, 0);
    }
}
