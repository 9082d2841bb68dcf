use async_trait::async_trait;
use folio_common::{FolioError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::types::{EmbeddingInfo, Record};

/// Persistence layer for records and their embeddings
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load record by id
    async fn get(&self, id: &str) -> Result<Option<Record>>;

    /// Insert or replace a record
    async fn save(&self, record: Record) -> Result<()>;

    /// All records, ordered by id
    async fn list(&self) -> Result<Vec<Record>>;

    /// Records that have no embedding at all
    async fn list_missing_embeddings(&self) -> Result<Vec<Record>>;

    /// Attach an embedding without touching the rest of the record
    async fn set_embedding(&self, id: &str, embedding: EmbeddingInfo) -> Result<()>;

    /// Delete record, returns whether it existed
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Volatile store
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<String, Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Record>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: Record) -> Result<()> {
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn list_missing_embeddings(&self) -> Result<Vec<Record>> {
        Ok(missing(&*self.records.read().await))
    }

    async fn set_embedding(&self, id: &str, embedding: EmbeddingInfo) -> Result<()> {
        let mut records = self.records.write().await;
        attach(&mut records, id, embedding)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}

/// Store persisted as a single pretty-printed JSON file
pub struct JsonRecordStore {
    records: RwLock<BTreeMap<String, Record>>,
    file_path: PathBuf,
}

impl JsonRecordStore {
    /// Open store, loading existing records if the file exists
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let records: Vec<Record> = if path.exists() {
            let data = tokio::fs::read_to_string(path).await?;
            if data.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&data).map_err(|e| {
                    FolioError::storage(format!("Corrupt record file {}: {}", path.display(), e))
                })?
            }
        } else {
            Vec::new()
        };

        info!("Record store opened: {} ({} records)", path.display(), records.len());

        Ok(Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id.clone(), r)).collect()),
            file_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Write through a temp file so a crash never leaves a half-written store.
    /// Callers swap the staged map in only after this succeeds.
    async fn persist(&self, records: &BTreeMap<String, Record>) -> Result<()> {
        let list: Vec<&Record> = records.values().collect();
        let data = serde_json::to_string_pretty(&list)?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp_path = self.file_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &self.file_path).await?;

        debug!("Persisted {} records to {}", list.len(), self.file_path.display());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Record>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: Record) -> Result<()> {
        let mut records = self.records.write().await;
        let mut staged = records.clone();
        staged.insert(record.id.clone(), record);
        self.persist(&staged).await?;
        *records = staged;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn list_missing_embeddings(&self) -> Result<Vec<Record>> {
        Ok(missing(&*self.records.read().await))
    }

    async fn set_embedding(&self, id: &str, embedding: EmbeddingInfo) -> Result<()> {
        let mut records = self.records.write().await;
        let mut staged = records.clone();
        attach(&mut staged, id, embedding)?;
        self.persist(&staged).await?;
        *records = staged;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        if !records.contains_key(id) {
            return Ok(false);
        }
        let mut staged = records.clone();
        staged.remove(id);
        self.persist(&staged).await?;
        *records = staged;
        Ok(true)
    }
}

fn missing(records: &BTreeMap<String, Record>) -> Vec<Record> {
    records
        .values()
        .filter(|r| r.embedding.is_none())
        .cloned()
        .collect()
}

fn attach(
    records: &mut BTreeMap<String, Record>,
    id: &str,
    embedding: EmbeddingInfo,
) -> Result<()> {
    let record = records
        .get_mut(id)
        .ok_or_else(|| FolioError::not_found(format!("record {}", id)))?;
    record.embedding = Some(embedding);
    Ok(())
}
