//! In-process record store mirrored to a JSON file.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::domain::entities::{Lookup, NewRecord, PutOutcome, Record, StoreStats};
use crate::domain::repositories::RecordRepository;
use crate::error::StoreError;

/// Record list plus lookup indexes, always mutated together.
#[derive(Debug, Default)]
struct Inner {
    records: Vec<Record>,
    by_id: HashMap<String, usize>,
    by_url: HashMap<String, usize>,
}

impl Inner {
    fn from_records(records: Vec<Record>) -> Result<Self, StoreError> {
        let mut inner = Inner::default();

        for record in records {
            if inner.by_id.contains_key(&record.id) {
                return Err(StoreError::InvalidData(format!(
                    "duplicate id '{}' in storage file",
                    record.id
                )));
            }
            inner.push(record);
        }

        Ok(inner)
    }

    fn push(&mut self, record: Record) {
        let index = self.records.len();
        self.by_id.insert(record.id.clone(), index);
        // The first record holding a URL stays canonical.
        self.by_url.entry(record.url.clone()).or_insert(index);
        self.records.push(record);
    }

    /// Drops every record from `len` onward.
    fn truncate(&mut self, len: usize) {
        for record in self.records.drain(len..) {
            self.by_id.remove(&record.id);
            if self.by_url.get(&record.url).is_some_and(|&i| i >= len) {
                self.by_url.remove(&record.url);
            }
        }
    }

    fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    fn find_by_url(&self, url: &str) -> Option<&Record> {
        self.by_url.get(url).map(|&i| &self.records[i])
    }
}

/// Record store kept in memory and rewritten to a flat JSON file after every
/// successful mutation.
///
/// Readers share a read lock; writers hold the write lock for the whole
/// check-mutate-persist sequence, so the file always reflects a state that
/// readers could have observed. A failed write is rolled back in memory.
///
/// Without a path the store lives purely in memory.
#[derive(Debug)]
pub struct FileRecordRepository {
    inner: RwLock<Inner>,
    path: Option<PathBuf>,
}

impl FileRecordRepository {
    /// Creates an empty store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            path: None,
        }
    }

    /// Opens a store backed by `path`, loading any records already there.
    ///
    /// A missing file is created empty; an empty file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the file cannot be read or
    /// created, and [`StoreError::InvalidData`] if its content is not a JSON
    /// array of records.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = load_records(&path).await?;
        tracing::info!(path = %path.display(), records = records.len(), "Loaded records from file");

        Ok(Self {
            inner: RwLock::new(Inner::from_records(records)?),
            path: Some(path),
        })
    }

    async fn persist(&self, records: &[Record]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes =
            serde_json::to_vec(records).map_err(|e| StoreError::Persistence(e.to_string()))?;

        let tmp = temp_path(path);
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::Persistence(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::Persistence(format!("{}: {e}", path.display())))?;

        Ok(())
    }
}

impl Default for FileRecordRepository {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

async fn load_records(path: &Path) -> Result<Vec<Record>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tokio::fs::write(path, b"")
                .await
                .map_err(|e| StoreError::Persistence(format!("{}: {e}", path.display())))?;
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(StoreError::Persistence(format!("{}: {e}", path.display())));
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|e| StoreError::InvalidData(e.to_string()))
}

#[async_trait]
impl RecordRepository for FileRecordRepository {
    async fn put(&self, record: NewRecord) -> Result<PutOutcome, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.by_id.contains_key(&record.id) {
            return Ok(PutOutcome::Collision);
        }

        if let Some(existing) = inner.find_by_url(&record.url) {
            return Ok(PutOutcome::Duplicate {
                existing_id: existing.id.clone(),
            });
        }

        let len = inner.records.len();
        inner.push(record.into_record());

        if let Err(e) = self.persist(&inner.records).await {
            inner.truncate(len);
            return Err(e);
        }

        Ok(PutOutcome::Created)
    }

    async fn get(&self, id: &str) -> Result<Lookup, StoreError> {
        let inner = self.inner.read().await;

        Ok(match inner.find_by_id(id) {
            Some(record) if record.deleted => Lookup::Gone,
            Some(record) => Lookup::Found(record.url.clone()),
            None => Lookup::NotFound,
        })
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Record>, StoreError> {
        let inner = self.inner.read().await;

        Ok(inner
            .records
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, ids: &[String], owner_id: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;

        let mut marked = Vec::new();
        for id in ids {
            let Some(&index) = inner.by_id.get(id) else {
                continue;
            };
            let record = &mut inner.records[index];
            if record.owner_id == owner_id && !record.deleted {
                record.deleted = true;
                marked.push(index);
            }
        }

        if marked.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.persist(&inner.records).await {
            for index in marked {
                inner.records[index].deleted = false;
            }
            return Err(e);
        }

        Ok(marked.len() as u64)
    }

    async fn insert_batch(&self, records: Vec<NewRecord>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        {
            let mut batch_ids = HashSet::new();
            let mut batch_urls = HashSet::new();
            for record in &records {
                if inner.by_id.contains_key(&record.id) || !batch_ids.insert(record.id.as_str()) {
                    return Err(StoreError::Conflict(format!("id '{}' is taken", record.id)));
                }
                if inner.by_url.contains_key(&record.url) || !batch_urls.insert(record.url.as_str())
                {
                    return Err(StoreError::Conflict(format!(
                        "url '{}' is already stored",
                        record.url
                    )));
                }
            }
        }

        let len = inner.records.len();
        for record in records {
            inner.push(record.into_record());
        }

        if let Err(e) = self.persist(&inner.records).await {
            inner.truncate(len);
            return Err(e);
        }

        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let inner = self.inner.read().await;

        let users: HashSet<&str> = inner
            .records
            .iter()
            .map(|r| r.owner_id.as_str())
            .filter(|owner| !owner.is_empty())
            .collect();

        Ok(StoreStats {
            urls: inner.records.len() as u64,
            users: users.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn new_record(id: &str, url: &str, owner: &str) -> NewRecord {
        NewRecord::new(id, url, owner)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let repo = FileRecordRepository::in_memory();

        let outcome = repo
            .put(new_record("k1", "http://example.com", "u1"))
            .await
            .unwrap();
        assert_eq!(outcome, PutOutcome::Created);

        let lookup = repo.get("k1").await.unwrap();
        assert_eq!(lookup, Lookup::Found("http://example.com".to_string()));
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let repo = FileRecordRepository::in_memory();

        assert_eq!(repo.get("nope").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_put_duplicate_url_returns_existing_id() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://example.com", "u1"))
            .await
            .unwrap();

        let outcome = repo
            .put(new_record("k2", "http://example.com", "u2"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PutOutcome::Duplicate {
                existing_id: "k1".to_string()
            }
        );
        assert_eq!(repo.get("k2").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_put_taken_id_is_collision() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();

        let outcome = repo.put(new_record("k1", "http://b.com", "u1")).await.unwrap();

        assert_eq!(outcome, PutOutcome::Collision);
        assert_eq!(
            repo.get("k1").await.unwrap(),
            Lookup::Found("http://a.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_put_tombstoned_id_is_still_collision() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();
        repo.soft_delete(&["k1".to_string()], "u1").await.unwrap();

        let outcome = repo.put(new_record("k1", "http://b.com", "u1")).await.unwrap();

        assert_eq!(outcome, PutOutcome::Collision);
    }

    #[tokio::test]
    async fn test_soft_delete_marks_gone() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();

        let marked = repo.soft_delete(&["k1".to_string()], "u1").await.unwrap();

        assert_eq!(marked, 1);
        assert_eq!(repo.get("k1").await.unwrap(), Lookup::Gone);
    }

    #[tokio::test]
    async fn test_soft_delete_is_idempotent() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();

        repo.soft_delete(&["k1".to_string()], "u1").await.unwrap();
        let marked = repo.soft_delete(&["k1".to_string()], "u1").await.unwrap();

        assert_eq!(marked, 0);
        assert_eq!(repo.get("k1").await.unwrap(), Lookup::Gone);
    }

    #[tokio::test]
    async fn test_soft_delete_foreign_owner_is_noop() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "owner-b"))
            .await
            .unwrap();

        let marked = repo
            .soft_delete(&["k1".to_string()], "owner-a")
            .await
            .unwrap();

        assert_eq!(marked, 0);
        assert_eq!(
            repo.get("k1").await.unwrap(),
            Lookup::Found("http://a.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_soft_delete_skips_unknown_ids() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();

        let marked = repo
            .soft_delete(&["missing".to_string(), "k1".to_string()], "u1")
            .await
            .unwrap();

        assert_eq!(marked, 1);
    }

    #[tokio::test]
    async fn test_deleted_url_still_counts_as_duplicate() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();
        repo.soft_delete(&["k1".to_string()], "u1").await.unwrap();

        let outcome = repo.put(new_record("k2", "http://a.com", "u1")).await.unwrap();

        assert_eq!(
            outcome,
            PutOutcome::Duplicate {
                existing_id: "k1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_list_by_owner_filters_and_keeps_order() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();
        repo.put(new_record("k2", "http://b.com", "u2")).await.unwrap();
        repo.put(new_record("k3", "http://c.com", "u1")).await.unwrap();

        let records = repo.list_by_owner("u1").await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["k1", "k3"]);
    }

    #[tokio::test]
    async fn test_insert_batch_commits_all() {
        let repo = FileRecordRepository::in_memory();

        repo.insert_batch(vec![
            new_record("c1", "http://a.com", "u1"),
            new_record("c2", "http://b.com", "u1"),
        ])
        .await
        .unwrap();

        assert_eq!(
            repo.get("c1").await.unwrap(),
            Lookup::Found("http://a.com".to_string())
        );
        assert_eq!(
            repo.get("c2").await.unwrap(),
            Lookup::Found("http://b.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_insert_batch_conflict_persists_nothing() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://taken.com", "u0"))
            .await
            .unwrap();

        let result = repo
            .insert_batch(vec![
                new_record("c1", "http://a.com", "u1"),
                new_record("c2", "http://taken.com", "u1"),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(repo.get("c1").await.unwrap(), Lookup::NotFound);
        assert_eq!(repo.get("c2").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_insert_batch_repeated_id_within_batch() {
        let repo = FileRecordRepository::in_memory();

        let result = repo
            .insert_batch(vec![
                new_record("c1", "http://a.com", "u1"),
                new_record("c1", "http://b.com", "u1"),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(repo.get("c1").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_stats_counts_ids_and_owners() {
        let repo = FileRecordRepository::in_memory();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();
        repo.put(new_record("k2", "http://b.com", "u1")).await.unwrap();
        repo.put(new_record("k3", "http://c.com", "u2")).await.unwrap();
        repo.put(new_record("k4", "http://d.com", "")).await.unwrap();

        let stats = repo.stats().await.unwrap();

        assert_eq!(stats, StoreStats { urls: 4, users: 2 });
    }

    #[tokio::test]
    async fn test_open_missing_file_creates_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");

        let repo = FileRecordRepository::open(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(repo.stats().await.unwrap(), StoreStats::default());
    }

    #[tokio::test]
    async fn test_open_empty_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "").unwrap();

        let repo = FileRecordRepository::open(&path).await.unwrap();

        assert_eq!(repo.get("anything").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_open_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileRecordRepository::open(&path).await;

        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");

        {
            let repo = FileRecordRepository::open(&path).await.unwrap();
            repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();
            repo.put(new_record("k2", "http://b.com", "u1")).await.unwrap();
            repo.soft_delete(&["k2".to_string()], "u1").await.unwrap();
        }

        let repo = FileRecordRepository::open(&path).await.unwrap();

        assert_eq!(
            repo.get("k1").await.unwrap(),
            Lookup::Found("http://a.com".to_string())
        );
        assert_eq!(repo.get("k2").await.unwrap(), Lookup::Gone);
        assert_eq!(
            repo.put(new_record("k1", "http://z.com", "u1")).await.unwrap(),
            PutOutcome::Collision
        );
    }

    #[tokio::test]
    async fn test_file_is_json_array_with_expected_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");

        let repo = FileRecordRepository::open(&path).await.unwrap();
        repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["ID"], "k1");
        assert_eq!(array[0]["URL"], "http://a.com");
        assert_eq!(array[0]["UserID"], "u1");
    }

    #[test]
    fn test_temp_path_appends_to_full_name() {
        assert_eq!(
            temp_path(Path::new("/data/records.json")),
            PathBuf::from("/data/records.json.tmp")
        );
        assert_eq!(
            temp_path(Path::new("/data/records.tmp")),
            PathBuf::from("/data/records.tmp.tmp")
        );
    }

    #[tokio::test]
    async fn test_tmp_extension_file_persists_via_separate_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.tmp");

        {
            let repo = FileRecordRepository::open(&path).await.unwrap();
            repo.put(new_record("k1", "http://a.com", "u1")).await.unwrap();
        }

        assert!(!dir.path().join("records.tmp.tmp").exists());

        let repo = FileRecordRepository::open(&path).await.unwrap();
        assert_eq!(
            repo.get("k1").await.unwrap(),
            Lookup::Found("http://a.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_persist_rolls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let repo = FileRecordRepository::open(&path).await.unwrap();

        // Removing the directory makes every subsequent write fail.
        drop(dir);

        let result = repo.put(new_record("k1", "http://a.com", "u1")).await;

        assert!(matches!(result, Err(StoreError::Persistence(_))));
        assert_eq!(repo.get("k1").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_puts_same_url_single_winner() {
        let repo = Arc::new(FileRecordRepository::in_memory());
        let mut handles = vec![];

        for i in 0..20 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.put(new_record(
                    &format!("id-{i:02}"),
                    "http://same.com",
                    &format!("u{i}"),
                ))
                .await
                .unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() == PutOutcome::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repo.stats().await.unwrap().urls, 1);
    }
}
