//! Behavioral properties of allocation, batch insert and deletion, checked
//! against the file-backed store.

use shortlink::application::services::{AllocationService, BatchService};
use shortlink::domain::delete_worker::spawn_delete_worker;
use shortlink::domain::entities::{AllocationOutcome, BatchEntry, Lookup, LookupStatus, NewRecord};
use shortlink::domain::repositories::RecordRepository;
use shortlink::error::AppError;
use shortlink::infrastructure::persistence::FileRecordRepository;
use shortlink::utils::id_generator::{IdGenerator, RandomIdGenerator};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Hands out a fixed list of ids, then an empty string.
struct ScriptedIdGenerator {
    ids: Mutex<VecDeque<String>>,
}

impl ScriptedIdGenerator {
    fn new(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
        }
    }
}

impl IdGenerator for ScriptedIdGenerator {
    fn generate(&self) -> String {
        self.ids.lock().unwrap().pop_front().unwrap_or_default()
    }
}

fn allocation_service(
    repo: Arc<FileRecordRepository>,
    ids: &[&str],
) -> AllocationService<FileRecordRepository, ScriptedIdGenerator> {
    AllocationService::new(repo, Arc::new(ScriptedIdGenerator::new(ids)))
}

#[tokio::test]
async fn test_ids_unique_under_collisions() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    let service = AllocationService::new(repo.clone(), Arc::new(RandomIdGenerator::new(2)));

    let mut ids = HashSet::new();
    for i in 0..200 {
        let allocation = service
            .allocate(&format!("http://example.com/{i}"), "u1")
            .await
            .unwrap();
        assert_eq!(allocation.outcome, AllocationOutcome::Created);
        assert!(ids.insert(allocation.id), "id handed out twice");
    }

    assert_eq!(repo.stats().await.unwrap().urls, 200);
}

#[tokio::test]
async fn test_collision_retries_with_fresh_id() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    repo.put(NewRecord::new("k1", "http://first.com", "u1"))
        .await
        .unwrap();

    let service = allocation_service(repo.clone(), &["k2"]);

    let allocation = service
        .allocate_with_candidate("k1".to_string(), "http://second.com", "u1")
        .await
        .unwrap();

    assert_eq!(allocation.id, "k2");
    assert_eq!(allocation.outcome, AllocationOutcome::Created);
    assert_eq!(
        repo.get("k1").await.unwrap(),
        Lookup::Found("http://first.com".to_string())
    );
}

#[tokio::test]
async fn test_collision_exhaustion_writes_nothing() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    repo.put(NewRecord::new("k1", "http://first.com", "u1"))
        .await
        .unwrap();

    let service = allocation_service(repo.clone(), &["k1", "k1"]).with_max_attempts(3);

    let result = service
        .allocate_with_candidate("k1".to_string(), "http://second.com", "u1")
        .await;

    assert!(matches!(result, Err(AppError::Internal { .. })));
    assert_eq!(repo.stats().await.unwrap().urls, 1);
}

#[tokio::test]
async fn test_same_url_created_once() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    let service = Arc::new(AllocationService::new(
        repo.clone(),
        Arc::new(RandomIdGenerator::default()),
    ));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .allocate("http://same.example", &format!("u{i}"))
                .await
                .unwrap()
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let created: Vec<_> = results.iter().filter(|a| a.is_created()).collect();
    assert_eq!(created.len(), 1);

    let canonical = &created[0].id;
    for allocation in &results {
        assert_eq!(&allocation.id, canonical);
    }
}

#[tokio::test]
async fn test_duplicate_scenario() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    let service = allocation_service(repo, &[]);

    let first = service
        .allocate_with_candidate("k1".to_string(), "http://example.com", "u1")
        .await
        .unwrap();
    assert_eq!(first.id, "k1");
    assert_eq!(first.outcome, AllocationOutcome::Created);

    let second = service
        .allocate_with_candidate("k2".to_string(), "http://example.com", "u2")
        .await
        .unwrap();
    assert_eq!(second.id, "k1");
    assert_eq!(second.outcome, AllocationOutcome::Duplicate);
}

#[tokio::test]
async fn test_delete_idempotent() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    repo.put(NewRecord::new("k1", "http://example.com", "u1"))
        .await
        .unwrap();

    let (queue, worker) = spawn_delete_worker(repo.clone());
    queue.submit(vec!["k1".to_string()], "u1").unwrap();
    queue.submit(vec!["k1".to_string()], "u1").unwrap();
    drop(queue);
    worker.await.unwrap();

    assert_eq!(repo.get("k1").await.unwrap(), Lookup::Gone);

    let records = repo.list_by_owner("u1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].is_deleted());
}

#[tokio::test]
async fn test_delete_scoped_to_owner() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    repo.put(NewRecord::new("k1", "http://example.com", "owner-b"))
        .await
        .unwrap();

    let (queue, worker) = spawn_delete_worker(repo.clone());
    queue.submit(vec!["k1".to_string()], "owner-a").unwrap();
    drop(queue);
    worker.await.unwrap();

    assert_eq!(
        repo.get("k1").await.unwrap(),
        Lookup::Found("http://example.com".to_string())
    );
}

#[tokio::test]
async fn test_batch_atomic_on_conflict() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    repo.put(NewRecord::new("k1", "http://taken.com", "u0"))
        .await
        .unwrap();

    let service = BatchService::new(repo.clone());

    let result = service
        .allocate_batch(
            vec![
                BatchEntry::new("c1", "http://a.com"),
                BatchEntry::new("c2", "http://b.com"),
                BatchEntry::new("c3", "http://taken.com"),
                BatchEntry::new("c4", "http://d.com"),
                BatchEntry::new("c5", "http://e.com"),
            ],
            "u1",
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
    for id in ["c1", "c2", "c3", "c4", "c5"] {
        assert_eq!(repo.get(id).await.unwrap(), Lookup::NotFound);
    }
    assert_eq!(repo.stats().await.unwrap().urls, 1);
}

#[tokio::test]
async fn test_batch_scenario() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    let service = BatchService::new(repo.clone());

    let result = service
        .allocate_batch(
            vec![
                BatchEntry::new("c1", "http://a.com"),
                BatchEntry::new("c2", "http://b.com"),
            ],
            "u1",
        )
        .await
        .unwrap();

    let pairs: Vec<(&str, &str)> = result
        .iter()
        .map(|a| (a.correlation_id.as_str(), a.id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("c1", "c1"), ("c2", "c2")]);

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
async fn test_not_found_and_gone_differ() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    repo.put(NewRecord::new("k1", "http://example.com", "u1"))
        .await
        .unwrap();
    repo.soft_delete(&["k1".to_string()], "u1").await.unwrap();

    let never = repo.get("never").await.unwrap();
    let deleted = repo.get("k1").await.unwrap();

    assert_eq!(never.status(), LookupStatus::NotFound);
    assert_eq!(deleted.status(), LookupStatus::Gone);
    assert_ne!(never.status(), deleted.status());
}

#[tokio::test]
async fn test_deleted_id_never_reused() {
    let repo = Arc::new(FileRecordRepository::in_memory());
    repo.put(NewRecord::new("k1", "http://example.com", "u1"))
        .await
        .unwrap();
    repo.soft_delete(&["k1".to_string()], "u1").await.unwrap();

    let service = allocation_service(repo.clone(), &["k9"]);

    let allocation = service
        .allocate_with_candidate("k1".to_string(), "http://other.com", "u1")
        .await
        .unwrap();

    assert_eq!(allocation.id, "k9");
    assert_eq!(repo.get("k1").await.unwrap(), Lookup::Gone);
}
