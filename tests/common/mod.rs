#![allow(dead_code)]

use axum_test::TestServer;
use shortlink::config::Config;
use shortlink::domain::delete_worker::spawn_delete_worker;
use shortlink::domain::entities::{Lookup, NewRecord};
use shortlink::domain::repositories::RecordRepository;
use shortlink::infrastructure::persistence::FileRecordRepository;
use shortlink::routes::app_router;
use shortlink::state::AppState;
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "http://short.test";

pub fn test_config() -> Config {
    Config {
        base_url: BASE_URL.to_string(),
        ..Config::default()
    }
}

pub fn create_test_state(repo: Arc<FileRecordRepository>, config: &Config) -> AppState {
    let (delete_queue, _worker) = spawn_delete_worker(repo.clone());
    AppState::new(repo, delete_queue, config)
}

/// Full router over an in-memory store.
pub fn create_test_server() -> (TestServer, Arc<FileRecordRepository>) {
    create_test_server_with(test_config())
}

pub fn create_test_server_with(config: Config) -> (TestServer, Arc<FileRecordRepository>) {
    let repo = Arc::new(FileRecordRepository::in_memory());
    let state = create_test_state(repo.clone(), &config);
    let server = TestServer::new(app_router(state)).unwrap();
    (server, repo)
}

pub async fn create_test_record(repo: &FileRecordRepository, id: &str, url: &str, owner: &str) {
    repo.put(NewRecord::new(id, url, owner)).await.unwrap();
}

pub fn short_url(id: &str) -> String {
    format!("{BASE_URL}/{id}")
}

/// Polls the store until `id` resolves to `expected`; the delete worker
/// applies requests after the HTTP response is sent.
pub async fn wait_for_lookup(repo: &FileRecordRepository, id: &str, expected: Lookup) {
    for _ in 0..100 {
        if repo.get(id).await.unwrap() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("'{id}' never resolved to {expected:?}");
}
