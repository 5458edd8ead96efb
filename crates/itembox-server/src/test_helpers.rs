use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum::Router;
use bytes::Bytes;
use itembox_core::{FileEntry, Item, ItemCursor, ItemEvent, ItemPage, UploadReceipt};
use itembox_db::{Database, DbError, SqliteDatabase};
use itembox_notify::{Notifier, NotifyError};
use itembox_service::LocalService;
use itembox_store::{LocalStore, ObjectStore, StoreConfig, StoreError};
use tokio::net::TcpListener;

use crate::config::Mode;
use crate::routes::{build_router, AppState, InnerAppState};

/// Origin the test routers allow.
pub const TEST_ORIGIN: &str = "http://allowed.example";

/// Notifier that keeps every event it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ItemEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ItemEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn topic(&self) -> &str {
        "test-topic"
    }

    async fn publish(&self, event: &ItemEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn topic(&self) -> &str {
        "test-topic"
    }

    async fn publish(&self, _event: &ItemEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("topic unreachable".into()))
    }
}

/// Database whose every call fails.
pub struct FailingDatabase;

fn unavailable() -> DbError {
    DbError::Internal("table unavailable".into())
}

#[async_trait]
impl Database for FailingDatabase {
    async fn scan_items(
        &self,
        _limit: usize,
        _start_after: Option<&ItemCursor>,
    ) -> Result<ItemPage, DbError> {
        Err(unavailable())
    }

    async fn get_item(&self, _id: &str) -> Result<Item, DbError> {
        Err(unavailable())
    }

    async fn put_item(&self, _item: &Item) -> Result<(), DbError> {
        Err(unavailable())
    }

    async fn delete_item(&self, _id: &str) -> Result<Option<Item>, DbError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Err(unavailable())
    }
}

/// Object store whose every call fails.
pub struct FailingStore;

#[async_trait]
impl ObjectStore for FailingStore {
    fn bucket(&self) -> &str {
        "broken"
    }

    async fn upload(&self, _key: &str, _data: Bytes) -> Result<UploadReceipt, StoreError> {
        Err(StoreError::Internal("bucket unavailable".into()))
    }

    async fn list(&self) -> Result<Vec<FileEntry>, StoreError> {
        Err(StoreError::Internal("bucket unavailable".into()))
    }
}

fn temp_files_dir() -> PathBuf {
    tempfile::tempdir().unwrap().keep()
}

fn temp_store(dir: &std::path::Path) -> Arc<dyn ObjectStore> {
    Arc::new(LocalStore::new(&StoreConfig {
        local_data_dir: Some(dir.to_string_lossy().to_string()),
        ..StoreConfig::default()
    }))
}

pub fn state_with(
    db: Arc<dyn Database>,
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    mode: Mode,
) -> AppState {
    Arc::new(InnerAppState {
        service: LocalService::new(db, store, notifier),
        mode,
        allowed_origins: vec![
            HeaderValue::from_static(TEST_ORIGIN),
            HeaderValue::from_static("http://localhost:3000"),
        ],
    })
}

/// In-memory SQLite, temp local store, recording notifier.
pub fn test_state(mode: Mode) -> AppState {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    state_with(
        db,
        temp_store(&temp_files_dir()),
        Arc::new(RecordingNotifier::default()),
        mode,
    )
}

pub struct TestHarness {
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
    pub files_dir: PathBuf,
}

pub fn test_harness(mode: Mode) -> TestHarness {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let files_dir = temp_files_dir();
    let notifier = Arc::new(RecordingNotifier::default());
    let state = state_with(db, temp_store(&files_dir), notifier.clone(), mode);
    TestHarness {
        router: build_router(state),
        notifier,
        files_dir,
    }
}

pub fn test_router() -> Router {
    test_harness(Mode::Production).router
}

/// Router over the given database with a working store and notifier.
pub fn router_with(db: Arc<dyn Database>, mode: Mode) -> Router {
    build_router(state_with(
        db,
        temp_store(&temp_files_dir()),
        Arc::new(RecordingNotifier::default()),
        mode,
    ))
}

/// Router over the given object store with a working database and notifier.
pub fn store_router_with(store: Arc<dyn ObjectStore>, mode: Mode) -> Router {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    build_router(state_with(
        db,
        store,
        Arc::new(RecordingNotifier::default()),
        mode,
    ))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

async fn spawn(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    spawn(test_router()).await
}

/// Like `spawn_test_server`, but whose notifier always fails.
pub async fn spawn_test_server_with_failing_notifier() -> TestServer {
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let state = state_with(
        db,
        temp_store(&temp_files_dir()),
        Arc::new(FailingNotifier),
        Mode::Production,
    );
    spawn(build_router(state)).await
}

/// Like `spawn_test_server`, but over a database that always fails.
pub async fn spawn_degraded_test_server() -> TestServer {
    spawn(router_with(Arc::new(FailingDatabase), Mode::Production)).await
}
