//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own primary and search databases.

use super::constants::*;
use hr_directory_server::domain::{Employee, Entity, Job, JobHistory, Page, PageRequest};
use hr_directory_server::repository::open_primary_db;
use hr_directory_server::search::{open_search_db, Fts5SearchIndex, SearchIndex, SearchIndexes};
use hr_directory_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// FTS5 index whose writes fail while the shared switch is off.
struct SwitchableSearchIndex<E> {
    inner: Fts5SearchIndex<E>,
    available: Arc<AtomicBool>,
}

impl<E> SwitchableSearchIndex<E> {
    fn check(&self) -> anyhow::Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            anyhow::bail!("search index unavailable")
        }
    }
}

impl<E> SearchIndex<E> for SwitchableSearchIndex<E>
where
    E: Entity<Id = i64>,
    Fts5SearchIndex<E>: SearchIndex<E>,
{
    fn save(&self, record: &E) -> anyhow::Result<()> {
        self.check()?;
        self.inner.save(record)
    }

    fn find_by_id(&self, id: &i64) -> anyhow::Result<Option<E>> {
        self.inner.find_by_id(id)
    }

    fn delete(&self, id: &i64) -> anyhow::Result<()> {
        self.check()?;
        self.inner.delete(id)
    }

    fn search(&self, query: &str, request: &PageRequest) -> anyhow::Result<Page<E>> {
        self.inner.search(query, request)
    }

    fn delete_all(&self) -> anyhow::Result<()> {
        self.check()?;
        self.inner.delete_all()
    }

    fn count(&self) -> anyhow::Result<u64> {
        self.inner.count()
    }
}

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Shared state, for driving services and indexes directly in tests
    pub state: ServerState,

    search_available: Arc<AtomicBool>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the databases cannot be created, the port cannot be bound,
    /// or the server doesn't become ready within timeout.
    pub async fn spawn() -> Self {
        Self::spawn_with_config(ServerConfig::default()).await
    }

    pub async fn spawn_with_config(mut config: ServerConfig) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp db dir");

        let primary_db = open_primary_db(temp_db_dir.path().join("primary.db"))
            .expect("Failed to open primary db");
        let search_db = open_search_db(&temp_db_dir.path().join("search.db"))
            .expect("Failed to open search db");

        let search_available = Arc::new(AtomicBool::new(true));
        let indexes = SearchIndexes {
            employees: Arc::new(SwitchableSearchIndex {
                inner: Fts5SearchIndex::<Employee>::new(search_db.clone())
                    .expect("Failed to create employee index"),
                available: search_available.clone(),
            }),
            jobs: Arc::new(SwitchableSearchIndex {
                inner: Fts5SearchIndex::<Job>::new(search_db.clone())
                    .expect("Failed to create job index"),
                available: search_available.clone(),
            }),
            job_histories: Arc::new(SwitchableSearchIndex {
                inner: Fts5SearchIndex::<JobHistory>::new(search_db)
                    .expect("Failed to create job history index"),
                available: search_available.clone(),
            }),
        };

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        config.port = port;
        config.requests_logging_level = RequestsLoggingLevel::None;
        let state = ServerState::new(config, primary_db, indexes);
        let app = make_app(state.clone());

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            state,
            search_available,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Makes every subsequent search index write fail.
    pub fn break_search_index(&self) {
        self.search_available.store(false, Ordering::SeqCst);
    }

    pub fn repair_search_index(&self) {
        self.search_available.store(true, Ordering::SeqCst);
    }

    /// Waits for the server to become ready by polling /management/info
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/management/info", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
