//! Integration tests for the Trade Records API.
//!
//! Tests run against the server at `API_BASE_URL` when it is set. Otherwise
//! each test starts its own server on an ephemeral port, backed by a
//! temporary trades directory.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use trade_client::{ClientConfig, TradeClient};
use trade_records_backend::api::create_router;
use trade_records_backend::config::ValidationConfig;
use trade_records_backend::state::AppState;
use trade_records_backend::store::TradeStore;

/// Gets the API base URL from the environment, if one is configured.
#[must_use]
pub fn get_api_url() -> Option<String> {
    std::env::var("API_BASE_URL").ok().filter(|url| !url.is_empty())
}

/// A client plus whatever keeps its server alive.
pub struct TestContext {
    /// Client pointed at the server under test.
    pub client: TradeClient,
    /// Whether the server is private to this test, so counts are exact.
    pub isolated: bool,
    _dir: Option<TempDir>,
}

/// Starts an in-process server and returns its base URL.
///
/// The server runs until the test's runtime shuts down.
///
/// # Panics
/// Panics if the server cannot be started.
pub async fn spawn_server() -> (TempDir, String) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = TradeStore::open(dir.path().join("trades"))
        .await
        .expect("Failed to open store");
    let state = Arc::new(AppState::new(store, ValidationConfig::default()));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");

    tokio::spawn(async move {
        let _ = axum::serve(listener, create_router(state)).await;
    });

    (dir, format!("http://{addr}"))
}

/// Creates a test client, starting a local server if no URL is configured.
///
/// # Panics
/// Panics if the client or server cannot be created.
pub async fn create_test_context() -> TestContext {
    let (dir, base_url, isolated) = match get_api_url() {
        Some(url) => (None, url, false),
        None => {
            let (dir, url) = spawn_server().await;
            (Some(dir), url, true)
        }
    };

    let client = TradeClient::new(ClientConfig {
        base_url,
        timeout: Duration::from_secs(10),
    })
    .expect("Failed to create client");

    TestContext {
        client,
        isolated,
        _dir: dir,
    }
}

/// Generates a unique test symbol to avoid conflicts between tests.
#[must_use]
pub fn unique_symbol(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}", prefix, ts, counter)
}
