//! Common test utilities for end-to-end API tests.
//!
//! [`TestFixture`] builds the full router in-process on a temporary SQLite
//! database seeded with the sample catalog from
//! `binder_core::testing::fixtures`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

use binder_core::config::{ApiKeyEntry, AuthConfig, ImportConfig};
use binder_core::{
    create_audit_system, create_authenticator, load_config_from_str, AuditFilter, AuditRecord,
    AuditStore, Authenticator, CatalogStore, Preferences, SqliteAuditStore, SqliteCatalog,
    SqliteOwnershipStore, SqlitePreferenceStore, SqliteWishlistStore,
};
use binder_server::state::{AppState, Stores};

/// Re-export fixtures for test convenience
pub use binder_core::testing::fixtures;

/// Card ids of the seeded catalog, in insertion order.
pub mod cards {
    pub const ALAKAZAM: i64 = 1;
    pub const PIKACHU_BASE: i64 = 2;
    pub const RAICHU: i64 = 3;
    pub const PIKACHU_JUNGLE: i64 = 4;
    pub const SNORLAX: i64 = 5;
    pub const PIKACHU_CLAY_BURST: i64 = 6;
}

/// In-process server over a seeded temporary database.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_mark_owned() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.put("/api/v1/collection/1/owned", Value::Null).await;
///     assert_status!(response, StatusCode::NO_CONTENT);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    pub catalog: Arc<dyn CatalogStore>,
    pub audit_store: Arc<dyn AuditStore>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
    api_key: Option<String>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// `(key, user)` pairs; non-empty switches auth to `api_key`.
    pub api_keys: Vec<(String, String)>,
    /// Catalog import directory for `POST /catalog/import`.
    pub import_dir: Option<PathBuf>,
    /// Start from an empty catalog instead of the sample one.
    pub empty_catalog: bool,
}

impl TestConfig {
    pub fn with_api_keys(keys: &[(&str, &str)]) -> Self {
        Self {
            api_keys: keys
                .iter()
                .map(|(k, u)| (k.to_string(), u.to_string()))
                .collect(),
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Open auth, seeded catalog.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let mut config = load_config_from_str("[auth]\nmethod = \"none\"\n")
            .expect("Failed to build config");
        config.database.path = db_path.clone();
        if !test_config.api_keys.is_empty() {
            config.auth = AuthConfig {
                method: binder_core::AuthMethod::ApiKey,
                api_keys: test_config
                    .api_keys
                    .iter()
                    .map(|(key, user)| ApiKeyEntry {
                        key: key.clone(),
                        user: user.clone(),
                    })
                    .collect(),
            };
        }
        config.import = test_config.import_dir.map(|data_dir| ImportConfig {
            data_dir,
            languages: vec!["en".to_string()],
            run_on_startup: false,
        });

        let authenticator: Arc<dyn Authenticator> = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );

        let catalog: Arc<dyn CatalogStore> =
            Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));
        if !test_config.empty_catalog {
            fixtures::seed(catalog.as_ref());
        }
        let audit_store: Arc<dyn AuditStore> =
            Arc::new(SqliteAuditStore::new(&db_path).expect("Failed to create audit store"));
        let preference_store = Arc::new(
            SqlitePreferenceStore::new(&db_path).expect("Failed to create preference store"),
        );
        let preferences =
            Preferences::load(preference_store.as_ref()).expect("Failed to load preferences");

        let stores = Stores {
            catalog: Arc::clone(&catalog),
            ownership: Arc::new(
                SqliteOwnershipStore::new(&db_path).expect("Failed to create ownership store"),
            ),
            wishlist: Arc::new(
                SqliteWishlistStore::new(&db_path).expect("Failed to create wishlist store"),
            ),
            preferences: preference_store,
            audit: Arc::clone(&audit_store),
        };

        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
        tokio::spawn(audit_writer.run());

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            audit_handle,
            stores,
            preferences,
        ));
        let router = binder_server::api::create_router(state);

        let api_key = test_config.api_keys.first().map(|(key, _)| key.clone());
        Self {
            router,
            catalog,
            audit_store,
            temp_dir,
            api_key,
        }
    }

    /// Serve the router on a local port for real HTTP clients.
    pub async fn serve(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let app = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        addr
    }

    /// Use `key` (or no key at all) for subsequent requests.
    pub fn authenticate_as(&mut self, key: Option<&str>) {
        self.api_key = key.map(str::to_string);
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// POST without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        let body = (!body.is_null()).then_some(body);
        self.request("PUT", path, body).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("Content-Type", "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    /// CORS preflight from a browser origin. Sent without credentials.
    pub async fn preflight(&self, path: &str, method: &str) -> TestResponse {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(path)
            .header("Origin", "http://localhost:19006")
            .header("Access-Control-Request-Method", method)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        TestResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Value::Null,
            text: String::new(),
        }
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json_body) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json_body).unwrap())
            }
            None => Body::empty(),
        };
        self.send(builder, body).await
    }

    async fn send(&self, mut builder: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        let request = builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    /// Audit events of one type, polling until at least `expected` arrived
    /// (the writer is asynchronous).
    pub async fn wait_for_audit(&self, event_type: &str, expected: usize) -> Vec<AuditRecord> {
        let filter = AuditFilter::new().with_event_type(event_type);
        for _ in 0..50 {
            let records = self.audit_store.query(&filter).expect("audit query failed");
            if records.len() >= expected {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.audit_store.query(&filter).expect("audit query failed")
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
