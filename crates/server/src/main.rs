use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use binder_core::config::config_path;
use binder_core::{
    create_audit_system, create_authenticator, load_config, validate_config, AuditEvent,
    AuditStore, Authenticator, CatalogImporter, CatalogStore, Preferences, SqliteAuditStore,
    SqliteCatalog, SqliteOwnershipStore, SqlitePreferenceStore, SqliteWishlistStore,
};
use binder_server::api::create_router;
use binder_server::state::{AppState, Stores};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = config_path();

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Short config fingerprint for the audit trail
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Every store lives in the same database file
    let db_path = &config.database.path;
    let catalog: Arc<dyn CatalogStore> =
        Arc::new(SqliteCatalog::new(db_path).context("Failed to open catalog")?);
    let audit_store: Arc<dyn AuditStore> =
        Arc::new(SqliteAuditStore::new(db_path).context("Failed to create audit store")?);
    let preference_store = Arc::new(
        SqlitePreferenceStore::new(db_path).context("Failed to open preference store")?,
    );
    let stores = Stores {
        catalog: Arc::clone(&catalog),
        ownership: Arc::new(
            SqliteOwnershipStore::new(db_path).context("Failed to open ownership store")?,
        ),
        wishlist: Arc::new(
            SqliteWishlistStore::new(db_path).context("Failed to open wishlist store")?,
        ),
        preferences: preference_store.clone(),
        audit: Arc::clone(&audit_store),
    };
    info!("Stores initialized");

    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);
    let writer_handle = tokio::spawn(audit_writer.run());

    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;

    let preferences =
        Preferences::load(preference_store.as_ref()).context("Failed to load preferences")?;
    info!("Theme: {}", preferences.theme);

    if let Some(import) = config.import.as_ref().filter(|i| i.run_on_startup) {
        let importer = CatalogImporter::new(Arc::clone(&catalog), &import.data_dir);
        let languages = import.languages.clone();
        info!("Importing catalog from {:?}", import.data_dir);
        let result = tokio::task::spawn_blocking(move || importer.import_languages(&languages))
            .await
            .context("Catalog import task panicked")?;
        match result {
            Ok(report) => {
                info!(
                    sets = report.sets_imported,
                    cards = report.cards_imported,
                    missing = report.missing_card_files.len(),
                    "Startup import finished"
                );
                audit_handle
                    .emit(AuditEvent::CatalogImported {
                        user_id: "system".to_string(),
                        languages: import.languages.clone(),
                        report,
                    })
                    .await;
            }
            // The server still starts with whatever catalog it already has.
            Err(e) => warn!(error = %e, "Startup import failed"),
        }
    }

    let counts = catalog.stats().context("Failed to read catalog")?;
    info!("Catalog holds {} sets and {} cards", counts.sets, counts.cards);

    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        audit_handle.clone(),
        stores,
        preferences,
    ));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // The router (and its AppState clone of the handle) is gone by now;
    // dropping the last handle closes the channel so the writer drains.
    drop(audit_handle);
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
