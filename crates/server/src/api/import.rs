use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use binder_core::{AuditEvent, CatalogImporter, ImportReport};

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::state::AppState;

/// Re-import the configured languages from the data directory. Existing
/// sets and cards are kept, so running it twice adds nothing.
pub async fn import_catalog(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ImportReport>, ApiError> {
    let Some(config) = state.config().import.clone() else {
        return Err(ApiError::bad_request(
            "Catalog import is not configured ([import] data_dir)",
        ));
    };

    let importer = CatalogImporter::new(state.catalog_handle(), &config.data_dir);
    let languages = config.languages.clone();
    let report = tokio::task::spawn_blocking(move || importer.import_languages(&languages))
        .await
        .map_err(ApiError::internal)??;

    info!(
        sets = report.sets_imported,
        cards = report.cards_imported,
        "Catalog import finished"
    );
    state.audit().try_emit(AuditEvent::CatalogImported {
        user_id,
        languages: config.languages,
        report: report.clone(),
    });
    Ok(Json(report))
}
