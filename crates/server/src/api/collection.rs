//! The caller's collection: listing, CSV export, and the four ownership
//! mutations. Mutations answer 204; clients re-read counts afterwards.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

use binder_core::{
    collection_csv, export_filename, AuditEvent, CardId, CollectionItem, MutationOutcome,
    RecordDetails,
};

use super::error::{json_body, ApiError};
use super::middleware::AuthUser;
use crate::metrics::OWNERSHIP_MUTATIONS_TOTAL;
use crate::state::AppState;

fn default_quantity() -> i64 {
    1
}

/// Body of `POST /collection`.
#[derive(Debug, Deserialize)]
pub struct AddToCollectionRequest {
    pub card_id: CardId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Body of `PUT /collection/{card_id}`.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn record(
    state: &AppState,
    user_id: &str,
    card_id: CardId,
    operation: &str,
    outcome: MutationOutcome,
) {
    OWNERSHIP_MUTATIONS_TOTAL
        .with_label_values(&[operation, outcome.as_str()])
        .inc();
    state.audit().try_emit(AuditEvent::OwnershipChanged {
        user_id: user_id.to_string(),
        card_id,
        operation: operation.to_string(),
        outcome: outcome.as_str().to_string(),
        quantity: outcome.current_quantity(),
    });
}

pub async fn list_collection(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CollectionItem>>, ApiError> {
    let entries = state.ownership().collection(&user_id)?;
    Ok(Json(entries.into_iter().map(CollectionItem::from).collect()))
}

/// The collection as a CSV attachment named after today's date.
pub async fn export_collection(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.ownership().collection(&user_id)?;
    let body = collection_csv(&entries)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Add `quantity` copies (default 1) of a card.
pub async fn add_to_collection(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<AddToCollectionRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    let details = RecordDetails {
        acquired_date: request.acquired_date,
        notes: request.notes,
    };
    let outcome = state.ownership().increment_owned(
        &user_id,
        request.card_id,
        request.quantity,
        &details,
    )?;
    record(&state, &user_id, request.card_id, "increment", outcome);
    Ok(StatusCode::NO_CONTENT)
}

/// Set the quantity exactly; 0 removes the card.
pub async fn set_quantity(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<CardId>,
    payload: Result<Json<SetQuantityRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    let details = RecordDetails {
        acquired_date: request.acquired_date,
        notes: request.notes,
    };
    let outcome = state
        .ownership()
        .set_owned(&user_id, card_id, request.quantity, &details)?;
    record(&state, &user_id, card_id, "set_quantity", outcome);
    Ok(StatusCode::NO_CONTENT)
}

/// Own at least one copy. Idempotent.
pub async fn mark_owned(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<CardId>,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .ownership()
        .mark_owned(&user_id, card_id, &RecordDetails::default())?;
    record(&state, &user_id, card_id, "mark_owned", outcome);
    Ok(StatusCode::NO_CONTENT)
}

/// Drop every copy. Cards that are not owned answer 204 as well.
pub async fn mark_unowned(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<CardId>,
) -> Result<StatusCode, ApiError> {
    let outcome = state.ownership().mark_unowned(&user_id, card_id)?;
    record(&state, &user_id, card_id, "mark_unowned", outcome);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_owned(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<CardId>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let outcome = state.ownership().toggle(&user_id, card_id)?;
    record(&state, &user_id, card_id, "toggle", outcome);
    Ok(Json(outcome))
}
