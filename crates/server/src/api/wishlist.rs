use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use binder_core::wishlist::WishlistId;
use binder_core::{AuditEvent, CardId, Priority, WishlistEntry, WishlistItem, WishlistUpdate};

use super::error::{json_body, ApiError};
use super::middleware::AuthUser;
use crate::metrics::WISHLIST_CHANGES_TOTAL;
use crate::state::AppState;

/// Body of `POST /wishlist`.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub card_id: CardId,
    #[serde(default)]
    pub priority: Priority,
    pub notes: Option<String>,
}

/// Wanted cards, highest priority first.
pub async fn list_wishlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WishlistEntry>>, ApiError> {
    Ok(Json(state.wishlist().list(&user_id)?))
}

pub async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<AddToWishlistRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WishlistItem>), ApiError> {
    let request = json_body(payload)?;
    let item = state.wishlist().add(
        &user_id,
        request.card_id,
        request.priority,
        request.notes,
    )?;

    WISHLIST_CHANGES_TOTAL.with_label_values(&["added"]).inc();
    state.audit().try_emit(AuditEvent::WishlistItemAdded {
        user_id,
        wishlist_id: item.id,
        card_id: item.card_id,
        priority: item.priority,
    });
    Ok((StatusCode::CREATED, Json(item)))
}

/// Change priority and/or notes. Omitted fields keep their value.
pub async fn update_wishlist_item(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<WishlistId>,
    payload: Result<Json<WishlistUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let update = json_body(payload)?;
    let item = state.wishlist().update(&user_id, id, &update)?;

    WISHLIST_CHANGES_TOTAL.with_label_values(&["updated"]).inc();
    state.audit().try_emit(AuditEvent::WishlistItemUpdated {
        user_id,
        wishlist_id: item.id,
        card_id: item.card_id,
        priority: item.priority,
    });
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<WishlistId>,
) -> Result<StatusCode, ApiError> {
    state.wishlist().remove(&user_id, id)?;

    WISHLIST_CHANGES_TOTAL.with_label_values(&["removed"]).inc();
    state.audit().try_emit(AuditEvent::WishlistItemRemoved {
        user_id,
        wishlist_id: id,
    });
    Ok(StatusCode::NO_CONTENT)
}
