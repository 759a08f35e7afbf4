//! Set browsing: every set with its completion, one set, one set's cards.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use binder_core::search::{filter_cards, filter_sets, CardField, SetField};
use binder_core::stats::summarize_by_set;
use binder_core::{CardListing, CatalogSnapshot, SetId, SetListing};

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SetListParams {
    /// Exact language match, e.g. "Japanese".
    pub language: Option<String>,
    /// Substring of the set name or code.
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetCardsParams {
    pub q: Option<String>,
}

/// All sets with the caller's completion, newest release first.
pub async fn list_sets(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SetListParams>,
) -> Result<Json<Vec<SetListing>>, ApiError> {
    let snapshot = state.catalog().snapshot()?;
    let owned = state.ownership().store().owned_quantities(&user_id)?;

    let matching: Vec<SetId> = filter_sets(
        &snapshot.sets,
        params.q.as_deref().unwrap_or_default(),
        &SetField::ALL,
        params.language.as_deref(),
    )
    .into_iter()
    .map(|set| set.id)
    .collect();

    let listings = summarize_by_set(&snapshot, &owned)
        .into_iter()
        .filter(|completion| matching.contains(&completion.set.id))
        .map(SetListing::from)
        .collect();
    Ok(Json(listings))
}

/// One set with the caller's completion.
pub async fn get_set(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(set_id): Path<SetId>,
) -> Result<Json<SetListing>, ApiError> {
    let set = state.catalog().get_set(set_id)?;
    let cards = state.catalog().cards_in_set(set_id)?;
    let owned = state.ownership().store().owned_quantities(&user_id)?;

    let snapshot = CatalogSnapshot {
        sets: vec![set],
        cards,
    };
    summarize_by_set(&snapshot, &owned)
        .into_iter()
        .next()
        .map(|completion| Json(SetListing::from(completion)))
        .ok_or_else(|| ApiError::not_found(format!("Not found: set {set_id}")))
}

/// A set's cards in printed-number order with the caller's quantities.
pub async fn set_cards(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(set_id): Path<SetId>,
    Query(params): Query<SetCardsParams>,
) -> Result<Json<Vec<CardListing>>, ApiError> {
    // 404 for unknown sets rather than an empty list
    state.catalog().get_set(set_id)?;
    let cards = state.catalog().cards_in_set(set_id)?;
    let owned = state.ownership().store().owned_quantities(&user_id)?;

    let listings = filter_cards(
        &cards,
        params.q.as_deref().unwrap_or_default(),
        &CardField::ALL,
    )
    .into_iter()
    .map(|card| {
        let quantity = owned.get(&card.id).copied().unwrap_or(0);
        CardListing::new(card.clone(), quantity)
    })
    .collect();
    Ok(Json(listings))
}
