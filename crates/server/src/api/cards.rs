use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use binder_core::{Card, CardId, CardListing, CardSearchQuery, PageRequest};

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CardPageParams {
    pub page: Option<u32>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CardPageResponse {
    pub data: Vec<CardListing>,
    pub page: u32,
    pub page_size: u32,
    pub total_cards: u64,
    pub total_pages: u64,
}

/// One card with its set and the caller's quantity.
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(card_id): Path<CardId>,
) -> Result<Json<CardListing>, ApiError> {
    let card = state.catalog().get_card(card_id)?;
    let set = state.catalog().get_set(card.set_id)?;
    let quantity = state
        .ownership()
        .store()
        .get(&user_id, card_id)?
        .map(|record| record.quantity)
        .unwrap_or(0);
    Ok(Json(CardListing::new(card, quantity).with_set(&set)))
}

/// Every card in id order, one page at a time.
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<CardPageParams>,
) -> Result<Json<CardPageResponse>, ApiError> {
    let page = state
        .catalog()
        .list_cards(PageRequest::new(params.page, params.page_size))?;
    Ok(Json(CardPageResponse {
        data: with_sets(&state, &user_id, page.cards)?,
        page: page.page,
        page_size: page.page_size,
        total_cards: page.total_cards,
        total_pages: page.total_pages,
    }))
}

/// Cross-set card search by name, type, rarity and set.
pub async fn search_cards(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<CardSearchQuery>,
) -> Result<Json<Vec<CardListing>>, ApiError> {
    let cards = state.catalog().search_cards(&query)?;
    Ok(Json(with_sets(&state, &user_id, cards)?))
}

/// Listings carrying set name and code plus the caller's quantities.
fn with_sets(
    state: &AppState,
    user_id: &str,
    cards: Vec<Card>,
) -> Result<Vec<CardListing>, ApiError> {
    if cards.is_empty() {
        return Ok(Vec::new());
    }

    let owned = state.ownership().store().owned_quantities(user_id)?;
    let sets: HashMap<_, _> = state
        .catalog()
        .list_sets()?
        .into_iter()
        .map(|set| (set.id, set))
        .collect();

    Ok(cards
        .into_iter()
        .map(|card| {
            let quantity = owned.get(&card.id).copied().unwrap_or(0);
            let set = sets.get(&card.set_id).cloned();
            let listing = CardListing::new(card, quantity);
            match set {
                Some(set) => listing.with_set(&set),
                None => listing,
            }
        })
        .collect())
}
