use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use binder_core::stats::{build_report, group_by, GroupSummary, OverallSummary};
use binder_core::{GroupingKey, SetListing};

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub overall: OverallSummary,
    pub by_era: Vec<GroupSummary>,
    pub by_language: Vec<GroupSummary>,
    pub by_rarity: Vec<GroupSummary>,
    pub top_complete_sets: Vec<SetListing>,
    pub least_complete_sets: Vec<SetListing>,
}

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub key: GroupingKey,
    pub groups: Vec<GroupSummary>,
}

/// Totals, grouped completion, and the most and least complete sets.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let snapshot = state.catalog().snapshot()?;
    let owned = state.ownership().store().owned_quantities(&user_id)?;
    let report = build_report(&snapshot, &owned, state.stats_options());

    Ok(Json(StatsResponse {
        overall: report.overall,
        by_era: report.by_era,
        by_language: report.by_language,
        by_rarity: report.by_rarity,
        top_complete_sets: report
            .top_complete_sets
            .into_iter()
            .map(SetListing::from)
            .collect(),
        least_complete_sets: report
            .least_complete_sets
            .into_iter()
            .map(SetListing::from)
            .collect(),
    }))
}

/// Completion grouped by `set`, `era`, `language` or `rarity`.
pub async fn get_groups(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(key): Path<String>,
) -> Result<Json<GroupsResponse>, ApiError> {
    let key: GroupingKey = key.parse()?;
    let snapshot = state.catalog().snapshot()?;
    let owned = state.ownership().store().owned_quantities(&user_id)?;
    Ok(Json(GroupsResponse {
        key,
        groups: group_by(key, &snapshot, &owned),
    }))
}
