use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use binder_core::{AuditEvent, Theme};

use super::error::{json_body, ApiError};
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
pub struct SetThemeRequest {
    pub theme: String,
}

pub async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<PreferencesResponse> {
    let preferences = state.preferences().read().await;
    Json(PreferencesResponse {
        theme: preferences.theme,
    })
}

pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<SetThemeRequest>, JsonRejection>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let request = json_body(payload)?;
    let theme: Theme = request.theme.parse()?;

    let theme = state
        .preferences()
        .write()
        .await
        .set_theme(theme, state.preference_store())?;
    emit_theme_change(&state, user_id, theme);
    Ok(Json(PreferencesResponse { theme }))
}

/// Flip between light and dark.
pub async fn toggle_theme(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let theme = state
        .preferences()
        .write()
        .await
        .toggle_theme(state.preference_store())?;
    emit_theme_change(&state, user_id, theme);
    Ok(Json(PreferencesResponse { theme }))
}

fn emit_theme_change(state: &AppState, user_id: String, theme: Theme) {
    state.audit().try_emit(AuditEvent::PreferenceChanged {
        user_id,
        key: "theme".to_string(),
        value: theme.as_str().to_string(),
    });
}
