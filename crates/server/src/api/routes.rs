use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{audit, cards, collection, handlers, import, preferences, sets, stats, wishlist};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Reachable without credentials
    let public_routes = Router::new().route("/health", get(handlers::health));

    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/audit", get(audit::query_audit))
        // Catalog
        .route("/sets", get(sets::list_sets))
        .route("/sets/{id}", get(sets::get_set))
        .route("/sets/{id}/cards", get(sets::set_cards))
        .route("/cards", get(cards::list_cards))
        .route("/cards/search", get(cards::search_cards))
        .route("/cards/{id}", get(cards::get_card))
        .route("/catalog/import", post(import::import_catalog))
        // Collection
        .route(
            "/collection",
            get(collection::list_collection).post(collection::add_to_collection),
        )
        .route("/collection/export", get(collection::export_collection))
        .route(
            "/collection/{card_id}",
            put(collection::set_quantity).delete(collection::mark_unowned),
        )
        .route("/collection/{card_id}/owned", put(collection::mark_owned))
        .route("/collection/{card_id}/toggle", post(collection::toggle_owned))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .route("/stats/groups/{key}", get(stats::get_groups))
        // Wishlist
        .route(
            "/wishlist",
            get(wishlist::list_wishlist).post(wishlist::add_to_wishlist),
        )
        .route(
            "/wishlist/{id}",
            put(wishlist::update_wishlist_item).delete(wishlist::remove_from_wishlist),
        )
        // Preferences
        .route("/preferences", get(preferences::get_preferences))
        .route("/preferences/theme", put(preferences::set_theme))
        .route("/preferences/theme/toggle", post(preferences::toggle_theme))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        // Outermost, so preflights are answered before auth runs
        .layer(CorsLayer::permissive())
        .with_state(state)
}
