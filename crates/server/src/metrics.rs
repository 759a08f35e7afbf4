//! Prometheus metrics for the Binder server.
//!
//! HTTP traffic and authentication failures are recorded by middleware,
//! collection mutations by the handlers, and catalog size is refreshed on
//! every scrape.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use tracing::error;

use crate::state::AppState;

pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP
// =============================================================================

pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "binder_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("binder_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "binder_http_requests_in_flight",
        "HTTP requests currently being processed",
    )
    .unwrap()
});

pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("binder_auth_failures_total", "Authentication failures"),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Collection
// =============================================================================

pub static OWNERSHIP_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "binder_ownership_mutations_total",
            "Ownership mutations by operation and outcome",
        ),
        &["operation", "outcome"],
    )
    .unwrap()
});

pub static WISHLIST_CHANGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("binder_wishlist_changes_total", "Wishlist changes by action"),
        &["action"],
    )
    .unwrap()
});

pub static CATALOG_SETS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("binder_catalog_sets", "Sets in the catalog").unwrap()
});

pub static CATALOG_CARDS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("binder_catalog_cards", "Cards in the catalog").unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(OWNERSHIP_MUTATIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(WISHLIST_CHANGES_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(CATALOG_SETS.clone())).unwrap();
    registry.register(Box::new(CATALOG_CARDS.clone())).unwrap();
}

/// All registered metrics in the Prometheus text format.
pub fn encode_metrics() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gauges that mirror stored state.
pub fn collect_dynamic_metrics(state: &AppState) {
    match state.catalog().stats() {
        Ok(counts) => {
            CATALOG_SETS.set(counts.sets as i64);
            CATALOG_CARDS.set(counts.cards as i64);
        }
        Err(e) => error!(error = %e, "Failed to read catalog counts for metrics"),
    }
}

static NUMERIC_SEGMENT: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"/\d+(/|$)").unwrap());

/// Collapse numeric path segments so ids do not explode label cardinality.
pub fn normalize_path(path: &str) -> String {
    // a second pass catches adjacent ids such as /1/2 whose slash the first
    // pass consumed
    let once = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");
    NUMERIC_SEGMENT.replace_all(&once, "/{id}$1").into_owned()
}
