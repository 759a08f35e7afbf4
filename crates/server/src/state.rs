use std::sync::Arc;

use tokio::sync::RwLock;

use binder_core::{
    AuditHandle, AuditStore, Authenticator, CatalogStore, Config, OwnershipService,
    OwnershipStore, PreferenceStore, Preferences, SanitizedConfig, WishlistService,
    WishlistStore,
};
use binder_core::stats::StatsOptions;

/// The stores the server runs on. All of them may share one database file.
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub ownership: Arc<dyn OwnershipStore>,
    pub wishlist: Arc<dyn WishlistStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub audit: Arc<dyn AuditStore>,
}

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    audit: AuditHandle,
    audit_store: Arc<dyn AuditStore>,
    catalog: Arc<dyn CatalogStore>,
    ownership: OwnershipService,
    wishlist: WishlistService,
    preference_store: Arc<dyn PreferenceStore>,
    preferences: RwLock<Preferences>,
}

impl AppState {
    /// `preferences` is the value loaded at startup; later changes go
    /// through [`AppState::preferences`] and are written back to the store.
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        audit: AuditHandle,
        stores: Stores,
        preferences: Preferences,
    ) -> Self {
        let ownership = OwnershipService::new(Arc::clone(&stores.catalog), Arc::clone(&stores.ownership));
        let wishlist = WishlistService::new(
            Arc::clone(&stores.catalog),
            Arc::clone(&stores.ownership),
            stores.wishlist,
        );
        Self {
            config,
            authenticator,
            audit,
            audit_store: stores.audit,
            catalog: stores.catalog,
            ownership,
            wishlist,
            preference_store: stores.preferences,
            preferences: RwLock::new(preferences),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn catalog_handle(&self) -> Arc<dyn CatalogStore> {
        Arc::clone(&self.catalog)
    }

    pub fn ownership(&self) -> &OwnershipService {
        &self.ownership
    }

    pub fn wishlist(&self) -> &WishlistService {
        &self.wishlist
    }

    pub fn preference_store(&self) -> &dyn PreferenceStore {
        self.preference_store.as_ref()
    }

    pub fn preferences(&self) -> &RwLock<Preferences> {
        &self.preferences
    }

    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions {
            top_sets_limit: self.config.stats.top_sets_limit,
            started_sets_only: self.config.stats.started_sets_only,
        }
    }
}
