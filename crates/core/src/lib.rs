pub mod audit;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod export;
pub mod importer;
pub mod listing;
pub mod ownership;
pub mod preferences;
pub mod search;
pub mod stats;
pub mod testing;
pub mod wishlist;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditFilter, AuditHandle, AuditRecord,
    AuditStore, AuditWriter, SqliteAuditStore,
};
pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use catalog::{
    Card, CardId, CardPage, CardSearchQuery, CardSet, CatalogError, CatalogSnapshot, CatalogStore,
    PageRequest, SetId, SqliteCatalog,
};
pub use client::{
    CardState, ClientError, CollectionApi, HttpClientConfig, HttpCollectionClient, ToggleError,
    ToggleSession,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use export::{collection_csv, export_filename, ExportError};
pub use importer::{CatalogImporter, ImportError, ImportReport};
pub use listing::{CardListing, CollectionItem, SetListing};
pub use ownership::{
    MutationOutcome, OwnedQuantities, OwnershipError, OwnershipService, OwnershipStore,
    RecordDetails, SqliteOwnershipStore,
};
pub use preferences::{PreferenceError, PreferenceStore, Preferences, SqlitePreferenceStore, Theme};
pub use search::{CardField, SetField, TextMatcher};
pub use stats::{GroupingKey, StatsError, StatsOptions, StatsReport};
pub use wishlist::{
    Priority, SqliteWishlistStore, WishlistEntry, WishlistError, WishlistItem, WishlistService,
    WishlistStore, WishlistUpdate,
};
