//! Ownership store and the mutation contract applied on top of it.

mod service;
mod sqlite;
mod types;

pub use service::OwnershipService;
pub use sqlite::SqliteOwnershipStore;
pub use types::*;

use thiserror::Error;

use crate::catalog::{CardId, CatalogError};

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<rusqlite::Error> for OwnershipError {
    fn from(e: rusqlite::Error) -> Self {
        OwnershipError::StoreUnavailable(e.to_string())
    }
}

impl From<CatalogError> for OwnershipError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(what) => OwnershipError::NotFound(what),
            CatalogError::StoreUnavailable(msg) => OwnershipError::StoreUnavailable(msg),
        }
    }
}

/// Per-user ownership rows keyed by `(user_id, card_id)`.
///
/// Every write is a single atomic statement or runs under the store's lock,
/// so concurrent requests never produce duplicate rows.
pub trait OwnershipStore: Send + Sync {
    fn get(&self, user_id: &str, card_id: CardId) -> Result<Option<OwnershipRecord>, OwnershipError>;

    fn owned_quantities(&self, user_id: &str) -> Result<OwnedQuantities, OwnershipError>;

    /// All records for a user, ordered by card id.
    fn list(&self, user_id: &str) -> Result<Vec<OwnershipRecord>, OwnershipError>;

    /// Create a record unless one exists. Returns whether a row was created.
    fn insert_if_absent(
        &self,
        user_id: &str,
        card_id: CardId,
        quantity: u32,
        details: &RecordDetails,
    ) -> Result<bool, OwnershipError>;

    /// Add `delta` copies, creating the record if needed.
    /// Returns `(previous, current)` quantities. A sum past `u32::MAX` is a
    /// `Validation` error and leaves the record untouched.
    fn increment(
        &self,
        user_id: &str,
        card_id: CardId,
        delta: u32,
        details: &RecordDetails,
    ) -> Result<(u32, u32), OwnershipError>;

    /// Replace the quantity; zero deletes the record. Returns the previous quantity.
    fn set_quantity(
        &self,
        user_id: &str,
        card_id: CardId,
        quantity: u32,
        details: &RecordDetails,
    ) -> Result<u32, OwnershipError>;

    /// Delete the record. Returns the quantity that was removed, if any.
    fn remove(&self, user_id: &str, card_id: CardId) -> Result<Option<u32>, OwnershipError>;
}
