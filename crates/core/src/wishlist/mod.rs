//! Per-user wishlist of cards not yet owned.

mod sqlite;
mod types;

pub use sqlite::SqliteWishlistStore;
pub use types::*;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::catalog::{CardId, CatalogError, CatalogStore};
use crate::ownership::{OwnershipError, OwnershipStore};

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Card {0} is already on the wishlist")]
    AlreadyListed(CardId),

    #[error("Card {0} is already owned")]
    AlreadyOwned(CardId),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<rusqlite::Error> for WishlistError {
    fn from(e: rusqlite::Error) -> Self {
        WishlistError::StoreUnavailable(e.to_string())
    }
}

impl From<CatalogError> for WishlistError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(what) => WishlistError::NotFound(what),
            CatalogError::StoreUnavailable(msg) => WishlistError::StoreUnavailable(msg),
        }
    }
}

impl From<OwnershipError> for WishlistError {
    fn from(e: OwnershipError) -> Self {
        match e {
            OwnershipError::NotFound(what) => WishlistError::NotFound(what),
            other => WishlistError::StoreUnavailable(other.to_string()),
        }
    }
}

pub trait WishlistStore: Send + Sync {
    /// Items for a user, High priority first, newest first within a priority.
    fn list(&self, user_id: &str) -> Result<Vec<WishlistItem>, WishlistError>;

    fn get(&self, user_id: &str, id: WishlistId) -> Result<Option<WishlistItem>, WishlistError>;

    fn find_by_card(
        &self,
        user_id: &str,
        card_id: CardId,
    ) -> Result<Option<WishlistItem>, WishlistError>;

    fn insert(
        &self,
        user_id: &str,
        card_id: CardId,
        priority: Priority,
        notes: Option<String>,
    ) -> Result<WishlistItem, WishlistError>;

    fn update(
        &self,
        user_id: &str,
        id: WishlistId,
        update: &WishlistUpdate,
    ) -> Result<Option<WishlistItem>, WishlistError>;

    /// Returns whether a row was deleted.
    fn delete(&self, user_id: &str, id: WishlistId) -> Result<bool, WishlistError>;
}

/// Wishlist rules on top of the store: the card must exist, must not be
/// listed twice and must not already be owned.
pub struct WishlistService {
    catalog: Arc<dyn CatalogStore>,
    ownership: Arc<dyn OwnershipStore>,
    store: Arc<dyn WishlistStore>,
}

impl WishlistService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        ownership: Arc<dyn OwnershipStore>,
        store: Arc<dyn WishlistStore>,
    ) -> Self {
        Self {
            catalog,
            ownership,
            store,
        }
    }

    pub fn list(&self, user_id: &str) -> Result<Vec<WishlistEntry>, WishlistError> {
        let items = self.store.list(user_id)?;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.catalog.snapshot()?;
        let sets: HashMap<_, _> = snapshot.sets.into_iter().map(|s| (s.id, s)).collect();
        let cards: HashMap<_, _> = snapshot.cards.into_iter().map(|c| (c.id, c)).collect();

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let card = cards.get(&item.card_id)?.clone();
                let set = sets.get(&card.set_id)?.clone();
                Some(WishlistEntry { item, card, set })
            })
            .collect())
    }

    pub fn add(
        &self,
        user_id: &str,
        card_id: CardId,
        priority: Priority,
        notes: Option<String>,
    ) -> Result<WishlistItem, WishlistError> {
        if !self.catalog.card_exists(card_id)? {
            return Err(WishlistError::NotFound(format!("card {card_id}")));
        }
        if self.store.find_by_card(user_id, card_id)?.is_some() {
            return Err(WishlistError::AlreadyListed(card_id));
        }
        if self.ownership.get(user_id, card_id)?.is_some() {
            return Err(WishlistError::AlreadyOwned(card_id));
        }

        let item = self.store.insert(user_id, card_id, priority, notes)?;
        info!(user_id, card_id, priority = %priority, "Card added to wishlist");
        Ok(item)
    }

    pub fn update(
        &self,
        user_id: &str,
        id: WishlistId,
        update: &WishlistUpdate,
    ) -> Result<WishlistItem, WishlistError> {
        self.store
            .update(user_id, id, update)?
            .ok_or_else(|| WishlistError::NotFound(format!("wishlist item {id}")))
    }

    pub fn remove(&self, user_id: &str, id: WishlistId) -> Result<(), WishlistError> {
        if self.store.delete(user_id, id)? {
            info!(user_id, wishlist_id = id, "Wishlist item removed");
            Ok(())
        } else {
            Err(WishlistError::NotFound(format!("wishlist item {id}")))
        }
    }
}
