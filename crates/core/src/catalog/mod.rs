//! Catalog store: the read-mostly reference data of sets and cards.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::StoreUnavailable(e.to_string())
    }
}

/// Storage for sets and cards.
pub trait CatalogStore: Send + Sync {
    /// All sets, ordered by release date (newest first, undated last).
    fn list_sets(&self) -> Result<Vec<CardSet>, CatalogError>;

    fn get_set(&self, id: SetId) -> Result<CardSet, CatalogError>;

    /// Cards of one set in printed-number order.
    fn cards_in_set(&self, set_id: SetId) -> Result<Vec<Card>, CatalogError>;

    fn get_card(&self, id: CardId) -> Result<Card, CatalogError>;

    fn card_exists(&self, id: CardId) -> Result<bool, CatalogError>;

    /// Every card, ordered by id.
    fn all_cards(&self) -> Result<Vec<Card>, CatalogError>;

    /// One page of every card, ordered by id. A page past the end is empty.
    fn list_cards(&self, page: PageRequest) -> Result<CardPage, CatalogError>;

    /// Cross-set search, ordered by card name.
    fn search_cards(&self, query: &CardSearchQuery) -> Result<Vec<Card>, CatalogError>;

    fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError>;

    /// Insert a set unless one with the same code exists.
    /// Returns the set id and whether a row was created.
    fn insert_set(&self, set: NewSet) -> Result<(SetId, bool), CatalogError>;

    /// Insert a card unless its set already has that number.
    fn insert_card(&self, card: NewCard) -> Result<bool, CatalogError>;

    fn stats(&self) -> Result<CatalogCounts, CatalogError>;
}
