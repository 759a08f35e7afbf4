//! JSON shapes exchanged between the server and its clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{Card, CardId, CardSet, SetId};
use crate::ownership::CollectionEntry;
use crate::stats::SetCompletion;

/// A set with the caller's completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetListing {
    pub id: SetId,
    pub name: String,
    pub code: String,
    pub language: String,
    pub era: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub total_cards: u32,
    pub owned_cards: u32,
    pub completion_percent: u32,
}

impl From<SetCompletion> for SetListing {
    fn from(value: SetCompletion) -> Self {
        let SetCompletion { set, summary } = value;
        Self {
            id: set.id,
            name: set.name,
            code: set.code,
            language: set.language,
            era: set.era,
            release_date: set.release_date,
            logo_url: set.logo_url,
            total_cards: summary.total_cards,
            owned_cards: summary.owned_cards,
            completion_percent: summary.completion_percent,
        }
    }
}

/// A card with the caller's owned quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardListing {
    pub id: CardId,
    pub set_id: SetId,
    pub number: String,
    pub name: String,
    pub rarity: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub owned: bool,
    pub quantity: u32,
    /// Only filled in for single-card and cross-set responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
}

impl CardListing {
    pub fn new(card: Card, quantity: u32) -> Self {
        Self {
            id: card.id,
            set_id: card.set_id,
            number: card.number,
            name: card.name,
            rarity: card.rarity,
            card_type: card.card_type,
            image_url: card.image_url,
            owned: quantity >= 1,
            quantity,
            set_name: None,
            set_code: None,
        }
    }

    pub fn with_set(mut self, set: &CardSet) -> Self {
        self.set_name = Some(set.name.clone());
        self.set_code = Some(set.code.clone());
        self
    }
}

/// One owned card in the collection view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub card_id: CardId,
    pub card_name: String,
    pub card_number: String,
    pub rarity: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub set_name: String,
    pub set_code: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<CollectionEntry> for CollectionItem {
    fn from(entry: CollectionEntry) -> Self {
        let CollectionEntry { card, set, record } = entry;
        Self {
            card_id: card.id,
            card_name: card.name,
            card_number: card.number,
            rarity: card.rarity,
            card_type: card.card_type,
            image_url: card.image_url,
            set_name: set.name,
            set_code: set.code,
            quantity: record.quantity,
            acquired_date: record.acquired_date,
            notes: record.notes,
        }
    }
}
