//! Catalog reference data: sets and the cards printed in them.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type SetId = i64;
pub type CardId = i64;

pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_ERA: &str = "Unknown Era";
pub const DEFAULT_RARITY: &str = "Common";

/// A published card set.
///
/// `language` and `era` are always populated: defaults are applied when the
/// set enters the store, so grouping code never has to handle a missing label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    pub id: SetId,
    pub name: String,
    pub code: String,
    pub language: String,
    pub era: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    /// Printed set size, when the data source reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cards: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// A single card definition. `rarity` is normalized like the set labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub set_id: SetId,
    pub number: String,
    pub name: String,
    pub rarity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Set data as it arrives from an import source, before normalization.
#[derive(Debug, Clone, Default)]
pub struct NewSet {
    pub name: String,
    pub code: String,
    pub language: Option<String>,
    pub era: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub total_cards: Option<u32>,
    pub logo_url: Option<String>,
}

/// Card data as it arrives from an import source, before normalization.
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub set_id: SetId,
    pub number: String,
    pub name: String,
    pub rarity: Option<String>,
    pub card_type: Option<String>,
    pub image_url: Option<String>,
}

/// Filters for the cross-set card search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardSearchQuery {
    /// Case-insensitive name substring.
    #[serde(default)]
    pub q: Option<String>,
    /// Case-insensitive type substring.
    #[serde(default, rename = "type")]
    pub card_type: Option<String>,
    /// Exact rarity label.
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub set_id: Option<SetId>,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

pub const MAX_SEARCH_LIMIT: u32 = 500;

fn default_search_limit() -> u32 {
    100
}

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// A page of the id-ordered card listing. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Page 0 becomes 1; a page size of 0 becomes the default, and larger
    /// ones are capped at [`MAX_PAGE_SIZE`].
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        let page_size = match page_size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(size) => size.min(MAX_PAGE_SIZE),
        };
        Self {
            page: page.unwrap_or(1).max(1),
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardPage {
    pub cards: Vec<Card>,
    pub page: u32,
    pub page_size: u32,
    pub total_cards: u64,
    pub total_pages: u64,
}

impl CardPage {
    pub fn new(request: PageRequest, cards: Vec<Card>, total_cards: u64) -> Self {
        Self {
            cards,
            page: request.page,
            page_size: request.page_size,
            total_cards,
            total_pages: total_cards.div_ceil(u64::from(request.page_size)),
        }
    }
}

/// Every set and card, read in one pass for aggregation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSnapshot {
    pub sets: Vec<CardSet>,
    /// Ordered by card id.
    pub cards: Vec<Card>,
}

impl CatalogSnapshot {
    pub fn set(&self, id: SetId) -> Option<&CardSet> {
        self.sets.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub sets: u64,
    pub cards: u64,
}

/// Trims a label and substitutes `default` for a missing or blank one.
pub fn normalize_label(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Orders card numbers the way they are printed: purely numeric numbers by
/// value first, then everything else ("SV01", "TG12", "H3") lexically.
pub fn compare_card_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Release dates newest first, unknown dates last.
pub fn compare_release_desc(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
