//! Case-insensitive multi-field text matching shared by set and card search.

use serde::{Deserialize, Serialize};

use crate::catalog::{Card, CardSet};

/// A lowercased query. Blank queries match everything.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: Option<String>,
}

impl TextMatcher {
    pub fn new(query: &str) -> Self {
        let trimmed = query.trim();
        Self {
            needle: (!trimmed.is_empty()).then(|| trimmed.to_lowercase()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_none()
    }

    /// True when any populated field contains the query. Absent fields never
    /// match but do not disqualify the record either.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        fields
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase().contains(needle.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetField {
    Name,
    Code,
}

impl SetField {
    pub const ALL: [SetField; 2] = [SetField::Name, SetField::Code];

    fn value<'a>(&self, set: &'a CardSet) -> Option<&'a str> {
        match self {
            SetField::Name => Some(set.name.as_str()),
            SetField::Code => Some(set.code.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Name,
    Number,
    Rarity,
    Type,
}

impl CardField {
    pub const ALL: [CardField; 4] = [
        CardField::Name,
        CardField::Number,
        CardField::Rarity,
        CardField::Type,
    ];

    fn value<'a>(&self, card: &'a Card) -> Option<&'a str> {
        match self {
            CardField::Name => Some(card.name.as_str()),
            CardField::Number => Some(card.number.as_str()),
            CardField::Rarity => Some(card.rarity.as_str()),
            CardField::Type => card.card_type.as_deref(),
        }
    }
}

/// Sets whose chosen fields match `query`, optionally restricted to one
/// language (exact, case-insensitive). Input order is kept.
pub fn filter_sets<'a>(
    sets: impl IntoIterator<Item = &'a CardSet>,
    query: &str,
    fields: &[SetField],
    language: Option<&str>,
) -> Vec<&'a CardSet> {
    let matcher = TextMatcher::new(query);
    let language = language.map(str::trim).filter(|l| !l.is_empty());
    sets.into_iter()
        .filter(|set| language.is_none_or(|l| set.language.eq_ignore_ascii_case(l)))
        .filter(|set| matcher.matches(fields.iter().map(|f| f.value(set))))
        .collect()
}

/// Cards whose chosen fields match `query`. Input order is kept.
pub fn filter_cards<'a>(
    cards: impl IntoIterator<Item = &'a Card>,
    query: &str,
    fields: &[CardField],
) -> Vec<&'a Card> {
    let matcher = TextMatcher::new(query);
    cards
        .into_iter()
        .filter(|card| matcher.matches(fields.iter().map(|f| f.value(card))))
        .collect()
}
