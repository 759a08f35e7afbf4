//! Completion aggregation over the catalog and one user's owned quantities.
//!
//! Everything here is a pure function of a [`CatalogSnapshot`] and an
//! [`OwnedQuantities`] map. Nothing is cached or persisted: every read
//! recomputes, so a mutation is visible on the next request.
//!
//! [`CatalogSnapshot`]: crate::catalog::CatalogSnapshot
//! [`OwnedQuantities`]: crate::ownership::OwnedQuantities

mod completion;
mod grouping;
mod report;

pub use completion::{
    completion_percent, summarize_by_set, summarize_group, top_n_least_complete,
    top_n_most_complete,
};
pub use grouping::{group_by, group_by_era, group_by_language, group_by_rarity};
pub use report::{build_report, overall_summary};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CardSet;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Owned vs. total distinct cards for one grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub owned_cards: u32,
    pub total_cards: u32,
    /// 0..=100, rounded half up.
    pub completion_percent: u32,
}

impl CompletionSummary {
    pub fn new(owned_cards: u32, total_cards: u32) -> Self {
        Self {
            owned_cards,
            total_cards,
            completion_percent: completion_percent(owned_cards, total_cards),
        }
    }
}

/// A set with its completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetCompletion {
    pub set: CardSet,
    pub summary: CompletionSummary,
}

/// One bucket of a grouped aggregation (an era, language, rarity or set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    #[serde(flatten)]
    pub summary: CompletionSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKey {
    Set,
    Era,
    Language,
    Rarity,
}

impl GroupingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingKey::Set => "set",
            GroupingKey::Era => "era",
            GroupingKey::Language => "language",
            GroupingKey::Rarity => "rarity",
        }
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupingKey {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "set" => Ok(GroupingKey::Set),
            "era" => Ok(GroupingKey::Era),
            "language" => Ok(GroupingKey::Language),
            "rarity" => Ok(GroupingKey::Rarity),
            other => Err(StatsError::Validation(format!(
                "unknown grouping key '{other}', expected one of set, era, language, rarity"
            ))),
        }
    }
}

/// Knobs for [`build_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    /// Length of the most/least complete rankings.
    pub top_sets_limit: usize,
    /// Leave sets without any owned card out of the rankings.
    pub started_sets_only: bool,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            top_sets_limit: 5,
            started_sets_only: false,
        }
    }
}

/// Whole-collection totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallSummary {
    /// Sum of quantities, duplicates included.
    pub total_cards_owned: u64,
    pub unique_cards_owned: u32,
    pub total_possible_cards: u32,
    pub completion_percent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_rarity: Option<String>,
}

/// Everything the statistics screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub overall: OverallSummary,
    pub by_era: Vec<GroupSummary>,
    pub by_language: Vec<GroupSummary>,
    pub by_rarity: Vec<GroupSummary>,
    pub top_complete_sets: Vec<SetCompletion>,
    pub least_complete_sets: Vec<SetCompletion>,
}
