use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Card, CardId, CardSet};

/// Quantity owned per card for one user. Absent cards are unowned.
pub type OwnedQuantities = HashMap<CardId, u32>;

/// One user's copies of one card. A stored record always has quantity >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub user_id: String,
    pub card_id: CardId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional metadata carried by quantity-changing mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDetails {
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// What a mutation did to the store.
///
/// `Unchanged` covers duplicate adds and removals of absent records: they
/// succeed without touching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    Created { quantity: u32 },
    Updated { previous: u32, current: u32 },
    Removed { previous: u32 },
    Unchanged,
}

impl MutationOutcome {
    /// Label used for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationOutcome::Created { .. } => "created",
            MutationOutcome::Updated { .. } => "updated",
            MutationOutcome::Removed { .. } => "removed",
            MutationOutcome::Unchanged => "unchanged",
        }
    }

    /// Quantity held after the mutation, if the outcome determines it.
    pub fn current_quantity(&self) -> Option<u32> {
        match self {
            MutationOutcome::Created { quantity } => Some(*quantity),
            MutationOutcome::Updated { current, .. } => Some(*current),
            MutationOutcome::Removed { .. } => Some(0),
            MutationOutcome::Unchanged => None,
        }
    }
}

/// An owned card joined with its catalog data.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionEntry {
    pub card: Card,
    pub set: CardSet,
    pub record: OwnershipRecord,
}
