//! The ownership mutation contract.
//!
//! Each operation has one explicit semantic:
//!
//! | operation         | effect                                            |
//! |-------------------|---------------------------------------------------|
//! | `mark_owned`      | create with quantity 1 if absent, otherwise no-op |
//! | `increment_owned` | add `delta` (>= 1), creating the record if absent  |
//! | `set_owned`       | set the quantity exactly, 0 removes               |
//! | `mark_unowned`    | delete, absent is success                         |
//!
//! Mutations never return recomputed aggregates; callers re-read them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::{
    CollectionEntry, MutationOutcome, OwnershipError, OwnershipStore, RecordDetails,
};
use crate::catalog::{compare_card_numbers, CardId, CatalogStore};

pub struct OwnershipService {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn OwnershipStore>,
}

impl OwnershipService {
    pub fn new(catalog: Arc<dyn CatalogStore>, store: Arc<dyn OwnershipStore>) -> Self {
        Self { catalog, store }
    }

    pub fn store(&self) -> &dyn OwnershipStore {
        self.store.as_ref()
    }

    fn ensure_card(&self, card_id: CardId) -> Result<(), OwnershipError> {
        if self.catalog.card_exists(card_id)? {
            Ok(())
        } else {
            Err(OwnershipError::NotFound(format!("card {card_id}")))
        }
    }

    /// Own at least one copy. Repeating the call changes nothing.
    pub fn mark_owned(
        &self,
        user_id: &str,
        card_id: CardId,
        details: &RecordDetails,
    ) -> Result<MutationOutcome, OwnershipError> {
        self.ensure_card(card_id)?;
        let outcome = if self.store.insert_if_absent(user_id, card_id, 1, details)? {
            MutationOutcome::Created { quantity: 1 }
        } else {
            MutationOutcome::Unchanged
        };
        log_outcome("mark_owned", user_id, card_id, &outcome);
        Ok(outcome)
    }

    /// Add `delta` copies.
    pub fn increment_owned(
        &self,
        user_id: &str,
        card_id: CardId,
        delta: i64,
        details: &RecordDetails,
    ) -> Result<MutationOutcome, OwnershipError> {
        if delta < 1 {
            return Err(OwnershipError::Validation(format!(
                "quantity must be at least 1, got {delta}"
            )));
        }
        let delta = u32::try_from(delta).map_err(|_| {
            OwnershipError::Validation(format!("quantity {delta} is too large"))
        })?;
        self.ensure_card(card_id)?;

        let (previous, current) = self.store.increment(user_id, card_id, delta, details)?;
        let outcome = if previous == 0 {
            MutationOutcome::Created { quantity: current }
        } else {
            MutationOutcome::Updated { previous, current }
        };
        log_outcome("increment_owned", user_id, card_id, &outcome);
        Ok(outcome)
    }

    /// Set the owned quantity exactly. Zero is equivalent to `mark_unowned`.
    pub fn set_owned(
        &self,
        user_id: &str,
        card_id: CardId,
        quantity: i64,
        details: &RecordDetails,
    ) -> Result<MutationOutcome, OwnershipError> {
        if quantity < 0 {
            return Err(OwnershipError::Validation(format!(
                "quantity cannot be negative, got {quantity}"
            )));
        }
        let quantity = u32::try_from(quantity).map_err(|_| {
            OwnershipError::Validation(format!("quantity {quantity} is too large"))
        })?;
        self.ensure_card(card_id)?;

        let previous = self.store.set_quantity(user_id, card_id, quantity, details)?;
        let outcome = match (previous, quantity) {
            (0, 0) => MutationOutcome::Unchanged,
            (p, 0) => MutationOutcome::Removed { previous: p },
            (0, q) => MutationOutcome::Created { quantity: q },
            (p, q) => MutationOutcome::Updated {
                previous: p,
                current: q,
            },
        };
        log_outcome("set_owned", user_id, card_id, &outcome);
        Ok(outcome)
    }

    /// Drop every copy. Unowned cards stay unowned without error.
    pub fn mark_unowned(
        &self,
        user_id: &str,
        card_id: CardId,
    ) -> Result<MutationOutcome, OwnershipError> {
        self.ensure_card(card_id)?;
        let outcome = match self.store.remove(user_id, card_id)? {
            Some(previous) => MutationOutcome::Removed { previous },
            None => MutationOutcome::Unchanged,
        };
        log_outcome("mark_unowned", user_id, card_id, &outcome);
        Ok(outcome)
    }

    /// `mark_unowned` when the card is owned, `mark_owned` otherwise.
    pub fn toggle(&self, user_id: &str, card_id: CardId) -> Result<MutationOutcome, OwnershipError> {
        if self.store.get(user_id, card_id)?.is_some() {
            self.mark_unowned(user_id, card_id)
        } else {
            self.mark_owned(user_id, card_id, &RecordDetails::default())
        }
    }

    /// The user's owned cards with catalog data: most recently acquired first
    /// (undated last), then set name, then printed number.
    pub fn collection(&self, user_id: &str) -> Result<Vec<CollectionEntry>, OwnershipError> {
        let records = self.store.list(user_id)?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.catalog.snapshot()?;
        let sets: HashMap<_, _> = snapshot.sets.iter().map(|s| (s.id, s)).collect();
        let cards: HashMap<_, _> = snapshot.cards.iter().map(|c| (c.id, c)).collect();

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let Some(card) = cards.get(&record.card_id) else {
                debug!(card_id = record.card_id, "Skipping ownership of unknown card");
                continue;
            };
            let Some(set) = sets.get(&card.set_id) else {
                continue;
            };
            entries.push(CollectionEntry {
                card: (*card).clone(),
                set: (*set).clone(),
                record,
            });
        }

        entries.sort_by(|a, b| {
            match (a.record.acquired_date, b.record.acquired_date) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.set.name.cmp(&b.set.name))
            .then_with(|| compare_card_numbers(&a.card.number, &b.card.number))
        });
        Ok(entries)
    }
}

fn log_outcome(operation: &str, user_id: &str, card_id: CardId, outcome: &MutationOutcome) {
    info!(
        operation,
        user_id,
        card_id,
        outcome = outcome.as_str(),
        "Ownership mutation applied"
    );
}
