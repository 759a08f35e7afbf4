use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ClientError, CollectionApi, InFlightGuard};
use crate::catalog::{CardId, SetId};
use crate::listing::{CardListing, SetListing};

/// Ownership of one card as the screen shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "quantity", rename_all = "snake_case")]
pub enum CardState {
    Unowned,
    Owned(u32),
    /// A toggle is outstanding; further toggles are refused.
    Processing,
}

impl CardState {
    fn from_listing(card: &CardListing) -> Self {
        if card.quantity >= 1 {
            CardState::Owned(card.quantity)
        } else {
            CardState::Unowned
        }
    }
}

#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("Card {0} is not part of this set")]
    UnknownCard(CardId),

    #[error("A toggle for card {0} is already in flight")]
    InFlight(CardId),

    /// The mutation failed; the card is back in its previous state.
    #[error("Toggle failed: {0}")]
    Api(ClientError),

    /// The mutation went through but the set could not be re-read.
    #[error("Refresh failed: {0}")]
    Refresh(ClientError),
}

#[derive(Debug, Default)]
struct ScreenData {
    cards: Vec<CardListing>,
    summary: Option<SetListing>,
    states: HashMap<CardId, CardState>,
}

/// State behind one set screen: the cards, their ownership, the set's
/// completion, and the toggles currently running.
pub struct ToggleSession {
    api: Arc<dyn CollectionApi>,
    set_id: SetId,
    guard: InFlightGuard,
    data: Mutex<ScreenData>,
}

impl ToggleSession {
    pub fn new(api: Arc<dyn CollectionApi>, set_id: SetId) -> Self {
        Self {
            api,
            set_id,
            guard: InFlightGuard::new(),
            data: Mutex::new(ScreenData::default()),
        }
    }

    pub fn set_id(&self) -> SetId {
        self.set_id
    }

    pub fn cards(&self) -> Vec<CardListing> {
        self.data.lock().unwrap().cards.clone()
    }

    pub fn summary(&self) -> Option<SetListing> {
        self.data.lock().unwrap().summary.clone()
    }

    pub fn state(&self, card_id: CardId) -> Option<CardState> {
        self.data.lock().unwrap().states.get(&card_id).copied()
    }

    /// Re-read the set's cards and completion. On failure nothing changes.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.reload(None).await.map(|_| ())
    }

    /// Cards with a toggle outstanding stay `Processing`, except `settling`,
    /// whose toggle is finishing and takes its state from the listing.
    /// Returns that state, if the card is still listed.
    async fn reload(&self, settling: Option<CardId>) -> Result<Option<CardState>, ClientError> {
        let (cards, summary) =
            tokio::try_join!(self.api.set_cards(self.set_id), self.api.set(self.set_id))?;

        let mut data = self.data.lock().unwrap();
        let mut states = HashMap::with_capacity(cards.len());
        for card in &cards {
            let state = if settling != Some(card.id) && self.guard.is_in_flight(card.id) {
                CardState::Processing
            } else {
                CardState::from_listing(card)
            };
            states.insert(card.id, state);
        }
        let settled = settling.and_then(|id| states.get(&id).copied());
        data.cards = cards;
        data.summary = Some(summary);
        data.states = states;
        Ok(settled)
    }

    /// Flip ownership of one card: un-own it when owned, own one copy
    /// otherwise. On success the set is re-read; on failure the card returns
    /// to the state it had before. The card stays `Processing`, and further
    /// toggles on it are refused, until the re-read has settled it.
    pub async fn toggle(&self, card_id: CardId) -> Result<CardState, ToggleError> {
        let (ticket, previous) = {
            let mut data = self.data.lock().unwrap();
            let previous = *data
                .states
                .get(&card_id)
                .ok_or(ToggleError::UnknownCard(card_id))?;
            if previous == CardState::Processing {
                return Err(ToggleError::InFlight(card_id));
            }
            let ticket = self
                .guard
                .try_acquire(card_id)
                .ok_or(ToggleError::InFlight(card_id))?;
            data.states.insert(card_id, CardState::Processing);
            (ticket, previous)
        };

        let (result, expected) = match previous {
            CardState::Owned(_) => (self.api.mark_unowned(card_id).await, CardState::Unowned),
            _ => (self.api.mark_owned(card_id).await, CardState::Owned(1)),
        };

        if let Err(e) = result {
            warn!(card_id, error = %e, "Toggle failed, reverting");
            self.data.lock().unwrap().states.insert(card_id, previous);
            return Err(ToggleError::Api(e));
        }

        let refreshed = self.reload(Some(card_id)).await;
        let settled = match &refreshed {
            Ok(state) => state.unwrap_or(expected),
            Err(_) => expected,
        };
        {
            // a concurrent refresh may have re-marked the card while the
            // ticket was still held
            let mut data = self.data.lock().unwrap();
            data.states.insert(card_id, settled);
            drop(ticket);
        }

        match refreshed {
            Ok(_) => {
                debug!(card_id, state = ?settled, "Toggle applied");
                Ok(settled)
            }
            Err(e) => Err(ToggleError::Refresh(e)),
        }
    }
}
