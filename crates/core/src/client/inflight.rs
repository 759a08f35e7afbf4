use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::catalog::CardId;

/// Card ids with a toggle outstanding, scoped to one screen session.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    cards: Arc<Mutex<HashSet<CardId>>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `card_id`. `None` when a toggle for it is already running.
    /// The claim is released when the ticket drops.
    pub fn try_acquire(&self, card_id: CardId) -> Option<InFlightTicket> {
        let mut cards = self.cards.lock().unwrap();
        if !cards.insert(card_id) {
            return None;
        }
        Some(InFlightTicket {
            card_id,
            cards: Arc::clone(&self.cards),
        })
    }

    pub fn is_in_flight(&self, card_id: CardId) -> bool {
        self.cards.lock().unwrap().contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct InFlightTicket {
    card_id: CardId,
    cards: Arc<Mutex<HashSet<CardId>>>,
}

impl InFlightTicket {
    pub fn card_id(&self) -> CardId {
        self.card_id
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        if let Ok(mut cards) = self.cards.lock() {
            cards.remove(&self.card_id);
        }
    }
}
