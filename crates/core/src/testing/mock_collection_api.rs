//! In-memory [`CollectionApi`] for toggle-session tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::catalog::{CardId, SetId};
use crate::client::{ClientError, CollectionApi};
use crate::listing::{CardListing, SetListing};
use crate::stats::completion_percent;
use crate::testing::fixtures;

#[derive(Default)]
struct MockState {
    sets: BTreeMap<SetId, (String, Vec<CardId>)>,
    cards: BTreeMap<CardId, (SetId, String)>,
    quantities: BTreeMap<CardId, u32>,
    calls: Vec<String>,
    next_error: Option<ClientError>,
    fail_reads: bool,
    gate: Option<CallGate>,
    read_gate: Option<CallGate>,
}

/// Parks calls until released, so tests can observe `Processing`.
#[derive(Clone, Default)]
pub struct CallGate {
    entered: Arc<Notify>,
    proceed: Arc<Notify>,
}

impl CallGate {
    /// Wait until a call is parked at the gate.
    pub async fn wait_until_blocked(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.proceed.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.proceed.notified().await;
    }
}

/// Mock collection server.
///
/// Card ids are assigned sequentially from 1 across all added sets.
#[derive(Default)]
pub struct MockCollectionApi {
    state: Mutex<MockState>,
}

impl MockCollectionApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set whose cards carry the given numbers.
    pub fn add_set(&self, set_id: SetId, name: &str, numbers: &[&str]) {
        let mut state = self.state.lock().unwrap();
        let mut ids = Vec::with_capacity(numbers.len());
        for number in numbers {
            let id = state.cards.len() as CardId + 1;
            state.cards.insert(id, (set_id, number.to_string()));
            ids.push(id);
        }
        state.sets.insert(set_id, (name.to_string(), ids));
    }

    pub fn set_quantity(&self, card_id: CardId, quantity: u32) {
        let mut state = self.state.lock().unwrap();
        if quantity == 0 {
            state.quantities.remove(&card_id);
        } else {
            state.quantities.insert(card_id, quantity);
        }
    }

    /// Fail the next mutation with `error`.
    pub fn fail_next(&self, error: ClientError) {
        self.state.lock().unwrap().next_error = Some(error);
    }

    /// Make every read fail until turned off.
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    /// Park every following mutation at the returned gate.
    pub fn pause_mutations(&self) -> CallGate {
        let gate = CallGate::default();
        self.state.lock().unwrap().gate = Some(gate.clone());
        gate
    }

    /// Park every following `set_cards` read at the returned gate.
    pub fn pause_reads(&self) -> CallGate {
        let gate = CallGate::default();
        self.state.lock().unwrap().read_gate = Some(gate.clone());
        gate
    }

    /// Mutations received, as `"<operation>:<card id>"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    async fn mutate(&self, operation: &str, card_id: CardId, quantity: u32) -> Result<(), ClientError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("{operation}:{card_id}"));
            state.gate.clone()
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        if !state.cards.contains_key(&card_id) {
            return Err(ClientError::Status {
                status: 404,
                message: format!("card {card_id}"),
            });
        }
        if quantity == 0 {
            state.quantities.remove(&card_id);
        } else {
            state.quantities.entry(card_id).or_insert(quantity);
        }
        Ok(())
    }

    fn read_guard(state: &MockState) -> Result<(), ClientError> {
        if state.fail_reads {
            Err(ClientError::Http("mock read failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CollectionApi for MockCollectionApi {
    async fn set_cards(&self, set_id: SetId) -> Result<Vec<CardListing>, ClientError> {
        let gate = self.state.lock().unwrap().read_gate.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let state = self.state.lock().unwrap();
        Self::read_guard(&state)?;
        let (_, ids) = state.sets.get(&set_id).ok_or_else(|| ClientError::Status {
            status: 404,
            message: format!("set {set_id}"),
        })?;
        Ok(ids
            .iter()
            .map(|id| {
                let (_, number) = &state.cards[id];
                let quantity = state.quantities.get(id).copied().unwrap_or(0);
                CardListing::new(fixtures::card(*id, set_id, number), quantity)
            })
            .collect())
    }

    async fn set(&self, set_id: SetId) -> Result<SetListing, ClientError> {
        let state = self.state.lock().unwrap();
        Self::read_guard(&state)?;
        let (name, ids) = state.sets.get(&set_id).ok_or_else(|| ClientError::Status {
            status: 404,
            message: format!("set {set_id}"),
        })?;
        let owned = ids
            .iter()
            .filter(|id| state.quantities.get(id).copied().unwrap_or(0) >= 1)
            .count() as u32;
        let total = ids.len() as u32;
        let set = fixtures::set(set_id, name, "Base");
        Ok(SetListing {
            id: set.id,
            name: set.name,
            code: set.code,
            language: set.language,
            era: set.era,
            release_date: None,
            logo_url: None,
            total_cards: total,
            owned_cards: owned,
            completion_percent: completion_percent(owned, total),
        })
    }

    async fn mark_owned(&self, card_id: CardId) -> Result<(), ClientError> {
        self.mutate("mark_owned", card_id, 1).await
    }

    async fn mark_unowned(&self, card_id: CardId) -> Result<(), ClientError> {
        self.mutate("mark_unowned", card_id, 0).await
    }
}
