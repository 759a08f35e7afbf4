use std::collections::HashMap;

use super::{CompletionSummary, SetCompletion};
use crate::catalog::{compare_release_desc, Card, CatalogSnapshot, SetId};
use crate::ownership::OwnedQuantities;

/// `owned / total * 100` rounded half up; 0 for an empty group.
pub fn completion_percent(owned: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let owned = u64::from(owned.min(total));
    let total = u64::from(total);
    ((owned * 200 + total) / (total * 2)) as u32
}

fn is_owned(owned: &OwnedQuantities, card: &Card) -> bool {
    owned.get(&card.id).copied().unwrap_or(0) >= 1
}

/// Completion over an arbitrary group of distinct cards.
pub fn summarize_group<'a>(
    cards: impl IntoIterator<Item = &'a Card>,
    owned: &OwnedQuantities,
) -> CompletionSummary {
    let (owned_count, total) = cards.into_iter().fold((0u32, 0u32), |(o, t), card| {
        (o + u32::from(is_owned(owned, card)), t + 1)
    });
    CompletionSummary::new(owned_count, total)
}

/// One entry per set, newest release first (undated last, then by name).
///
/// A set's total is its printed size when known, otherwise the number of
/// catalogued cards; it is never reported below the owned count.
pub fn summarize_by_set(snapshot: &CatalogSnapshot, owned: &OwnedQuantities) -> Vec<SetCompletion> {
    let mut by_set: HashMap<SetId, Vec<&Card>> = HashMap::new();
    for card in &snapshot.cards {
        by_set.entry(card.set_id).or_default().push(card);
    }

    let mut result: Vec<SetCompletion> = snapshot
        .sets
        .iter()
        .map(|set| {
            let cards = by_set.get(&set.id).map(Vec::as_slice).unwrap_or_default();
            let counted = summarize_group(cards.iter().copied(), owned);
            let total = set
                .total_cards
                .unwrap_or(counted.total_cards)
                .max(counted.owned_cards);
            SetCompletion {
                set: set.clone(),
                summary: CompletionSummary::new(counted.owned_cards, total),
            }
        })
        .collect();

    result.sort_by(|a, b| {
        compare_release_desc(a.set.release_date, b.set.release_date)
            .then_with(|| a.set.name.cmp(&b.set.name))
    });
    result
}

/// Highest completion first; ties go to more owned cards, then set name.
pub fn top_n_most_complete(sets: &[SetCompletion], n: usize) -> Vec<SetCompletion> {
    let mut ranked = sets.to_vec();
    ranked.sort_by(|a, b| {
        b.summary
            .completion_percent
            .cmp(&a.summary.completion_percent)
            .then_with(|| b.summary.owned_cards.cmp(&a.summary.owned_cards))
            .then_with(|| a.set.name.cmp(&b.set.name))
    });
    ranked.truncate(n);
    ranked
}

/// Lowest completion first, skipping empty sets; ties go to fewer owned
/// cards, then set name.
pub fn top_n_least_complete(sets: &[SetCompletion], n: usize) -> Vec<SetCompletion> {
    let mut ranked: Vec<SetCompletion> = sets
        .iter()
        .filter(|s| s.summary.total_cards > 0)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        a.summary
            .completion_percent
            .cmp(&b.summary.completion_percent)
            .then_with(|| a.summary.owned_cards.cmp(&b.summary.owned_cards))
            .then_with(|| a.set.name.cmp(&b.set.name))
    });
    ranked.truncate(n);
    ranked
}
