use std::collections::{BTreeMap, HashMap};

use super::{summarize_by_set, summarize_group, CompletionSummary, GroupSummary, GroupingKey};
use crate::catalog::{Card, CardSet, CatalogSnapshot, DEFAULT_ERA, DEFAULT_LANGUAGE};
use crate::ownership::OwnedQuantities;

/// Buckets cards by `label` and summarizes each bucket.
fn partition<'a, F>(
    snapshot: &'a CatalogSnapshot,
    owned: &OwnedQuantities,
    label: F,
) -> BTreeMap<String, CompletionSummary>
where
    F: Fn(&'a Card, Option<&'a CardSet>) -> &'a str,
{
    let sets: HashMap<_, _> = snapshot.sets.iter().map(|s| (s.id, s)).collect();

    let mut buckets: BTreeMap<&str, Vec<&Card>> = BTreeMap::new();
    for card in &snapshot.cards {
        let key = label(card, sets.get(&card.set_id).copied());
        buckets.entry(key).or_default().push(card);
    }

    buckets
        .into_iter()
        .map(|(key, cards)| (key.to_string(), summarize_group(cards, owned)))
        .collect()
}

/// Completion per era. Cards whose set is missing land in "Unknown Era".
pub fn group_by_era(
    snapshot: &CatalogSnapshot,
    owned: &OwnedQuantities,
) -> BTreeMap<String, CompletionSummary> {
    partition(snapshot, owned, |_, set| {
        set.map(|s| s.era.as_str()).unwrap_or(DEFAULT_ERA)
    })
}

pub fn group_by_language(
    snapshot: &CatalogSnapshot,
    owned: &OwnedQuantities,
) -> BTreeMap<String, CompletionSummary> {
    partition(snapshot, owned, |_, set| {
        set.map(|s| s.language.as_str()).unwrap_or(DEFAULT_LANGUAGE)
    })
}

pub fn group_by_rarity(
    snapshot: &CatalogSnapshot,
    owned: &OwnedQuantities,
) -> BTreeMap<String, CompletionSummary> {
    partition(snapshot, owned, |card, _| card.rarity.as_str())
}

/// Grouped summaries for one key. Era, language and rarity buckets come
/// back sorted by key; set buckets keep the release ordering of
/// [`summarize_by_set`] and are keyed by set name.
pub fn group_by(
    key: GroupingKey,
    snapshot: &CatalogSnapshot,
    owned: &OwnedQuantities,
) -> Vec<GroupSummary> {
    let grouped = match key {
        GroupingKey::Set => {
            return summarize_by_set(snapshot, owned)
                .into_iter()
                .map(|s| GroupSummary {
                    key: s.set.name,
                    summary: s.summary,
                })
                .collect();
        }
        GroupingKey::Era => group_by_era(snapshot, owned),
        GroupingKey::Language => group_by_language(snapshot, owned),
        GroupingKey::Rarity => group_by_rarity(snapshot, owned),
    };
    into_groups(grouped)
}

pub(super) fn into_groups(grouped: BTreeMap<String, CompletionSummary>) -> Vec<GroupSummary> {
    grouped
        .into_iter()
        .map(|(key, summary)| GroupSummary { key, summary })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{card, owned_map, set};

    /// Set A (10 cards) and set B (5 cards), both era "Base".
    fn base_era_catalog() -> CatalogSnapshot {
        let mut cards = Vec::new();
        for i in 0..10 {
            cards.push(card(i, 1, &i.to_string()));
        }
        for i in 10..15 {
            cards.push(card(i, 2, &i.to_string()));
        }
        CatalogSnapshot {
            sets: vec![set(1, "A", "Base"), set(2, "B", "Base")],
            cards,
        }
    }

    #[test]
    fn test_group_by_era_merges_sets() {
        let snapshot = base_era_catalog();
        let owned = owned_map(&[(0, 1), (1, 1), (2, 1), (3, 1), (4, 2)]);

        let by_era = group_by_era(&snapshot, &owned);
        assert_eq!(by_era.len(), 1);
        assert_eq!(by_era["Base"], CompletionSummary::new(5, 15));
        assert_eq!(by_era["Base"].completion_percent, 33);
    }

    #[test]
    fn test_group_by_language_and_rarity() {
        let mut japanese = set(2, "Pokemon 151 JP", "Scarlet & Violet");
        japanese.language = "Japanese".to_string();
        let mut rare = card(3, 2, "3");
        rare.rarity = "Rare".to_string();
        let snapshot = CatalogSnapshot {
            sets: vec![set(1, "151", "Scarlet & Violet"), japanese],
            cards: vec![card(1, 1, "1"), card(2, 1, "2"), rare],
        };
        let owned = owned_map(&[(3, 1)]);

        let by_language = group_by_language(&snapshot, &owned);
        let keys: Vec<&String> = by_language.keys().collect();
        assert_eq!(keys, vec!["English", "Japanese"]);
        assert_eq!(by_language["Japanese"], CompletionSummary::new(1, 1));
        assert_eq!(by_language["English"], CompletionSummary::new(0, 2));

        let by_rarity = group_by_rarity(&snapshot, &owned);
        assert_eq!(by_rarity["Common"], CompletionSummary::new(0, 2));
        assert_eq!(by_rarity["Rare"].completion_percent, 100);
    }

    #[test]
    fn test_orphan_cards_fall_back_to_default_buckets() {
        let snapshot = CatalogSnapshot {
            sets: Vec::new(),
            cards: vec![card(1, 42, "1")],
        };
        let owned = owned_map(&[]);
        assert!(group_by_era(&snapshot, &owned).contains_key("Unknown Era"));
        assert!(group_by_language(&snapshot, &owned).contains_key("English"));
    }

    #[test]
    fn test_group_by_key_ordering() {
        let snapshot = CatalogSnapshot {
            sets: vec![set(1, "Zeta", "XY"), set(2, "Alpha", "Black & White")],
            cards: vec![card(1, 1, "1"), card(2, 2, "1")],
        };
        let owned = owned_map(&[(1, 1)]);

        let eras: Vec<String> = group_by(GroupingKey::Era, &snapshot, &owned)
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(eras, vec!["Black & White", "XY"]);

        let sets = group_by(GroupingKey::Set, &snapshot, &owned);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].key, "Alpha");
        assert_eq!(sets[1].summary, CompletionSummary::new(1, 1));
    }
}
