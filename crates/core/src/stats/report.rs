use std::collections::HashMap;

use super::grouping::into_groups;
use super::{
    group_by_era, group_by_language, group_by_rarity, summarize_by_set, summarize_group,
    top_n_least_complete, top_n_most_complete, OverallSummary, SetCompletion, StatsOptions,
    StatsReport,
};
use crate::catalog::CatalogSnapshot;
use crate::ownership::OwnedQuantities;

/// Totals across the whole catalog.
///
/// `most_common_rarity` is the rarity with the most distinct owned cards.
/// Ties go to the rarity met first when walking cards in id order.
pub fn overall_summary(snapshot: &CatalogSnapshot, owned: &OwnedQuantities) -> OverallSummary {
    let summary = summarize_group(&snapshot.cards, owned);

    let mut rarity_counts: Vec<(&str, u32)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for card in &snapshot.cards {
        if owned.get(&card.id).copied().unwrap_or(0) == 0 {
            continue;
        }
        let rarity = card.rarity.as_str();
        let idx = *positions.entry(rarity).or_insert_with(|| {
            rarity_counts.push((rarity, 0));
            rarity_counts.len() - 1
        });
        rarity_counts[idx].1 += 1;
    }

    let mut most_common: Option<(&str, u32)> = None;
    for (rarity, count) in rarity_counts {
        if most_common.is_none_or(|(_, best)| count > best) {
            most_common = Some((rarity, count));
        }
    }

    OverallSummary {
        total_cards_owned: owned.values().map(|q| u64::from(*q)).sum(),
        unique_cards_owned: summary.owned_cards,
        total_possible_cards: summary.total_cards,
        completion_percent: summary.completion_percent,
        most_common_rarity: most_common.map(|(rarity, _)| rarity.to_string()),
    }
}

/// The full statistics payload for one user.
pub fn build_report(
    snapshot: &CatalogSnapshot,
    owned: &OwnedQuantities,
    options: StatsOptions,
) -> StatsReport {
    let mut ranked: Vec<SetCompletion> = summarize_by_set(snapshot, owned);
    if options.started_sets_only {
        ranked.retain(|s| s.summary.owned_cards > 0);
    }

    StatsReport {
        overall: overall_summary(snapshot, owned),
        by_era: into_groups(group_by_era(snapshot, owned)),
        by_language: into_groups(group_by_language(snapshot, owned)),
        by_rarity: into_groups(group_by_rarity(snapshot, owned)),
        top_complete_sets: top_n_most_complete(&ranked, options.top_sets_limit),
        least_complete_sets: top_n_least_complete(&ranked, options.top_sets_limit),
    }
}
