//! Records as they appear in the pokemon-tcg-data JSON files.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::catalog::{NewCard, NewSet, SetId, DEFAULT_ERA};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceImages {
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub ptcgo_code: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub printed_total: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: SourceImages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCard {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub number: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub supertype: Option<String>,
    #[serde(default)]
    pub images: SourceImages,
}

/// Eras recognised from words in a set name, checked in order.
const ERA_HINTS: &[(&[&str], &str)] = &[
    (&["scarlet", "violet", "sv"], "Scarlet & Violet"),
    (&["sword", "shield", "vmax", "vstar"], "Sword & Shield"),
    (&["sun", "moon", "sm", "gx"], "Sun & Moon"),
    (&["xy", "break"], "XY"),
    (&["black", "white", "bw"], "Black & White"),
];

/// Guess an era from a set name when the source has no series.
pub fn infer_era(name: &str) -> Option<&'static str> {
    let lowered = name.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    ERA_HINTS
        .iter()
        .find(|(hints, _)| hints.iter().any(|hint| words.contains(hint)))
        .map(|(_, era)| *era)
}

/// Display name for a pokemon-tcg-data language tag.
pub fn language_name(tag: &str) -> String {
    match tag {
        "en" => "English".to_string(),
        "ja" => "Japanese".to_string(),
        other => other.to_string(),
    }
}

impl SourceSet {
    /// Short code used to detect already-imported sets.
    pub fn code(&self) -> &str {
        self.ptcgo_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.id)
    }

    pub fn to_new_set(&self, language: &str) -> NewSet {
        let era = self
            .series
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| infer_era(&self.name).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_ERA.to_string());
        NewSet {
            name: self.name.clone(),
            code: self.code().to_string(),
            language: Some(language_name(language)),
            era: Some(era),
            release_date: self
                .release_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y/%m/%d").ok()),
            total_cards: self.total.or(self.printed_total),
            logo_url: self.images.logo.clone(),
        }
    }
}

impl SourceCard {
    pub fn to_new_card(&self, set_id: SetId) -> NewCard {
        NewCard {
            set_id,
            number: self.number.clone(),
            name: self.name.clone(),
            rarity: self.rarity.clone(),
            card_type: self.types.first().cloned().or_else(|| self.supertype.clone()),
            image_url: self.images.small.clone(),
        }
    }
}
