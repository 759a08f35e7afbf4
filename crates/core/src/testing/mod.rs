//! Fixtures and mocks shared by unit and integration tests.

mod mock_collection_api;

pub use mock_collection_api::{CallGate, MockCollectionApi};

/// Small builders for catalog data and sample catalogs.
pub mod fixtures {
    use crate::catalog::{
        Card, CardId, CardSet, CatalogStore, NewCard, NewSet, SetId, SqliteCatalog,
        DEFAULT_LANGUAGE, DEFAULT_RARITY,
    };
    use crate::ownership::OwnedQuantities;
    use chrono::NaiveDate;

    /// A common, untyped card named after its number.
    pub fn card(id: CardId, set_id: SetId, number: &str) -> Card {
        Card {
            id,
            set_id,
            number: number.to_string(),
            name: format!("Card {number}"),
            rarity: DEFAULT_RARITY.to_string(),
            card_type: None,
            image_url: None,
        }
    }

    /// An English, undated set.
    pub fn set(id: SetId, name: &str, era: &str) -> CardSet {
        CardSet {
            id,
            name: name.to_string(),
            code: name.to_uppercase().replace(' ', ""),
            language: DEFAULT_LANGUAGE.to_string(),
            era: era.to_string(),
            release_date: None,
            total_cards: None,
            logo_url: None,
        }
    }

    pub fn owned_map(entries: &[(CardId, u32)]) -> OwnedQuantities {
        entries.iter().copied().collect()
    }

    /// An in-memory catalog with three sets:
    ///
    /// - "Base Set" (BS, era "Base", 1999-01-09): Alakazam #1 Rare Holo,
    ///   Pikachu #58 Common, Raichu #14 Rare
    /// - "Jungle" (JU, era "Base", 1999-06-16): Pikachu #60 Common,
    ///   Snorlax #11 Rare Holo
    /// - "Clay Burst" (SV2D, Japanese, era "Scarlet & Violet", 2023-03-10):
    ///   Pikachu #TG01 Special Art Rare
    pub fn seeded_catalog() -> SqliteCatalog {
        let catalog = SqliteCatalog::in_memory().expect("in-memory catalog");
        seed(&catalog);
        catalog
    }

    /// Insert the [`seeded_catalog`] data into an existing store.
    pub fn seed(catalog: &dyn CatalogStore) {
        let base = insert_set(catalog, "Base Set", "BS", None, "Base", (1999, 1, 9), Some(102));
        let jungle = insert_set(catalog, "Jungle", "JU", None, "Base", (1999, 6, 16), Some(64));
        let clay = insert_set(
            catalog,
            "Clay Burst",
            "SV2D",
            Some("Japanese"),
            "Scarlet & Violet",
            (2023, 3, 10),
            None,
        );

        for (set_id, number, name, rarity, card_type) in [
            (base, "1", "Alakazam", "Rare Holo", "Psychic"),
            (base, "58", "Pikachu", "Common", "Lightning"),
            (base, "14", "Raichu", "Rare", "Lightning"),
            (jungle, "60", "Pikachu", "Common", "Lightning"),
            (jungle, "11", "Snorlax", "Rare Holo", "Colorless"),
            (clay, "TG01", "Pikachu", "Special Art Rare", "Lightning"),
        ] {
            catalog
                .insert_card(NewCard {
                    set_id,
                    number: number.to_string(),
                    name: name.to_string(),
                    rarity: Some(rarity.to_string()),
                    card_type: Some(card_type.to_string()),
                    image_url: None,
                })
                .expect("insert card");
        }
    }

    fn insert_set(
        catalog: &dyn CatalogStore,
        name: &str,
        code: &str,
        language: Option<&str>,
        era: &str,
        (y, m, d): (i32, u32, u32),
        total_cards: Option<u32>,
    ) -> SetId {
        let (id, _) = catalog
            .insert_set(NewSet {
                name: name.to_string(),
                code: code.to_string(),
                language: language.map(str::to_string),
                era: Some(era.to_string()),
                release_date: NaiveDate::from_ymd_opt(y, m, d),
                total_cards,
                logo_url: None,
            })
            .expect("insert set");
        id
    }
}
