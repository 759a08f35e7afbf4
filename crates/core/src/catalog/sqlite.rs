//! SQLite-backed catalog store.

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    compare_card_numbers, compare_release_desc, normalize_label, Card, CardId, CardSearchQuery,
    CardPage, CardSet, CatalogCounts, CatalogError, CatalogSnapshot, CatalogStore, NewCard, NewSet,
    PageRequest, SetId, DEFAULT_ERA, DEFAULT_LANGUAGE, DEFAULT_RARITY, MAX_SEARCH_LIMIT,
};

const SET_COLUMNS: &str =
    "set_id, set_name, set_code, language, era, release_date, total_cards, logo_url";
const CARD_COLUMNS: &str = "card_id, set_id, card_number, card_name, rarity, card_type, image_url";

pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) the catalog tables in the database at `path`.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory catalog for tests.
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS card_sets (
                set_id INTEGER PRIMARY KEY AUTOINCREMENT,
                set_name TEXT NOT NULL,
                set_code TEXT NOT NULL UNIQUE,
                language TEXT NOT NULL,
                era TEXT NOT NULL,
                release_date TEXT,
                total_cards INTEGER,
                logo_url TEXT
            );

            CREATE TABLE IF NOT EXISTS cards (
                card_id INTEGER PRIMARY KEY AUTOINCREMENT,
                set_id INTEGER NOT NULL REFERENCES card_sets(set_id),
                card_number TEXT NOT NULL,
                card_name TEXT NOT NULL,
                rarity TEXT NOT NULL,
                card_type TEXT,
                image_url TEXT,
                UNIQUE(set_id, card_number)
            );

            CREATE INDEX IF NOT EXISTS idx_cards_set ON cards(set_id);
            CREATE INDEX IF NOT EXISTS idx_cards_name ON cards(card_name);
            "#,
        )?;
        Ok(())
    }

    fn row_to_set(row: &rusqlite::Row) -> rusqlite::Result<CardSet> {
        let release_date: Option<String> = row.get(5)?;
        let language: Option<String> = row.get(3)?;
        let era: Option<String> = row.get(4)?;
        Ok(CardSet {
            id: row.get(0)?,
            name: row.get(1)?,
            code: row.get(2)?,
            language: normalize_label(language.as_deref(), DEFAULT_LANGUAGE),
            era: normalize_label(era.as_deref(), DEFAULT_ERA),
            release_date: release_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            total_cards: row.get(6)?,
            logo_url: row.get(7)?,
        })
    }

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let rarity: Option<String> = row.get(4)?;
        Ok(Card {
            id: row.get(0)?,
            set_id: row.get(1)?,
            number: row.get(2)?,
            name: row.get(3)?,
            rarity: normalize_label(rarity.as_deref(), DEFAULT_RARITY),
            card_type: row.get(5)?,
            image_url: row.get(6)?,
        })
    }

    fn query_sets(conn: &Connection) -> Result<Vec<CardSet>, CatalogError> {
        let mut stmt = conn.prepare(&format!("SELECT {SET_COLUMNS} FROM card_sets"))?;
        let mut sets = stmt
            .query_map([], Self::row_to_set)?
            .collect::<Result<Vec<_>, _>>()?;
        sets.sort_by(|a, b| {
            compare_release_desc(a.release_date, b.release_date).then_with(|| a.name.cmp(&b.name))
        });
        Ok(sets)
    }

    fn query_all_cards(conn: &Connection) -> Result<Vec<Card>, CatalogError> {
        let mut stmt =
            conn.prepare(&format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY card_id"))?;
        let cards = stmt
            .query_map([], Self::row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }
}

impl CatalogStore for SqliteCatalog {
    fn list_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        Self::query_sets(&conn)
    }

    fn get_set(&self, id: SetId) -> Result<CardSet, CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {SET_COLUMNS} FROM card_sets WHERE set_id = ?"),
            params![id],
            Self::row_to_set,
        )
        .optional()?
        .ok_or_else(|| CatalogError::NotFound(format!("set {id}")))
    }

    fn cards_in_set(&self, set_id: SetId) -> Result<Vec<Card>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE set_id = ?"
        ))?;
        let mut cards = stmt
            .query_map(params![set_id], Self::row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;
        cards.sort_by(|a, b| compare_card_numbers(&a.number, &b.number));
        Ok(cards)
    }

    fn get_card(&self, id: CardId) -> Result<Card, CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {CARD_COLUMNS} FROM cards WHERE card_id = ?"),
            params![id],
            Self::row_to_card,
        )
        .optional()?
        .ok_or_else(|| CatalogError::NotFound(format!("card {id}")))
    }

    fn card_exists(&self, id: CardId) -> Result<bool, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let exists = conn
            .query_row("SELECT 1 FROM cards WHERE card_id = ?", params![id], |_| {
                Ok(())
            })
            .optional()?
            .is_some();
        Ok(exists)
    }

    fn all_cards(&self) -> Result<Vec<Card>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        Self::query_all_cards(&conn)
    }

    fn list_cards(&self, page: PageRequest) -> Result<CardPage, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY card_id LIMIT ?1 OFFSET ?2"
        ))?;
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let cards = stmt
            .query_map(params![page.page_size, offset], Self::row_to_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CardPage::new(page, cards, total as u64))
    }

    fn search_cards(&self, query: &CardSearchQuery) -> Result<Vec<Card>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let limit = query.limit.clamp(1, MAX_SEARCH_LIMIT);
        let blank_to_none = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards
             WHERE (?1 IS NULL OR instr(lower(card_name), lower(?1)) > 0)
               AND (?2 IS NULL OR instr(lower(coalesce(card_type, '')), lower(?2)) > 0)
               AND (?3 IS NULL OR rarity = ?3)
               AND (?4 IS NULL OR set_id = ?4)
             ORDER BY card_name, card_id
             LIMIT ?5"
        ))?;
        let cards = stmt
            .query_map(
                params![
                    blank_to_none(&query.q),
                    blank_to_none(&query.card_type),
                    blank_to_none(&query.rarity),
                    query.set_id,
                    limit
                ],
                Self::row_to_card,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        let conn = self.conn.lock().unwrap();
        Ok(CatalogSnapshot {
            sets: Self::query_sets(&conn)?,
            cards: Self::query_all_cards(&conn)?,
        })
    }

    fn insert_set(&self, set: NewSet) -> Result<(SetId, bool), CatalogError> {
        let conn = self.conn.lock().unwrap();

        let existing: Option<SetId> = conn
            .query_row(
                "SELECT set_id FROM card_sets WHERE set_code = ?",
                params![set.code],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok((id, false));
        }

        conn.execute(
            "INSERT INTO card_sets (set_name, set_code, language, era, release_date, total_cards, logo_url)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                set.name,
                set.code,
                normalize_label(set.language.as_deref(), DEFAULT_LANGUAGE),
                normalize_label(set.era.as_deref(), DEFAULT_ERA),
                set.release_date.map(|d| d.format("%Y-%m-%d").to_string()),
                set.total_cards,
                set.logo_url,
            ],
        )?;
        Ok((conn.last_insert_rowid(), true))
    }

    fn insert_card(&self, card: NewCard) -> Result<bool, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT INTO cards (set_id, card_number, card_name, rarity, card_type, image_url)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(set_id, card_number) DO NOTHING",
            params![
                card.set_id,
                card.number,
                card.name,
                normalize_label(card.rarity.as_deref(), DEFAULT_RARITY),
                card.card_type,
                card.image_url,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn stats(&self) -> Result<CatalogCounts, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let sets: i64 = conn.query_row("SELECT COUNT(*) FROM card_sets", [], |row| row.get(0))?;
        let cards: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(CatalogCounts {
            sets: sets as u64,
            cards: cards as u64,
        })
    }
}
