//! SQLite-backed wishlist store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{Priority, WishlistError, WishlistId, WishlistItem, WishlistStore, WishlistUpdate};
use crate::catalog::CardId;

const SELECT_COLUMNS: &str = "SELECT wishlist_id, user_id, card_id, priority, notes, added_at FROM wishlist";

pub struct SqliteWishlistStore {
    conn: Mutex<Connection>,
}

impl SqliteWishlistStore {
    pub fn new(path: &Path) -> Result<Self, WishlistError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, WishlistError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), WishlistError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS wishlist (
                wishlist_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                card_id INTEGER NOT NULL,
                priority TEXT NOT NULL DEFAULT 'Medium',
                notes TEXT,
                added_at TEXT NOT NULL,
                UNIQUE (user_id, card_id)
            );
            "#,
        )?;
        Ok(())
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<WishlistItem> {
        let priority: String = row.get(3)?;
        let added_at: String = row.get(5)?;
        Ok(WishlistItem {
            id: row.get(0)?,
            user_id: row.get(1)?,
            card_id: row.get(2)?,
            priority: priority.parse().unwrap_or_default(),
            notes: row.get(4)?,
            added_at: DateTime::parse_from_rfc3339(&added_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn fetch(
        conn: &Connection,
        user_id: &str,
        id: WishlistId,
    ) -> Result<Option<WishlistItem>, WishlistError> {
        let item = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE user_id = ? AND wishlist_id = ?"),
                params![user_id, id],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }
}

impl WishlistStore for SqliteWishlistStore {
    fn list(&self, user_id: &str) -> Result<Vec<WishlistItem>, WishlistError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ?
             ORDER BY CASE priority WHEN 'High' THEN 0 WHEN 'Medium' THEN 1 ELSE 2 END,
                      added_at DESC, wishlist_id DESC"
        ))?;
        let items = stmt
            .query_map(params![user_id], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn get(&self, user_id: &str, id: WishlistId) -> Result<Option<WishlistItem>, WishlistError> {
        let conn = self.conn.lock().unwrap();
        Self::fetch(&conn, user_id, id)
    }

    fn find_by_card(
        &self,
        user_id: &str,
        card_id: CardId,
    ) -> Result<Option<WishlistItem>, WishlistError> {
        let conn = self.conn.lock().unwrap();
        let item = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE user_id = ? AND card_id = ?"),
                params![user_id, card_id],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    fn insert(
        &self,
        user_id: &str,
        card_id: CardId,
        priority: Priority,
        notes: Option<String>,
    ) -> Result<WishlistItem, WishlistError> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT INTO wishlist (user_id, card_id, priority, notes, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, card_id) DO NOTHING",
            params![
                user_id,
                card_id,
                priority.as_str(),
                notes,
                Utc::now().to_rfc3339()
            ],
        )?;
        if inserted == 0 {
            return Err(WishlistError::AlreadyListed(card_id));
        }
        let id = conn.last_insert_rowid();
        Self::fetch(&conn, user_id, id)?
            .ok_or_else(|| WishlistError::NotFound(format!("wishlist item {id}")))
    }

    fn update(
        &self,
        user_id: &str,
        id: WishlistId,
        update: &WishlistUpdate,
    ) -> Result<Option<WishlistItem>, WishlistError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE wishlist SET
                 priority = coalesce(?1, priority),
                 notes = coalesce(?2, notes)
             WHERE user_id = ?3 AND wishlist_id = ?4",
            params![
                update.priority.map(|p| p.as_str()),
                update.notes,
                user_id,
                id
            ],
        )?;
        Self::fetch(&conn, user_id, id)
    }

    fn delete(&self, user_id: &str, id: WishlistId) -> Result<bool, WishlistError> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM wishlist WHERE user_id = ? AND wishlist_id = ?",
            params![user_id, id],
        )?;
        Ok(deleted > 0)
    }
}
