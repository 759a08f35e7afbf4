//! SQLite-backed ownership store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension};

use super::{OwnedQuantities, OwnershipError, OwnershipRecord, OwnershipStore, RecordDetails};
use crate::catalog::CardId;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteOwnershipStore {
    conn: Mutex<Connection>,
}

impl SqliteOwnershipStore {
    pub fn new(path: &Path) -> Result<Self, OwnershipError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, OwnershipError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), OwnershipError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS ownership (
                user_id TEXT NOT NULL,
                card_id INTEGER NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                acquired_date TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, card_id)
            );
            "#,
        )?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<OwnershipRecord> {
        let acquired: Option<String> = row.get(3)?;
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;
        Ok(OwnershipRecord {
            user_id: row.get(0)?,
            card_id: row.get(1)?,
            quantity: row.get(2)?,
            acquired_date: acquired.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            notes: row.get(4)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }

    fn current_quantity(
        conn: &Connection,
        user_id: &str,
        card_id: CardId,
    ) -> Result<Option<u32>, OwnershipError> {
        let quantity = conn
            .query_row(
                "SELECT quantity FROM ownership WHERE user_id = ? AND card_id = ?",
                params![user_id, card_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(quantity)
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// The acquisition date stored when a record is first created.
fn creation_date(details: &RecordDetails) -> String {
    details
        .acquired_date
        .unwrap_or_else(|| Utc::now().date_naive())
        .format(DATE_FORMAT)
        .to_string()
}

fn explicit_date(details: &RecordDetails) -> Option<String> {
    details
        .acquired_date
        .map(|d| d.format(DATE_FORMAT).to_string())
}

impl OwnershipStore for SqliteOwnershipStore {
    fn get(&self, user_id: &str, card_id: CardId) -> Result<Option<OwnershipRecord>, OwnershipError> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT user_id, card_id, quantity, acquired_date, notes, created_at, updated_at
                 FROM ownership WHERE user_id = ? AND card_id = ?",
                params![user_id, card_id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn owned_quantities(&self, user_id: &str) -> Result<OwnedQuantities, OwnershipError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT card_id, quantity FROM ownership WHERE user_id = ?")?;
        let owned = stmt
            .query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<OwnedQuantities, _>>()?;
        Ok(owned)
    }

    fn list(&self, user_id: &str) -> Result<Vec<OwnershipRecord>, OwnershipError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT user_id, card_id, quantity, acquired_date, notes, created_at, updated_at
             FROM ownership WHERE user_id = ? ORDER BY card_id",
        )?;
        let records = stmt
            .query_map(params![user_id], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn insert_if_absent(
        &self,
        user_id: &str,
        card_id: CardId,
        quantity: u32,
        details: &RecordDetails,
    ) -> Result<bool, OwnershipError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let inserted = conn.execute(
            "INSERT INTO ownership (user_id, card_id, quantity, acquired_date, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(user_id, card_id) DO NOTHING",
            params![
                user_id,
                card_id,
                quantity,
                creation_date(details),
                details.notes,
                now
            ],
        )?;
        Ok(inserted > 0)
    }

    fn increment(
        &self,
        user_id: &str,
        card_id: CardId,
        delta: u32,
        details: &RecordDetails,
    ) -> Result<(u32, u32), OwnershipError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let previous = Self::current_quantity(&tx, user_id, card_id)?.unwrap_or(0);
        if previous.checked_add(delta).is_none() {
            return Err(OwnershipError::Validation(format!(
                "adding {delta} to {previous} copies exceeds {}",
                u32::MAX
            )));
        }

        tx.execute(
            "INSERT INTO ownership (user_id, card_id, quantity, acquired_date, notes, created_at, updated_at)
             VALUES (:user, :card, :delta, :created_date, :notes, :now, :now)
             ON CONFLICT(user_id, card_id) DO UPDATE SET
                 quantity = quantity + excluded.quantity,
                 acquired_date = coalesce(:explicit_date, acquired_date),
                 notes = coalesce(excluded.notes, notes),
                 updated_at = excluded.updated_at",
            named_params! {
                ":user": user_id,
                ":card": card_id,
                ":delta": delta,
                ":created_date": creation_date(details),
                ":explicit_date": explicit_date(details),
                ":notes": details.notes,
                ":now": Utc::now().to_rfc3339(),
            },
        )?;

        let current = Self::current_quantity(&tx, user_id, card_id)?.unwrap_or(0);
        tx.commit()?;
        Ok((previous, current))
    }

    fn set_quantity(
        &self,
        user_id: &str,
        card_id: CardId,
        quantity: u32,
        details: &RecordDetails,
    ) -> Result<u32, OwnershipError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let previous = Self::current_quantity(&tx, user_id, card_id)?.unwrap_or(0);

        if quantity == 0 {
            tx.execute(
                "DELETE FROM ownership WHERE user_id = ? AND card_id = ?",
                params![user_id, card_id],
            )?;
        } else {
            tx.execute(
                "INSERT INTO ownership (user_id, card_id, quantity, acquired_date, notes, created_at, updated_at)
                 VALUES (:user, :card, :quantity, :created_date, :notes, :now, :now)
                 ON CONFLICT(user_id, card_id) DO UPDATE SET
                     quantity = excluded.quantity,
                     acquired_date = coalesce(:explicit_date, acquired_date),
                     notes = coalesce(excluded.notes, notes),
                     updated_at = excluded.updated_at",
                named_params! {
                    ":user": user_id,
                    ":card": card_id,
                    ":quantity": quantity,
                    ":created_date": creation_date(details),
                    ":explicit_date": explicit_date(details),
                    ":notes": details.notes,
                    ":now": Utc::now().to_rfc3339(),
                },
            )?;
        }

        tx.commit()?;
        Ok(previous)
    }

    fn remove(&self, user_id: &str, card_id: CardId) -> Result<Option<u32>, OwnershipError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let previous = Self::current_quantity(&tx, user_id, card_id)?;
        if previous.is_some() {
            tx.execute(
                "DELETE FROM ownership WHERE user_id = ? AND card_id = ?",
                params![user_id, card_id],
            )?;
        }
        tx.commit()?;
        Ok(previous)
    }
}
