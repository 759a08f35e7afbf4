use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use super::{AuditError, AuditEvent, AuditFilter, AuditRecord, AuditStore};

pub struct SqliteAuditStore {
    conn: Mutex<Connection>,
}

impl SqliteAuditStore {
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, AuditError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), AuditError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS audit_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_type TEXT NOT NULL,
                card_id INTEGER,
                user_id TEXT,
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_events_timestamp ON audit_events(timestamp);
            CREATE INDEX IF NOT EXISTS idx_audit_events_card_id ON audit_events(card_id);
            CREATE INDEX IF NOT EXISTS idx_audit_events_user_id ON audit_events(user_id);
            "#,
        )?;
        Ok(())
    }

    fn where_clause(filter: &AuditFilter) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(card_id) = filter.card_id {
            conditions.push("card_id = ?");
            values.push(Value::Integer(card_id));
        }
        if let Some(event_type) = &filter.event_type {
            conditions.push("event_type = ?");
            values.push(Value::Text(event_type.clone()));
        }
        if let Some(user_id) = &filter.user_id {
            conditions.push("user_id = ?");
            values.push(Value::Text(user_id.clone()));
        }
        if let Some(from) = filter.from {
            conditions.push("timestamp >= ?");
            values.push(Value::Text(from.to_rfc3339()));
        }
        if let Some(to) = filter.to {
            conditions.push("timestamp <= ?");
            values.push(Value::Text(to.to_rfc3339()));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

impl AuditStore for SqliteAuditStore {
    fn insert(&self, record: &AuditRecord) -> Result<i64, AuditError> {
        let data = serde_json::to_string(&record.data)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO audit_events (timestamp, event_type, card_id, user_id, data)
             VALUES (?, ?, ?, ?, ?)",
            params![
                record.timestamp.to_rfc3339(),
                record.event_type,
                record.card_id,
                record.user_id,
                data,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let (where_clause, mut values) = Self::where_clause(filter);
        values.push(Value::Integer(filter.limit));
        values.push(Value::Integer(filter.offset));

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, timestamp, event_type, card_id, user_id, data FROM audit_events
             {where_clause} ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, timestamp, event_type, card_id, user_id, data)| {
                let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&timestamp)
                    .map_err(|e| AuditError::Database(format!("Invalid timestamp: {e}")))?
                    .with_timezone(&Utc);
                let data: AuditEvent = serde_json::from_str(&data)?;
                Ok(AuditRecord {
                    id,
                    timestamp,
                    event_type,
                    card_id,
                    user_id,
                    data,
                })
            })
            .collect()
    }

    fn count(&self, filter: &AuditFilter) -> Result<i64, AuditError> {
        let (where_clause, values) = Self::where_clause(filter);
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM audit_events {where_clause}"),
            params_from_iter(values),
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn ownership(user: &str, card_id: i64, outcome: &str) -> AuditEvent {
        AuditEvent::OwnershipChanged {
            user_id: user.to_string(),
            card_id,
            operation: "toggle".to_string(),
            outcome: outcome.to_string(),
            quantity: None,
        }
    }

    fn insert_at(store: &SqliteAuditStore, event: AuditEvent, minutes_ago: i64) -> i64 {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        store.insert(&AuditRecord::from_event(at, event)).unwrap()
    }

    #[test]
    fn test_insert_and_query_newest_first() {
        let store = SqliteAuditStore::in_memory().unwrap();
        insert_at(&store, ownership("ash", 1, "created"), 10);
        insert_at(&store, ownership("ash", 1, "removed"), 5);

        let records = store.query(&AuditFilter::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].id > 0);
        assert!(matches!(
            &records[0].data,
            AuditEvent::OwnershipChanged { outcome, .. } if outcome == "removed"
        ));
    }

    #[test]
    fn test_filters() {
        let store = SqliteAuditStore::in_memory().unwrap();
        insert_at(&store, ownership("ash", 1, "created"), 30);
        insert_at(&store, ownership("misty", 2, "created"), 20);
        insert_at(
            &store,
            AuditEvent::ServiceStarted {
                version: "0.1.0".to_string(),
                config_hash: "abc".to_string(),
            },
            10,
        );

        assert_eq!(store.query(&AuditFilter::new().with_card_id(2)).unwrap().len(), 1);
        assert_eq!(
            store.query(&AuditFilter::new().with_user_id("ash")).unwrap()[0].card_id,
            Some(1)
        );
        assert_eq!(
            store
                .query(&AuditFilter::new().with_event_type("service_started"))
                .unwrap()
                .len(),
            1
        );

        let recent = AuditFilter::new().with_time_range(Some(Utc::now() - Duration::minutes(25)), None);
        assert_eq!(store.count(&recent).unwrap(), 2);
    }

    #[test]
    fn test_pagination_and_count() {
        let store = SqliteAuditStore::in_memory().unwrap();
        for i in 0..7 {
            insert_at(&store, ownership("ash", i, "created"), 100 - i);
        }

        let page = store
            .query(&AuditFilter::new().with_limit(3).with_offset(3))
            .unwrap();
        let cards: Vec<Option<i64>> = page.iter().map(|r| r.card_id).collect();
        assert_eq!(cards, vec![Some(3), Some(2), Some(1)]);
        assert_eq!(store.count(&AuditFilter::new().with_limit(3)).unwrap(), 7);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.db");
        {
            let store = SqliteAuditStore::new(&path).unwrap();
            insert_at(&store, ownership("ash", 9, "created"), 1);
        }
        let store = SqliteAuditStore::new(&path).unwrap();
        assert_eq!(store.count(&AuditFilter::new()).unwrap(), 1);
    }
}
