use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{PlannerError, PlannerResult};
use crate::org::repository::{ensure_id, Repository};
use crate::org::Record;
use crate::store::migrations::BASE_MIGRATION;

/// Document store over a single SQLite table. Every record type lives in
/// the same table, keyed by `(collection, id)`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> PlannerResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        debug!(path = %path.display(), "opened document store");
        Ok(store)
    }

    pub fn open_in_memory() -> PlannerResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> PlannerResult<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    pub fn count(&self, collection: &str) -> PlannerResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl<T: Record> Repository<T> for SqliteStore {
    fn list(&self) -> PlannerResult<Vec<T>> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT body_json
FROM documents
WHERE collection = ?1
ORDER BY seq ASC
"#,
        )?;
        let rows = stmt
            .query_map(params![T::COLLECTION.as_slug()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut out = Vec::with_capacity(rows.len());
        for json in rows {
            out.push(serde_json::from_str(&json)?);
        }
        Ok(out)
    }

    fn get(&self, id: &str) -> PlannerResult<Option<T>> {
        let json = self
            .conn
            .query_row(
                "SELECT body_json FROM documents WHERE collection = ?1 AND id = ?2",
                params![T::COLLECTION.as_slug(), id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn create(&self, record: T) -> PlannerResult<T> {
        let record = ensure_id(record);
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2",
                params![T::COLLECTION.as_slug(), record.id()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(PlannerError::Validation(format!(
                "{} record {} already exists",
                T::COLLECTION,
                record.id()
            )));
        }
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
INSERT INTO documents(collection, id, body_json, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?4)
"#,
            params![
                T::COLLECTION.as_slug(),
                record.id(),
                serde_json::to_string(&record)?,
                now
            ],
        )?;
        debug!(collection = %T::COLLECTION, id = record.id(), "created record");
        Ok(record)
    }

    fn update(&self, record: &T) -> PlannerResult<()> {
        let changed = self.conn.execute(
            r#"
UPDATE documents
SET body_json = ?3, updated_at = ?4
WHERE collection = ?1 AND id = ?2
"#,
            params![
                T::COLLECTION.as_slug(),
                record.id(),
                serde_json::to_string(record)?,
                Utc::now().to_rfc3339()
            ],
        )?;
        if changed == 0 {
            return Err(PlannerError::not_found(T::COLLECTION.as_slug(), record.id()));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> PlannerResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![T::COLLECTION.as_slug(), id],
        )?;
        if changed == 0 {
            return Err(PlannerError::not_found(T::COLLECTION.as_slug(), id));
        }
        debug!(collection = %T::COLLECTION, id, "deleted record");
        Ok(())
    }
}
