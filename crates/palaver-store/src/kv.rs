//! Key-value operations on the `kv` table.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Fetch the raw JSON text stored under `key`.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Insert or replace the value under `key`.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete `key`.  Returns `true` if a row was deleted.
    pub fn kv_remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// Delete every key.
    pub fn kv_clear(&self) -> Result<()> {
        self.conn().execute("DELETE FROM kv", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_overwrite() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.kv_get("a").unwrap(), None);

        db.kv_set("a", "1").unwrap();
        db.kv_set("a", "2").unwrap();
        assert_eq!(db.kv_get("a").unwrap().as_deref(), Some("2"));
        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn remove_and_clear() {
        let db = Database::open_in_memory().unwrap();
        db.kv_set("a", "1").unwrap();
        db.kv_set("b", "2").unwrap();

        assert!(db.kv_remove("a").unwrap());
        assert!(!db.kv_remove("a").unwrap());
        assert_eq!(db.kv_get("b").unwrap().as_deref(), Some("2"));

        db.kv_clear().unwrap();
        assert_eq!(db.kv_get("b").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("palaver_dark_mode", "true").unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(
            db.kv_get("palaver_dark_mode").unwrap().as_deref(),
            Some("true")
        );
    }
}
