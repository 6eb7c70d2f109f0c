use rusqlite::{params, Connection};
use std::path::Path;

use crate::engine::EngineState;
use crate::error::StoreError;

const STATE_KEY: &str = "engine_state";

// Caller-side persistence: a key-value table holding the JSON-encoded
// engine state. The engine itself never touches this; each CLI command
// loads before the operation and saves after it.
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<EngineState>, StoreError> {
        let row: Result<String, rusqlite::Error> = self.conn.query_row(
            "SELECT value FROM state WHERE key = ?1",
            params![STATE_KEY],
            |row| row.get(0),
        );

        match row {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, state: &EngineState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.conn.execute(
            r#"
            INSERT INTO state (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![STATE_KEY, json],
        )?;
        Ok(())
    }
}
