// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Durable client-side key/value storage.
//
// Two values live here: the bearer token issued at login and a locally
// generated client id. Both must survive restarts, so the production store is
// a small SQLite table next to the app's config file.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument, warn};

use allerscan_core::error::{AllerscanError, Result};

/// Storage key for the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the locally generated client id.
pub const CLIENT_ID_KEY: &str = "allergen-aware-user-id";

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
"#;

/// Durable string key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Key/value store backed by a single SQLite table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path` in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| AllerscanError::Storage(format!("open: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| AllerscanError::Storage(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| AllerscanError::Storage(format!("create table: {e}")))?;

        info!("session store opened");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AllerscanError::Storage(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| AllerscanError::Storage(format!("create table: {e}")))?;

        debug!("in-memory session store opened");
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AllerscanError::Storage("connection lock poisoned".into()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|e| AllerscanError::Storage(format!("get {key}: {e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| AllerscanError::Storage(format!("set {key}: {e}")))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| AllerscanError::Storage(format!("remove {key}: {e}")))?;
        Ok(())
    }
}

/// Volatile store for tests and previews.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| AllerscanError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values()?.remove(key);
        Ok(())
    }
}

/// Typed access to the session values kept in a [`KeyValueStore`].
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The stored bearer token, if any. Blank values count as absent.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(ACCESS_TOKEN_KEY)?
            .filter(|t| !t.trim().is_empty()))
    }

    /// `true` when a token is stored. Storage failures read as signed out.
    pub fn has_token(&self) -> bool {
        match self.token() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "could not read access token");
                false
            }
        }
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(ACCESS_TOKEN_KEY, token)?;
        info!("access token stored");
        Ok(())
    }

    pub fn clear_token(&self) -> Result<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        info!("access token cleared");
        Ok(())
    }

    /// The persistent client id, generated and stored on first use.
    pub fn client_id(&self) -> Result<String> {
        if let Some(id) = self.store.get(CLIENT_ID_KEY)?
            && !id.is_empty()
        {
            return Ok(id);
        }
        let id = generate_client_id(chrono::Utc::now().timestamp_millis());
        self.store.set(CLIENT_ID_KEY, &id)?;
        debug!(client_id = %id, "generated client id");
        Ok(id)
    }
}

/// `user_{epoch_ms}_{9 random base-36 chars}`.
fn generate_client_id(epoch_ms: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("user_{epoch_ms}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.db");

        {
            let store = SqliteStore::open(&path).expect("open");
            store.set(ACCESS_TOKEN_KEY, "tok-1").expect("set");
            store.set(ACCESS_TOKEN_KEY, "tok-2").expect("overwrite");
        }

        let store = SqliteStore::open(&path).expect("reopen");
        assert_eq!(store.get(ACCESS_TOKEN_KEY).expect("get").as_deref(), Some("tok-2"));
        store.remove(ACCESS_TOKEN_KEY).expect("remove");
        assert_eq!(store.get(ACCESS_TOKEN_KEY).expect("get"), None);
    }

    #[test]
    fn blank_token_reads_as_signed_out() {
        let session = SessionStore::in_memory();
        assert!(!session.has_token());
        session.set_token("  ").expect("set");
        assert!(!session.has_token());
        session.set_token("abc").expect("set");
        assert_eq!(session.token().expect("token").as_deref(), Some("abc"));
        session.clear_token().expect("clear");
        assert!(!session.has_token());
    }

    #[test]
    fn client_id_is_generated_once() {
        let session = SessionStore::new(Arc::new(SqliteStore::open_in_memory().expect("open")));
        let first = session.client_id().expect("id");
        let second = session.client_id().expect("id");
        assert_eq!(first, second);
    }

    #[test]
    fn client_id_format() {
        let id = generate_client_id(1_700_000_000_000);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
