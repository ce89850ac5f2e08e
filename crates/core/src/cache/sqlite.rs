//! SQLite-backed cache store.
//!
//! This module handles opening the SQLite database, applying required
//! pragmas for performance and concurrency (WAL mode), running migrations,
//! and the per-store entry CRUD. Database operations run on a background
//! thread via tokio-rusqlite; SQLite gives atomic put/match/delete per key.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, params};
use tokio_rusqlite::rusqlite;

use super::migrations;
use super::store::CacheStore;
use crate::{Error, RequestKey, StoredResponse};

/// Persistent cache store handle.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn open_or_create(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, name: &str, key: &RequestKey, response: StoredResponse) -> Result<(), Error> {
        if !key.is_get() || !key.is_http() {
            return Err(Error::UnsupportedRequest(key.to_string()));
        }
        let name = name.to_string();
        let key_hash = key.cache_key();
        let method = key.method.clone();
        let url = key.url.to_string();
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                conn.execute(
                    "INSERT INTO entries (
                        store_name, key_hash, method, url, status,
                        content_type, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(store_name, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        content_type = excluded.content_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        name,
                        key_hash,
                        method,
                        url,
                        response.status,
                        response.content_type,
                        headers_json,
                        response.body,
                        response.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn match_entry(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let name = name.to_string();
        let key_hash = key.cache_key();

        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, content_type, headers_json, body, stored_at
                     FROM entries WHERE store_name = ?1 AND key_hash = ?2",
                    params![name, key_hash],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Vec<u8>>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                );

                match result {
                    Ok((status, content_type, headers_json, body, stored_at)) => {
                        let headers: Vec<(String, String)> =
                            serde_json::from_str(&headers_json).unwrap_or_default();
                        Ok(Some(StoredResponse { status, content_type, headers, body, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn contains(&self, name: &str, key: &RequestKey) -> Result<bool, Error> {
        let name = name.to_string();
        let key_hash = key.cache_key();

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn
                    .query_row(
                        "SELECT EXISTS(
                            SELECT 1 FROM entries WHERE store_name = ?1 AND key_hash = ?2
                        )",
                        params![name, key_hash],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn list_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                // entries go with the store via ON DELETE CASCADE
                let deleted = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_key(path: &str) -> RequestKey {
        RequestKey::get(&format!("https://example.com{path}")).unwrap()
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert!(store.list_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let key = asset_key("/style.css");
        let response = StoredResponse::new(200, b"body { color: teal; }".to_vec()).with_content_type("text/css");

        store.put("app-v1", &key, response.clone()).await.unwrap();

        let found = store.match_entry("app-v1", &key).await.unwrap().unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.content_type.as_deref(), Some("text/css"));
        assert_eq!(found.body, response.body);
    }

    #[tokio::test]
    async fn test_put_rejects_non_get_key() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let key = RequestKey::new("POST", "https://example.com/api/submit").unwrap();

        let err = store
            .put("app-v1", &key, StoredResponse::new(200, b"ok".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedRequest(_)));
        assert!(!store.contains("app-v1", &key).await.unwrap());
    }

    #[tokio::test]
    async fn test_match_missing() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let found = store.match_entry("app-v1", &asset_key("/nope.js")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let key = asset_key("/data.json");

        store
            .put("app-v1", &key, StoredResponse::new(200, b"old".to_vec()))
            .await
            .unwrap();
        store
            .put("app-v1", &key, StoredResponse::new(200, b"new".to_vec()))
            .await
            .unwrap();

        let found = store.match_entry("app-v1", &key).await.unwrap().unwrap();
        assert_eq!(found.body, b"new".to_vec());
    }

    #[tokio::test]
    async fn test_entries_isolated_per_store() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let key = asset_key("/logo.png");

        store
            .put("app-v1", &key, StoredResponse::new(200, b"png".to_vec()))
            .await
            .unwrap();

        assert!(store.contains("app-v1", &key).await.unwrap());
        assert!(!store.contains("app-v2", &key).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_names_sorted() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.open_or_create("app-v2").await.unwrap();
        store.open_or_create("app-v1").await.unwrap();

        assert_eq!(store.list_names().await.unwrap(), vec!["app-v1", "app-v2"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_entries() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let key = asset_key("/index.html");
        store
            .put("app-v1", &key, StoredResponse::new(200, b"<html>".to_vec()))
            .await
            .unwrap();

        assert!(store.delete("app-v1").await.unwrap());
        assert!(store.list_names().await.unwrap().is_empty());
        assert!(store.match_entry("app-v1", &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_store() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert!(!store.delete("never-created").await.unwrap());
    }
}
