//! Cache generation lifecycle.
//!
//! A generation is a named snapshot of the cache corresponding to one
//! deployed version of the routing configuration. Exactly one generation is
//! current at any time after activation; during the install window the old
//! and new generation briefly coexist.

use super::connection::CacheStore;
use crate::Error;
use tokio_rusqlite::{Connection, params};

/// Handle to one named cache generation.
///
/// All entry reads and writes go through a generation handle, so nothing can
/// touch a generation that hasn't been opened. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct GenerationCache {
    pub(crate) conn: Connection,
    name: String,
}

impl GenerationCache {
    /// Name of the generation this handle is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CacheStore {
    /// Open a generation, creating it if absent, and return a handle bound
    /// to it.
    ///
    /// This is the only write surface available before activation: entries
    /// can only be stored through a handle, and a handle only exists for a
    /// generation that has been opened.
    pub async fn open_generation(&self, name: &str) -> Result<GenerationCache, Error> {
        let owned = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![owned, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(GenerationCache { conn: self.conn.clone(), name: name.to_string() })
    }

    /// Enumerate all existing generations, oldest first.
    pub async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY created_at, name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one generation and all its entries.
    ///
    /// Returns whether the generation existed.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let owned = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM generations WHERE name = ?1", params![owned])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every generation except `keep`.
    ///
    /// Returns the number of generations removed. Runs during activation and
    /// must be awaited to completion before the worker starts serving, so no
    /// request is ever served from storage that is mid-deletion.
    pub async fn purge_except(&self, keep: &str) -> Result<u64, Error> {
        let keep = keep.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM generations WHERE name != ?1", params![keep])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StoredResponse;
    use crate::cache::key::request_key;

    fn entry(url: &str) -> StoredResponse {
        StoredResponse {
            url: url.to_string(),
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: b"<html></html>".to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_open_generation_idempotent() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_generation("site-100").await.unwrap();
        store.open_generation("site-100").await.unwrap();

        assert_eq!(store.list_generations().await.unwrap(), vec!["site-100"]);
    }

    #[tokio::test]
    async fn test_list_generations_empty() {
        let store = CacheStore::open_in_memory().await.unwrap();
        assert!(store.list_generations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_generation("site-100").await.unwrap();

        assert!(store.delete_generation("site-100").await.unwrap());
        assert!(!store.delete_generation("site-100").await.unwrap());
        assert!(store.list_generations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_except_keeps_only_current() {
        let store = CacheStore::open_in_memory().await.unwrap();
        for name in ["site-100", "site-200", "site-300"] {
            store.open_generation(name).await.unwrap();
        }

        let removed = store.purge_except("site-300").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.list_generations().await.unwrap(), vec!["site-300"]);
    }

    #[tokio::test]
    async fn test_purge_except_with_no_prior_generations() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_generation("site-100").await.unwrap();

        let removed = store.purge_except("site-100").await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(store.list_generations().await.unwrap(), vec!["site-100"]);
    }

    #[tokio::test]
    async fn test_purge_cascades_to_entries() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let old = store.open_generation("site-100").await.unwrap();
        let url = url::Url::parse("https://example.com/").unwrap();
        old.put(&request_key(&url), &entry("https://example.com/")).await.unwrap();

        store.open_generation("site-200").await.unwrap();
        store.purge_except("site-200").await.unwrap();

        // Re-opening the purged name yields an empty generation.
        let reopened = store.open_generation("site-100").await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 0);
    }
}
