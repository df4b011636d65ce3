//! Entry reads and writes within one generation.

use super::generations::GenerationCache;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A response snapshot stored in the cache.
///
/// Captured byte-for-byte at write time: status, headers, and body are
/// owned copies, so handing the live response back to the caller never
/// races the write. Entries are overwritten wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl GenerationCache {
    /// Insert or replace the entry for a request key.
    ///
    /// Uses UPSERT semantics: last write wins, the entry is never patched
    /// in place.
    pub async fn put(&self, key: &str, response: &StoredResponse) -> Result<(), Error> {
        let generation = self.name().to_string();
        let key = key.to_string();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                        generation, key, url, status, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(generation, key) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        generation,
                        key,
                        &response.url,
                        response.status,
                        serde_json::to_string(&response.headers).unwrap_or_default(),
                        &response.body,
                        &response.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for a request key.
    ///
    /// Returns None on a cache miss.
    pub async fn lookup(&self, key: &str) -> Result<Option<StoredResponse>, Error> {
        let generation = self.name().to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT url, status, headers_json, body, stored_at
                     FROM entries WHERE generation = ?1 AND key = ?2",
                    params![generation, key],
                    |row| {
                        let headers_json: String = row.get(2)?;
                        Ok(StoredResponse {
                            url: row.get(0)?,
                            status: row.get::<_, i64>(1)? as u16,
                            headers: serde_json::from_str(&headers_json).unwrap_or_default(),
                            body: row.get(3)?,
                            stored_at: row.get(4)?,
                        })
                    },
                );

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in this generation.
    pub async fn len(&self) -> Result<u64, Error> {
        let generation = self.name().to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::cache::key::request_key;
    use url::Url;

    fn snapshot(url: &str, status: u16, body: &[u8]) -> StoredResponse {
        StoredResponse {
            url: url.to_string(),
            status,
            headers: vec![
                ("content-type".to_string(), "text/css".to_string()),
                ("cache-control".to_string(), "public, max-age=600".to_string()),
            ],
            body: body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    async fn generation(name: &str) -> GenerationCache {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_generation(name).await.unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_is_byte_identical() {
        let cache = generation("site-100").await;
        let url = Url::parse("https://fonts.example.com/css?family=Righteous").unwrap();
        let stored = snapshot("https://fonts.example.com/css", 200, b"@font-face {}");

        cache.put(&request_key(&url), &stored).await.unwrap();

        let found = cache.lookup(&request_key(&url)).await.unwrap().unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_lookup_matches_across_query_strings() {
        let cache = generation("site-100").await;
        let with_query = Url::parse("https://example.com/feed?page=1").unwrap();
        let without = Url::parse("https://example.com/feed").unwrap();

        cache
            .put(&request_key(&with_query), &snapshot("https://example.com/feed", 200, b"feed"))
            .await
            .unwrap();

        assert!(cache.lookup(&request_key(&without)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let cache = generation("site-100").await;
        assert!(cache.lookup("no-such-key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_wholesale() {
        let cache = generation("site-100").await;
        let url = Url::parse("https://example.com/").unwrap();
        let key = request_key(&url);

        cache.put(&key, &snapshot("https://example.com/", 200, b"v1")).await.unwrap();
        cache.put(&key, &snapshot("https://example.com/", 200, b"v2")).await.unwrap();

        let found = cache.lookup(&key).await.unwrap().unwrap();
        assert_eq!(found.body, b"v2");
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_generations_are_isolated() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let old = store.open_generation("site-100").await.unwrap();
        let new = store.open_generation("site-200").await.unwrap();
        let url = Url::parse("https://example.com/services").unwrap();

        old.put(&request_key(&url), &snapshot("https://example.com/services", 200, b"old"))
            .await
            .unwrap();

        assert!(new.lookup(&request_key(&url)).await.unwrap().is_none());
    }
}
