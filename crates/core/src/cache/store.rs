//! Store abstraction consumed by the strategy engine and lifecycle.
//!
//! The SQLite `CacheDb` is the production implementation; tests can swap in
//! stores that fail on purpose.

use async_trait::async_trait;

use super::connection::CacheDb;
use super::hash::RequestKey;
use super::partitions::PartitionInfo;
use crate::Error;
use crate::response::StoredResponse;

/// A persistent, asynchronous key-value store organized into named partitions.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open (creating if needed) a partition by name.
    async fn open(&self, partition: &str) -> Result<(), Error>;

    /// Look up a key in one partition.
    async fn get(&self, partition: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Look up a key in any partition.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Store a response, overwriting any previous entry for the key.
    async fn put(&self, partition: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error>;

    /// Store many responses atomically.
    async fn put_all(&self, partition: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error>;

    /// Delete a partition. Returns false if it did not exist.
    async fn delete(&self, partition: &str) -> Result<bool, Error>;

    /// Names of all partitions.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Partition summaries.
    async fn info(&self) -> Result<Vec<PartitionInfo>, Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        self.open_partition(partition).await
    }

    async fn get(&self, partition: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        self.get_entry(partition, key).await
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        CacheDb::match_any(self, key).await
    }

    async fn put(&self, partition: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        self.put_entry(partition, key, response).await
    }

    async fn put_all(&self, partition: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        self.put_entries(partition, entries).await
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        self.delete_partition(partition).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.partition_names().await
    }

    async fn info(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.partition_info().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    async fn exercise(store: &dyn CacheStore) {
        let key = RequestKey::new("GET", &Url::parse("https://example.com/").unwrap());
        store.open("s-v1").await.unwrap();
        store.put("d-v1", &key, &StoredResponse::ok("text/html", "hello")).await.unwrap();

        assert!(store.get("s-v1", &key).await.unwrap().is_none());
        let hit = store.match_any(&key).await.unwrap().unwrap();
        assert_eq!(hit.body_text(), "hello");
        assert_eq!(store.keys().await.unwrap(), vec!["s-v1", "d-v1"]);

        assert!(store.delete("d-v1").await.unwrap());
        assert!(store.match_any(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_db_as_trait_object() {
        let db = CacheDb::open_in_memory().await.unwrap();
        exercise(&db).await;
    }
}
