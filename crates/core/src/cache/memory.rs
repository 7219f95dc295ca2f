//! In-process partition store.
//!
//! Same semantics as the SQLite store without persistence. Handy for
//! embedding and for tests that run on a paused clock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::hash::RequestKey;
use super::partitions::PartitionInfo;
use super::store::CacheStore;
use crate::Error;
use crate::response::StoredResponse;

#[derive(Default)]
struct Partition {
    created_at: String,
    entries: HashMap<String, StoredResponse>,
}

/// Partitions kept in creation order.
#[derive(Default)]
pub struct MemoryStore {
    partitions: Mutex<Vec<(String, Partition)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, Partition)>> {
        self.partitions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn find<'a>(partitions: &'a mut Vec<(String, Partition)>, name: &str) -> &'a mut Partition {
    let idx = match partitions.iter().position(|(n, _)| n == name) {
        Some(idx) => idx,
        None => {
            let partition = Partition { created_at: Utc::now().to_rfc3339(), entries: HashMap::new() };
            partitions.push((name.to_string(), partition));
            partitions.len() - 1
        }
    };
    &mut partitions[idx].1
}

fn stamped(response: &StoredResponse) -> StoredResponse {
    StoredResponse { stored_at: Some(Utc::now()), ..response.clone() }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        find(&mut self.lock(), partition);
        Ok(())
    }

    async fn get(&self, partition: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        Ok(self
            .lock()
            .iter()
            .find(|(n, _)| n == partition)
            .and_then(|(_, p)| p.entries.get(&key.hash).cloned()))
    }

    async fn match_any(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        Ok(self.lock().iter().find_map(|(_, p)| p.entries.get(&key.hash).cloned()))
    }

    async fn put(&self, partition: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        find(&mut self.lock(), partition)
            .entries
            .insert(key.hash.clone(), stamped(response));
        Ok(())
    }

    async fn put_all(&self, partition: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        let mut partitions = self.lock();
        let target = find(&mut partitions, partition);
        for (key, response) in &entries {
            target.entries.insert(key.hash.clone(), stamped(response));
        }
        Ok(())
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        let mut partitions = self.lock();
        let before = partitions.len();
        partitions.retain(|(n, _)| n != partition);
        Ok(partitions.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock().iter().map(|(n, _)| n.clone()).collect())
    }

    async fn info(&self) -> Result<Vec<PartitionInfo>, Error> {
        Ok(self
            .lock()
            .iter()
            .map(|(name, p)| PartitionInfo {
                name: name.clone(),
                entries: p.entries.len() as u64,
                created_at: p.created_at.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn key(url: &str) -> RequestKey {
        RequestKey::new("GET", &Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_match_any_in_creation_order() {
        let store = MemoryStore::new();
        let k = key("https://example.com/");
        store.put("a-v1", &k, &StoredResponse::ok("text/html", "first")).await.unwrap();
        store.put("b-v1", &k, &StoredResponse::ok("text/html", "second")).await.unwrap();

        assert_eq!(store.match_any(&k).await.unwrap().unwrap().body_text(), "first");
        assert_eq!(store.keys().await.unwrap(), vec!["a-v1", "b-v1"]);
    }

    #[tokio::test]
    async fn test_delete_and_info() {
        let store = MemoryStore::new();
        store.open("a-v1").await.unwrap();
        store
            .put_all("b-v1", vec![(key("https://example.com/x"), StoredResponse::ok("text/plain", "x"))])
            .await
            .unwrap();

        let info = store.info().await.unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].entries, 0);
        assert_eq!(info[1].entries, 1);

        assert!(store.delete("a-v1").await.unwrap());
        assert!(!store.delete("a-v1").await.unwrap());
        assert_eq!(store.keys().await.unwrap(), vec!["b-v1"]);
    }

    #[tokio::test]
    async fn test_put_stamps_stored_at() {
        let store = MemoryStore::new();
        let k = key("https://example.com/");
        store.put("d-v1", &k, &StoredResponse::ok("text/html", "x")).await.unwrap();
        assert!(store.get("d-v1", &k).await.unwrap().unwrap().stored_at.is_some());
    }
}
