//! Partition manager: decides which partitions are current and purges the rest.

use std::sync::Arc;

use offcache_core::{CacheStore, Error, PartitionInfo, PartitionNames};

pub struct PartitionManager {
    store: Arc<dyn CacheStore>,
    names: PartitionNames,
}

impl PartitionManager {
    pub fn new(store: Arc<dyn CacheStore>, names: PartitionNames) -> Self {
        Self { store, names }
    }

    pub async fn partitions(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.store.info().await
    }

    /// Delete every partition that is not current. Run at activation.
    pub async fn purge_obsolete(&self) -> Result<Vec<String>, Error> {
        self.purge_where(|name| self.names.is_obsolete(name)).await
    }

    /// Delete version-tagged partitions that are not current. Run periodically.
    pub async fn purge_stale_versions(&self) -> Result<Vec<String>, Error> {
        self.purge_where(|name| self.names.is_stale_version(name)).await
    }

    async fn purge_where(&self, doomed: impl Fn(&str) -> bool) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.store.keys().await? {
            if !doomed(&name) {
                continue;
            }
            if self.store.delete(&name).await? {
                tracing::info!(partition = %name, "removed old partition");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offcache_core::MemoryStore;

    async fn seeded(names: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for name in names {
            store.open(name).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_purge_obsolete() {
        let store = seeded(&["static-v1", "dynamic-v1", "static-v0", "orphan-v1"]).await;
        let manager = PartitionManager::new(store.clone(), PartitionNames::with_names("static-v1", "dynamic-v1"));

        let deleted = manager.purge_obsolete().await.unwrap();
        assert_eq!(deleted, vec!["static-v0", "orphan-v1"]);
        assert_eq!(store.keys().await.unwrap(), vec!["static-v1", "dynamic-v1"]);
    }

    #[tokio::test]
    async fn test_purge_stale_versions_spares_unversioned() {
        let store = seeded(&["app-static-v1", "app-static-v0", "app-dynamic-v0", "scratch"]).await;
        let manager = PartitionManager::new(store.clone(), PartitionNames::new("app", "v1"));

        let deleted = manager.purge_stale_versions().await.unwrap();
        assert_eq!(deleted, vec!["app-static-v0", "app-dynamic-v0"]);
        assert_eq!(store.keys().await.unwrap(), vec!["app-static-v1", "scratch"]);
    }

    #[tokio::test]
    async fn test_purge_nothing_to_do() {
        let store = seeded(&["app-static-v1"]).await;
        let manager = PartitionManager::new(store, PartitionNames::new("app", "v1"));
        assert!(manager.purge_obsolete().await.unwrap().is_empty());
        assert_eq!(manager.partitions().await.unwrap().len(), 1);
    }
}
