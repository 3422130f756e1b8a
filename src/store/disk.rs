use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<SystemTime>,
}

/// Durable collection over one fjall partition. Values are wrapped with
/// their expiry; storage failures degrade to cache misses rather than
/// surfacing to callers.
pub struct DiskCollection {
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let res: Result<Option<Vec<u8>>> = (|| {
            if let Some(raw) = self.partition.get(key)? {
                let entry: CacheEntry = serde_json::from_slice(&raw)?;
                if let Some(expires_at) = entry.expires_at {
                    if SystemTime::now() > expires_at {
                        debug!(
                            "Cache entry expired for key: {}",
                            String::from_utf8_lossy(key)
                        );
                        self.partition.remove(key)?;
                        return Ok(None);
                    }
                }
                debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
                return Ok(Some(entry.value));
            }
            debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
            Ok(None)
        })();

        match res {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) {
        let res: Result<()> = (|| {
            let expires_at = ttl.map(|d| SystemTime::now() + d);
            let entry = CacheEntry {
                value: value.to_vec(),
                expires_at,
            };
            self.partition.insert(key, serde_json::to_vec(&entry)?)?;
            debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCollection put error: {}", e);
        }
    }

    async fn clear(&self) {
        let res: Result<()> = (|| {
            let keys: Vec<_> = self
                .partition
                .iter()
                .filter_map(|kv| kv.ok().map(|(key, _)| key))
                .collect();
            for key in keys {
                self.partition.remove(key)?;
            }
            debug!("Cache CLEAR");
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCollection clear error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::{Keyspace, PartitionCreateOptions};
    use tempfile::{TempDir, tempdir};
    use tokio::time::sleep;

    fn test_collection() -> (TempDir, Keyspace, DiskCollection) {
        let dir = tempdir().unwrap();
        let keyspace = fjall::Config::new(dir.path()).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        (dir, keyspace, DiskCollection::new(partition))
    }

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let (_dir, _keyspace, cache) = test_collection();

        // Initially, cache is empty
        assert!(cache.get(b"key1").await.is_none());

        // Put a value without TTL
        cache.put(b"key1", b"value1", None).await;

        // Get the value
        assert_eq!(cache.get(b"key1").await, Some(b"value1".to_vec()));

        // Get a non-existent key
        assert!(cache.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let (_dir, _keyspace, cache) = test_collection();

        // Put value with 10ms TTL
        cache
            .put(b"key1", b"value1", Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(b"key1").await, Some(b"value1".to_vec()));

        // Wait for TTL expiration
        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(b"key1").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_clear() {
        let (_dir, _keyspace, cache) = test_collection();

        cache.put(b"key1", b"value1", None).await;
        cache.put(b"key2", b"value2", None).await;

        cache.clear().await;

        assert!(cache.get(b"key1").await.is_none());
        assert!(cache.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopening_the_partition() {
        let dir = tempdir().unwrap();
        {
            let keyspace = fjall::Config::new(dir.path()).open().unwrap();
            let partition = keyspace
                .open_partition("test", PartitionCreateOptions::default())
                .unwrap();
            let cache = DiskCollection::new(partition);
            cache.put(b"key1", b"value1", None).await;
            keyspace.persist(fjall::PersistMode::SyncAll).unwrap();
        }

        let keyspace = fjall::Config::new(dir.path()).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        let cache = DiskCollection::new(partition);
        assert_eq!(cache.get(b"key1").await, Some(b"value1".to_vec()));
    }
}
