use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

/// In-memory collection backed by a HashMap. Entries expire lazily on read.
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, CacheValue>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let cache = self.inner.lock().await;
        if let Some(entry) = cache.get(key) {
            if let Some(expiry) = entry.expires_at {
                if expiry < Instant::now() {
                    debug!("Cache entry expired for key: {}", String::from_utf8_lossy(key));
                    return None;
                }
            }
            debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
            return Some(entry.value.clone());
        }
        debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
        None
    }

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let cache_value = CacheValue {
            value: value.to_vec(),
            expires_at,
        };

        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        cache.insert(key.to_vec(), cache_value);
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}
