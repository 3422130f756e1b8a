//! Cache abstractions used by the providers

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A named set of byte key-value pairs with optional per-entry TTL.
/// Expired entries read back as misses.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>);

    /// Drops every entry in the collection.
    async fn clear(&self);
}

/// Hands out named collections. `persist` asks for a durable backend;
/// implementations may fall back to memory when none is available.
pub trait Store: Send + Sync {
    fn collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection>;
}
