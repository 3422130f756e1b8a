pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Store backed by a fjall keyspace on disk. Collections are created
/// lazily and handed out as shared references; if the keyspace cannot
/// be opened every collection falls back to memory.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    pub fn open(path: &Path) -> Self {
        let keyspace = match fjall::Config::new(path).open() {
            Ok(keyspace) => Some(keyspace),
            Err(e) => {
                warn!(
                    "Failed to open store at {}: {}. Caching in memory only.",
                    path.display(),
                    e
                );
                None
            }
        };
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    fn create_collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection> {
        if persist {
            if let Some(keyspace) = &self.keyspace {
                match keyspace.open_partition(name, PartitionCreateOptions::default()) {
                    Ok(partition) => {
                        debug!("Opened disk collection: {}", name);
                        return Arc::new(DiskCollection::new(partition));
                    }
                    Err(e) => {
                        warn!(
                            "Failed to open disk collection {}: {}. Using memory.",
                            name, e
                        );
                    }
                }
            }
        }
        debug!("Opened memory collection: {}", name);
        Arc::new(MemoryCollection::new())
    }
}

impl Store for KeyValueStore {
    fn collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection> {
        if let Some(existing) = self.collections.read().unwrap().get(name) {
            return existing.clone();
        }

        let mut collections = self.collections.write().unwrap();
        // Re-check after lock upgrade
        if let Some(existing) = collections.get(name) {
            return existing.clone();
        }
        let collection = self.create_collection(name, persist);
        collections.insert(name.to_string(), collection.clone());
        collection
    }
}
