use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::Result;
use crate::models::ConversationEntry;

/// Minimal keyed persistence scoped to a client identity
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.inner.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.write().await.remove(key);
        Ok(())
    }
}

/// Per-client conversation history, newest first
///
/// Writes go through a read-modify-write on the backing store, so they are
/// serialized here; `KeyValueStore` has no compare-and-swap.
pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
    max_entries: usize,
    write_lock: Mutex<()>,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn KeyValueStore>, max_entries: usize) -> Self {
        Self {
            store,
            max_entries,
            write_lock: Mutex::new(()),
        }
    }

    fn key(client_id: &str) -> String {
        format!("history:{client_id}")
    }

    pub async fn list(&self, client_id: &str) -> Result<Vec<ConversationEntry>> {
        match self.store.get(&Self::key(client_id)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn append(&self, client_id: &str, entry: ConversationEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.list(client_id).await?;
        entries.insert(0, entry);
        entries.truncate(self.max_entries);
        let raw = serde_json::to_string(&entries)?;
        self.store.set(&Self::key(client_id), raw).await
    }

    pub async fn clear(&self, client_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&Self::key(client_id)).await
    }
}
