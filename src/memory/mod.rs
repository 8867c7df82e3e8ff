// ABOUTME: Short-term memory where agents record the exchanges they complete.
// ABOUTME: Defines the Memory trait and an in-process store.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// One remembered exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRecord {
    /// Agent that produced the exchange.
    pub agent_name: String,

    /// Free-form content, typically the task and its result.
    pub content: String,

    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

impl MemoryRecord {
    /// Create a record stamped with the current time.
    pub fn new(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        Self {
            agent_name: agent_name.into(),
            content: content.into(),
            timestamp,
        }
    }
}

/// Trait for agent memory backends.
///
/// Implement this trait to back agent memory with a database or vector
/// store. Errors are reported to the caller, who decides whether they
/// matter; agents only log them.
#[async_trait]
pub trait Memory: Send + Sync {
    /// Save a record.
    async fn store(&self, record: MemoryRecord) -> Result<(), anyhow::Error>;

    /// Fetch up to `limit` records relevant to `query`.
    async fn retrieve(&self, query: &str, limit: usize)
    -> Result<Vec<MemoryRecord>, anyhow::Error>;

    /// Remove every record.
    async fn clear(&self) -> Result<(), anyhow::Error>;
}

/// In-memory record store.
///
/// Retrieval ignores the query and returns the most recent records in
/// insertion order. Useful for tests and single-process runs.
pub struct InMemoryStore {
    records: RwLock<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a new store wrapped in Arc for sharing between agents.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Memory for InMemoryStore {
    async fn store(&self, record: MemoryRecord) -> Result<(), anyhow::Error> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn retrieve(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, anyhow::Error> {
        let records = self.records.read().await;
        let limit = if limit == 0 || limit > records.len() {
            records.len()
        } else {
            limit
        };
        Ok(records[records.len() - limit..].to_vec())
    }

    async fn clear(&self) -> Result<(), anyhow::Error> {
        self.records.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn filled(count: usize) -> InMemoryStore {
        let store = InMemoryStore::new();
        for i in 0..count {
            store
                .store(MemoryRecord::new("writer", format!("entry {}", i)))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_store_and_len() {
        let store = filled(3).await;
        assert_eq!(store.len().await, 3);
        assert!(!store.is_empty().await);
    }

    #[tokio::test]
    async fn test_retrieve_most_recent() {
        let store = filled(5).await;

        let recent = store.retrieve("anything", 2).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["entry 3", "entry 4"]);
    }

    #[tokio::test]
    async fn test_retrieve_zero_or_oversized_limit_returns_all() {
        let store = filled(3).await;
        assert_eq!(store.retrieve("", 0).await.unwrap().len(), 3);
        assert_eq!(store.retrieve("", 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retrieve_empty_store() {
        let store = InMemoryStore::new();
        assert!(store.retrieve("", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = filled(2).await;
        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_record_timestamp_is_set() {
        let record = MemoryRecord::new("a", "b");
        assert!(record.timestamp > 0);
        assert_eq!(record.agent_name, "a");
    }
}
