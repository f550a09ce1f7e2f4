//! In-memory conversation store for testing and development.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::traits::conversation::{ConversationRecord, ConversationStore, StoreError};

/// Append-only in-memory archive.
///
/// Not suitable for production as data is lost on restart.
#[derive(Default)]
pub struct MemoryConversationStore {
    records: RwLock<Vec<ConversationRecord>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn append(&self, record: ConversationRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn read_by_session(&self, session_id: &str) -> Result<Vec<ConversationRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn read_by_slug(&self, slug: &str) -> Result<Option<ConversationRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.slug == slug)
            .cloned())
    }

    async fn delete_session(&self, session_id: &str) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.session_id != session_id);
        Ok(before - records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_read_delete() {
        let store = MemoryConversationStore::new();
        let first = ConversationRecord::new("s1", "q1", "a1");
        let slug = first.slug.clone();
        store.append(first).await.unwrap();
        store.append(ConversationRecord::new("s1", "q2", "a2")).await.unwrap();
        store.append(ConversationRecord::new("s2", "q3", "a3")).await.unwrap();

        let session = store.read_by_session("s1").await.unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session[0].question, "q1");

        let found = store.read_by_slug(&slug).await.unwrap().unwrap();
        assert_eq!(found.answer, "a1");
        assert!(store.read_by_slug("missing").await.unwrap().is_none());

        assert_eq!(store.delete_session("s1").await.unwrap(), 2);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.delete_session("s1").await.unwrap(), 0);
    }
}
