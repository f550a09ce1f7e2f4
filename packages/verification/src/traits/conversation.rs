//! Conversation store collaborator.
//!
//! Archives research inputs and outputs. The pipeline writes to it from a
//! detached task and never waits on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::events::EventSource;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// One archived question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: Uuid,
    pub session_id: String,
    /// Short shareable identifier
    pub slug: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<EventSource>,
    pub created_at: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(
        session_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            session_id: session_id.into(),
            slug: id.simple().to_string()[..10].to_string(),
            question: question.into(),
            answer: answer.into(),
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<EventSource>) -> Self {
        self.sources = sources;
        self
    }
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn append(&self, record: ConversationRecord) -> Result<(), StoreError>;

    /// Records of a session, oldest first.
    async fn read_by_session(&self, session_id: &str) -> Result<Vec<ConversationRecord>, StoreError>;

    async fn read_by_slug(&self, slug: &str) -> Result<Option<ConversationRecord>, StoreError>;

    /// Delete every record of a session. Returns how many were removed.
    async fn delete_session(&self, session_id: &str) -> Result<usize, StoreError>;
}
