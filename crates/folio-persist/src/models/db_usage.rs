use chrono::{DateTime, Utc};
use folio_types::UsageSnapshot;
use serde::{Deserialize, Serialize};

/// One row of the `usage` table, written once per answered question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: String,
    pub thread_id: String,
    pub doc_ids: Vec<String>,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub query: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl UsageRecord {
    pub fn from_snapshot(
        user_id: impl Into<String>,
        thread_id: impl Into<String>,
        doc_ids: Vec<String>,
        snapshot: &UsageSnapshot,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            thread_id: thread_id.into(),
            doc_ids,
            prompt_tokens: snapshot.prompt_tokens,
            completion_tokens: snapshot.completion_tokens,
            total_tokens: snapshot.total_tokens,
            query: snapshot.query.clone(),
            answer: snapshot.answer.clone(),
            created_at: Utc::now(),
        }
    }
}
