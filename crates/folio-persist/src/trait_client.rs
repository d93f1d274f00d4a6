use async_trait::async_trait;
use folio_types::Chunk;

use crate::error::Result;
use crate::models::{ThreadMessage, ThreadRecord, UsageRecord};

/// Narrow query interface over the `documents`, `threads` and `usage` tables
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Insert chunk rows. Fails with `Duplicate` if any `(doc_id, user_id, chunk_index)`
    /// already exists.
    async fn insert_chunks(&self, chunks: Vec<Chunk>) -> Result<()>;

    /// Whether any chunk of `doc_id` is stored for this owner
    async fn document_exists(&self, doc_id: &str, user_id: &str) -> Result<bool>;

    /// Subset of `doc_ids` not yet ingested for this owner, in input order
    async fn missing_documents(&self, doc_ids: &[String], user_id: &str) -> Result<Vec<String>> {
        let mut missing = Vec::new();
        for doc_id in doc_ids {
            if !self.document_exists(doc_id, user_id).await? {
                missing.push(doc_id.clone());
            }
        }
        Ok(missing)
    }

    /// Chunks of the given documents owned by `user_id`, ordered by document then index
    async fn list_chunks(&self, doc_ids: &[String], user_id: &str) -> Result<Vec<Chunk>>;

    /// Source file name recorded for a document
    async fn document_file_name(&self, doc_id: &str, user_id: &str) -> Result<Option<String>>;

    /// Insert or replace by `thread_id`
    async fn upsert_thread(&self, thread: ThreadRecord) -> Result<()>;

    async fn get_thread(&self, thread_id: &str, user_id: &str) -> Result<Option<ThreadRecord>>;

    /// Threads of a user, most recently updated first
    async fn list_threads(&self, user_id: &str) -> Result<Vec<ThreadRecord>>;

    /// Replace the message list and summary of an existing thread
    async fn update_thread_messages(
        &self,
        thread_id: &str,
        messages: Vec<ThreadMessage>,
        summary: Option<String>,
    ) -> Result<()>;

    async fn insert_usage(&self, record: UsageRecord) -> Result<()>;

    /// Sum of `total_tokens` over every usage row of the user
    async fn total_tokens(&self, user_id: &str) -> Result<u64>;
}
