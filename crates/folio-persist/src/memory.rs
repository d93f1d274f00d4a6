//! In-process [`PersistenceClient`] for single-node deployments and tests.
//!
//! Tables are plain collections behind `tokio::sync::RwLock`; unique keys
//! are enforced the same way a database index would.

use async_trait::async_trait;
use chrono::Utc;
use folio_types::Chunk;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{ThreadMessage, ThreadRecord, UsageRecord};
use crate::trait_client::PersistenceClient;

type ChunkKey = (String, String, u32);

pub struct InMemoryPersistenceClient {
    documents: RwLock<BTreeMap<ChunkKey, Chunk>>,
    threads: RwLock<HashMap<String, ThreadRecord>>,
    usage: RwLock<Vec<UsageRecord>>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            threads: RwLock::new(HashMap::new()),
            usage: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored usage rows
    pub async fn usage_count(&self) -> usize {
        self.usage.read().await.len()
    }

    /// Number of stored chunk rows
    pub async fn chunk_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

impl Default for InMemoryPersistenceClient {
    fn default() -> Self {
        Self::new()
    }
}

fn chunk_key(chunk: &Chunk) -> ChunkKey {
    (chunk.doc_id.clone(), chunk.user_id.clone(), chunk.chunk_index)
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn insert_chunks(&self, chunks: Vec<Chunk>) -> Result<()> {
        let mut documents = self.documents.write().await;

        if let Some(existing) = chunks.iter().find(|c| documents.contains_key(&chunk_key(c))) {
            return Err(PersistError::Duplicate(format!(
                "documents({}, {}, {})",
                existing.doc_id, existing.user_id, existing.chunk_index
            )));
        }

        for chunk in chunks {
            documents.insert(chunk_key(&chunk), chunk);
        }
        Ok(())
    }

    async fn document_exists(&self, doc_id: &str, user_id: &str) -> Result<bool> {
        let documents = self.documents.read().await;
        Ok(documents
            .keys()
            .any(|(d, u, _)| d == doc_id && u == user_id))
    }

    async fn list_chunks(&self, doc_ids: &[String], user_id: &str) -> Result<Vec<Chunk>> {
        let documents = self.documents.read().await;
        let mut chunks = Vec::new();

        for doc_id in doc_ids {
            chunks.extend(
                documents
                    .values()
                    .filter(|c| &c.doc_id == doc_id && c.user_id == user_id)
                    .cloned(),
            );
        }
        Ok(chunks)
    }

    async fn document_file_name(&self, doc_id: &str, user_id: &str) -> Result<Option<String>> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .find(|c| c.doc_id == doc_id && c.user_id == user_id)
            .map(|c| c.file_name.clone()))
    }

    async fn upsert_thread(&self, thread: ThreadRecord) -> Result<()> {
        let mut threads = self.threads.write().await;
        let mut thread = thread;

        if let Some(existing) = threads.get(&thread.thread_id) {
            thread.created_at = existing.created_at;
        }
        thread.updated_at = Utc::now();
        threads.insert(thread.thread_id.clone(), thread);
        Ok(())
    }

    async fn get_thread(&self, thread_id: &str, user_id: &str) -> Result<Option<ThreadRecord>> {
        let threads = self.threads.read().await;
        Ok(threads
            .get(thread_id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn list_threads(&self, user_id: &str) -> Result<Vec<ThreadRecord>> {
        let threads = self.threads.read().await;
        let mut owned: Vec<ThreadRecord> = threads
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn update_thread_messages(
        &self,
        thread_id: &str,
        messages: Vec<ThreadMessage>,
        summary: Option<String>,
    ) -> Result<()> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;

        thread.messages = messages;
        thread.summary = summary;
        thread.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_usage(&self, record: UsageRecord) -> Result<()> {
        self.usage.write().await.push(record);
        Ok(())
    }

    async fn total_tokens(&self, user_id: &str) -> Result<u64> {
        let usage = self.usage.read().await;
        Ok(usage
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| u64::from(r.total_tokens))
            .sum())
    }
}
