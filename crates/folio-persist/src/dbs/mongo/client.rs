use async_trait::async_trait;
use folio_types::Chunk;
use mongodb::Client;

use crate::dbs::mongo::repositories::{
    MongoDocumentRepository, MongoThreadRepository, MongoUsageRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{ThreadMessage, ThreadRecord, UsageRecord};
use crate::trait_client::PersistenceClient;

pub struct MongoPersistenceClient {
    documents: MongoDocumentRepository,
    threads: MongoThreadRepository,
    usage: MongoUsageRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and make sure unique indexes exist
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let this = Self {
            documents: MongoDocumentRepository::new(&client, database),
            threads: MongoThreadRepository::new(&client, database),
            usage: MongoUsageRepository::new(&client, database),
        };

        this.documents.ensure_indexes().await?;
        this.threads.ensure_indexes().await?;

        tracing::info!(database = database, "Connected to MongoDB");
        Ok(this)
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn insert_chunks(&self, chunks: Vec<Chunk>) -> Result<()> {
        self.documents.insert_chunks(chunks).await
    }

    async fn document_exists(&self, doc_id: &str, user_id: &str) -> Result<bool> {
        self.documents.exists(doc_id, user_id).await
    }

    async fn list_chunks(&self, doc_ids: &[String], user_id: &str) -> Result<Vec<Chunk>> {
        self.documents.list(doc_ids, user_id).await
    }

    async fn document_file_name(&self, doc_id: &str, user_id: &str) -> Result<Option<String>> {
        self.documents.file_name(doc_id, user_id).await
    }

    async fn upsert_thread(&self, thread: ThreadRecord) -> Result<()> {
        self.threads.upsert(thread).await
    }

    async fn get_thread(&self, thread_id: &str, user_id: &str) -> Result<Option<ThreadRecord>> {
        self.threads.get(thread_id, user_id).await
    }

    async fn list_threads(&self, user_id: &str) -> Result<Vec<ThreadRecord>> {
        self.threads.list(user_id).await
    }

    async fn update_thread_messages(
        &self,
        thread_id: &str,
        messages: Vec<ThreadMessage>,
        summary: Option<String>,
    ) -> Result<()> {
        self.threads.update_messages(thread_id, messages, summary).await
    }

    async fn insert_usage(&self, record: UsageRecord) -> Result<()> {
        self.usage.insert(record).await
    }

    async fn total_tokens(&self, user_id: &str) -> Result<u64> {
        self.usage.total_tokens(user_id).await
    }
}
