use folio_types::Chunk;
use futures::TryStreamExt;
use mongodb::options::IndexOptions;
use mongodb::{bson::doc, Client, Collection, IndexModel};

use super::is_duplicate_key;
use crate::error::{PersistError, Result};

#[derive(Clone)]
pub struct MongoDocumentRepository {
    collection: Collection<Chunk>,
}

impl MongoDocumentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("documents");
        Self { collection }
    }

    /// Unique `(doc_id, user_id, chunk_index)`
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "doc_id": 1, "user_id": 1, "chunk_index": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    pub async fn insert_chunks(&self, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        match self.collection.insert_many(chunks).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(PersistError::Duplicate(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, doc_id: &str, user_id: &str) -> Result<bool> {
        let count = self
            .collection
            .count_documents(doc! { "doc_id": doc_id, "user_id": user_id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    pub async fn list(&self, doc_ids: &[String], user_id: &str) -> Result<Vec<Chunk>> {
        let chunks = self
            .collection
            .find(doc! { "doc_id": { "$in": doc_ids }, "user_id": user_id })
            .sort(doc! { "doc_id": 1, "chunk_index": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(chunks)
    }

    pub async fn file_name(&self, doc_id: &str, user_id: &str) -> Result<Option<String>> {
        let chunk = self
            .collection
            .find_one(doc! { "doc_id": doc_id, "user_id": user_id })
            .await?;
        Ok(chunk.map(|c| c.file_name))
    }
}
