//! Vector index stored next to the chunk rows in MongoDB, so embeddings
//! survive a restart together with the rows the ingestion gate checks.

use anyhow::{Context, Result};
use async_trait::async_trait;
use folio_types::Chunk;
use futures::TryStreamExt;
use mongodb::options::IndexOptions;
use mongodb::{bson::doc, Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use crate::vector::{cosine_sim, ChunkFilter, ScoredChunk, VectorEntry, VectorIndex};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingRecord {
    collection: String,
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Clone)]
pub struct MongoVectorIndex {
    embeddings: Collection<EmbeddingRecord>,
}

impl MongoVectorIndex {
    /// Connect and make sure the row key index exists
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .context("Failed to connect vector index to MongoDB")?;
        let this = Self::new(&client, database);
        this.ensure_indexes().await?;

        tracing::info!(database = database, "Vector index ready");
        Ok(this)
    }

    pub fn new(client: &Client, db_name: &str) -> Self {
        let embeddings = client.database(db_name).collection("embeddings");
        Self { embeddings }
    }

    /// Unique `(collection, doc_id, user_id, chunk_index)`
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! {
                "collection": 1,
                "chunk.doc_id": 1,
                "chunk.user_id": 1,
                "chunk.chunk_index": 1,
            })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.embeddings.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MongoVectorIndex {
    async fn upsert(&self, collection: &str, entries: Vec<VectorEntry>) -> Result<()> {
        for entry in entries {
            let filter = doc! {
                "collection": collection,
                "chunk.doc_id": entry.chunk.doc_id.as_str(),
                "chunk.user_id": entry.chunk.user_id.as_str(),
                "chunk.chunk_index": entry.chunk.chunk_index as i64,
            };
            let record = EmbeddingRecord {
                collection: collection.to_string(),
                chunk: entry.chunk,
                vector: entry.vector,
            };
            self.embeddings
                .replace_one(filter, &record)
                .upsert(true)
                .await?;
        }
        Ok(())
    }

    /// Brute-force cosine over the owner's vectors of the requested documents
    async fn similarity_search(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
        filter: &ChunkFilter,
    ) -> Result<Vec<ScoredChunk>> {
        if filter.doc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<EmbeddingRecord> = self
            .embeddings
            .find(doc! {
                "collection": collection,
                "chunk.user_id": filter.user_id.as_str(),
                "chunk.doc_id": { "$in": filter.doc_ids.as_slice() },
            })
            .await?
            .try_collect()
            .await?;

        let mut scored: Vec<ScoredChunk> = records
            .into_iter()
            .map(|r| ScoredChunk {
                score: cosine_sim(query, &r.vector),
                chunk: r.chunk,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    async fn delete_document(
        &self,
        collection: &str,
        doc_id: &str,
        user_id: &str,
    ) -> Result<usize> {
        let result = self
            .embeddings
            .delete_many(doc! {
                "collection": collection,
                "chunk.doc_id": doc_id,
                "chunk.user_id": user_id,
            })
            .await?;
        Ok(result.deleted_count as usize)
    }

    async fn contains_document(&self, doc_id: &str, user_id: &str) -> Result<bool> {
        let count = self
            .embeddings
            .count_documents(doc! { "chunk.doc_id": doc_id, "chunk.user_id": user_id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }
}
