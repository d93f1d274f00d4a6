//! Vector index capability and a brute-force in-memory implementation.

use anyhow::Result;
use async_trait::async_trait;
use folio_types::Chunk;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct VectorEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Restricts a search to documents of one owner
#[derive(Debug, Clone, Default)]
pub struct ChunkFilter {
    pub doc_ids: Vec<String>,
    pub user_id: String,
}

impl ChunkFilter {
    pub fn new(doc_ids: Vec<String>, user_id: impl Into<String>) -> Self {
        Self {
            doc_ids,
            user_id: user_id.into(),
        }
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        chunk.user_id == self.user_id && self.doc_ids.iter().any(|d| d == &chunk.doc_id)
    }
}

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace entries, keyed by `(doc_id, user_id, chunk_index)`
    async fn upsert(&self, collection: &str, entries: Vec<VectorEntry>) -> Result<()>;

    /// Top `k` chunks by similarity, best first
    async fn similarity_search(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
        filter: &ChunkFilter,
    ) -> Result<Vec<ScoredChunk>>;

    /// Remove every entry of a document for one owner, returning how many went
    async fn delete_document(&self, collection: &str, doc_id: &str, user_id: &str)
        -> Result<usize>;

    /// Whether any vector of the document is indexed for this owner, in any collection
    async fn contains_document(&self, doc_id: &str, user_id: &str) -> Result<bool>;
}

pub struct InMemoryVectorIndex {
    collections: RwLock<HashMap<String, Vec<VectorEntry>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Entry count of one collection
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn same_row(a: &Chunk, b: &Chunk) -> bool {
    a.doc_id == b.doc_id && a.user_id == b.user_id && a.chunk_index == b.chunk_index
}

pub(crate) fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, collection: &str, entries: Vec<VectorEntry>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection.to_string()).or_default();

        for entry in entries {
            match stored.iter_mut().find(|e| same_row(&e.chunk, &entry.chunk)) {
                Some(existing) => *existing = entry,
                None => stored.push(entry),
            }
        }
        Ok(())
    }

    async fn similarity_search(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
        filter: &ChunkFilter,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().await;
        let Some(stored) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<ScoredChunk> = stored
            .iter()
            .filter(|e| filter.matches(&e.chunk))
            .map(|e| ScoredChunk {
                chunk: e.chunk.clone(),
                score: cosine_sim(query, &e.vector),
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
        let mut collections = self.collections.write().await;
        let Some(stored) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = stored.len();
        stored.retain(|e| !(e.chunk.doc_id == doc_id && e.chunk.user_id == user_id));
        Ok(before - stored.len())
    }

    async fn contains_document(&self, doc_id: &str, user_id: &str) -> Result<bool> {
        let collections = self.collections.read().await;
        Ok(collections.values().flatten().any(|e| {
            e.chunk.doc_id == doc_id && e.chunk.user_id == user_id
        }))
    }
}
