//! Hybrid retrieval: lexical and dense searches run concurrently, then fuse.

use folio_llm::EmbeddingClient;
use folio_persist::PersistenceClient;
use folio_types::{Chunk, RagConfig};
use std::sync::Arc;
use tracing::debug;

use crate::error::RetrievalError;
use crate::fusion::RrfFusion;
use crate::lexical::Bm25Index;
use crate::vector::{ChunkFilter, VectorIndex};

pub struct HybridRetriever {
    embedder: Arc<dyn EmbeddingClient>,
    vectors: Arc<dyn VectorIndex>,
    store: Arc<dyn PersistenceClient>,
    fusion: RrfFusion,
    lexical_k: usize,
    dense_k: usize,
    top_n: usize,
}

impl HybridRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        vectors: Arc<dyn VectorIndex>,
        store: Arc<dyn PersistenceClient>,
        config: &RagConfig,
    ) -> Self {
        Self {
            embedder,
            vectors,
            store,
            fusion: RrfFusion::from(config),
            lexical_k: config.lexical_k,
            dense_k: config.dense_k,
            top_n: config.fused_top_n,
        }
    }

    /// Best passages for `query` among the given documents of `user_id`,
    /// at most `fused_top_n` of them. Empty `doc_ids` returns empty at once.
    pub async fn retrieve(
        &self,
        query: &str,
        doc_ids: &[String],
        user_id: &str,
        collection: &str,
    ) -> Result<Vec<Chunk>, RetrievalError> {
        if doc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (lexical, dense) = tokio::join!(
            self.lexical_search(query, doc_ids, user_id),
            self.dense_search(query, doc_ids, user_id, collection)
        );
        let (lexical, dense) = (lexical?, dense?);

        debug!(
            lexical_hits = lexical.len(),
            dense_hits = dense.len(),
            "Hybrid search candidates"
        );

        Ok(self
            .fusion
            .fuse(lexical, dense, self.top_n)
            .into_iter()
            .map(|f| f.chunk)
            .collect())
    }

    async fn lexical_search(
        &self,
        query: &str,
        doc_ids: &[String],
        user_id: &str,
    ) -> Result<Vec<Chunk>, RetrievalError> {
        let chunks = self.store.list_chunks(doc_ids, user_id).await?;
        Ok(Bm25Index::build(chunks).search(query, self.lexical_k))
    }

    async fn dense_search(
        &self,
        query: &str,
        doc_ids: &[String],
        user_id: &str,
        collection: &str,
    ) -> Result<Vec<Chunk>, RetrievalError> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(RetrievalError::Embedding)?;

        let filter = ChunkFilter::new(doc_ids.to_vec(), user_id);
        let results = self
            .vectors
            .similarity_search(collection, &vector, self.dense_k, &filter)
            .await
            .map_err(RetrievalError::Index)?;

        Ok(results.into_iter().map(|r| r.chunk).collect())
    }
}
