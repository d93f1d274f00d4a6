//! Document ingestion and the per-owner ingestion gate.

use folio_llm::EmbeddingClient;
use folio_persist::PersistenceClient;
use folio_types::{Chunk, RagConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::chunker::{chunk_pages, ChunkingConfig};
use crate::error::IngestError;
use crate::loader::load_pages;
use crate::vector::{VectorEntry, VectorIndex};

/// Lookups that decide whether ingestion can be skipped.
///
/// Scoped by owner: the same content uploaded by another user is not shared.
/// A document counts as ingested only when both its rows and its vectors are
/// present, so rows that outlived their index get re-embedded.
#[derive(Clone)]
pub struct IngestionGate {
    store: Arc<dyn PersistenceClient>,
    vectors: Arc<dyn VectorIndex>,
}

impl IngestionGate {
    pub fn new(store: Arc<dyn PersistenceClient>, vectors: Arc<dyn VectorIndex>) -> Self {
        Self { store, vectors }
    }

    pub async fn already_ingested(&self, doc_id: &str, user_id: &str) -> Result<bool, IngestError> {
        if !self.store.document_exists(doc_id, user_id).await? {
            return Ok(false);
        }
        let indexed = self
            .vectors
            .contains_document(doc_id, user_id)
            .await
            .map_err(IngestError::Index)?;
        if !indexed {
            warn!(doc_id = doc_id, user_id = user_id, "Chunk rows present without vectors");
        }
        Ok(indexed)
    }

    /// The subset of `doc_ids` not yet ingested for `user_id`, in input order
    pub async fn missing(&self, doc_ids: &[String], user_id: &str) -> Result<Vec<String>, IngestError> {
        let without_rows = self.store.missing_documents(doc_ids, user_id).await?;

        let mut missing = Vec::new();
        for doc_id in doc_ids {
            let indexed = !without_rows.contains(doc_id)
                && self
                    .vectors
                    .contains_document(doc_id, user_id)
                    .await
                    .map_err(IngestError::Index)?;
            if !indexed {
                missing.push(doc_id.clone());
            }
        }
        Ok(missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub doc_id: String,
    pub chunks: usize,
    /// Nothing was written because the pair was already ingested
    pub skipped: bool,
}

pub struct DocumentIngestor {
    embedder: Arc<dyn EmbeddingClient>,
    vectors: Arc<dyn VectorIndex>,
    store: Arc<dyn PersistenceClient>,
    gate: IngestionGate,
    chunking: ChunkingConfig,
    batch_size: usize,
}

impl DocumentIngestor {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        vectors: Arc<dyn VectorIndex>,
        store: Arc<dyn PersistenceClient>,
        config: &RagConfig,
    ) -> Self {
        Self {
            embedder,
            vectors: vectors.clone(),
            gate: IngestionGate::new(store.clone(), vectors.clone()),
            store,
            chunking: ChunkingConfig::from(config),
            batch_size: config.embed_batch_size.max(1),
        }
    }

    pub fn gate(&self) -> &IngestionGate {
        &self.gate
    }

    /// Chunk, embed and persist one document for one owner.
    ///
    /// A no-op reporting success when `(doc_id, user_id)` is already stored.
    pub async fn ingest(
        &self,
        path: &Path,
        doc_id: &str,
        user_id: &str,
        collection: &str,
    ) -> Result<IngestReport, IngestError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|_| {
            IngestError::InvalidInput(format!("no such file: {}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(IngestError::InvalidInput(format!(
                "not a regular file: {}",
                path.display()
            )));
        }

        if self.gate.already_ingested(doc_id, user_id).await? {
            info!(doc_id = doc_id, user_id = user_id, "Document already ingested");
            return Ok(IngestReport {
                doc_id: doc_id.to_string(),
                chunks: 0,
                skipped: true,
            });
        }

        let owned_path: PathBuf = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || load_pages(&owned_path))
            .await
            .map_err(|e| IngestError::InvalidInput(format!("loader task failed: {}", e)))??;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let chunks: Vec<Chunk> = chunk_pages(&pages, &self.chunking)
            .into_iter()
            .enumerate()
            .map(|(i, c)| Chunk {
                doc_id: doc_id.to_string(),
                user_id: user_id.to_string(),
                chunk_index: i as u32,
                file_name: file_name.clone(),
                page: c.page,
                content: c.content,
            })
            .collect();

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self
                .embedder
                .embed_batch(&texts)
                .await
                .map_err(IngestError::Embedding)?;

            let entries = batch
                .iter()
                .cloned()
                .zip(vectors)
                .map(|(chunk, vector)| VectorEntry { chunk, vector })
                .collect();

            self.vectors
                .upsert(collection, entries)
                .await
                .map_err(IngestError::Index)?;
        }

        match self.store.insert_chunks(chunks.clone()).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {
                warn!(doc_id = doc_id, user_id = user_id, error = %e, "Chunk rows already present");
            }
            Err(e) => {
                self.remove_vectors(collection, doc_id, user_id).await;
                return Err(IngestError::Store(e));
            }
        }

        info!(
            doc_id = doc_id,
            user_id = user_id,
            collection = collection,
            chunks = chunks.len(),
            "Document ingested"
        );

        Ok(IngestReport {
            doc_id: doc_id.to_string(),
            chunks: chunks.len(),
            skipped: false,
        })
    }

    /// Drop vectors written for a document whose rows could not be stored, so a
    /// retry starts clean
    async fn remove_vectors(&self, collection: &str, doc_id: &str, user_id: &str) {
        match self.vectors.delete_document(collection, doc_id, user_id).await {
            Ok(removed) => warn!(doc_id = doc_id, removed = removed, "Rolled back vectors"),
            Err(e) => warn!(doc_id = doc_id, error = %e, "Vector rollback failed"),
        }
    }
}
