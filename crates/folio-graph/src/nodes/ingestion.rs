use anyhow::{anyhow, Result};
use async_trait::async_trait;
use folio_retrieval::{hash_file, DocumentIngestor, IngestError, IngestionGate};
use folio_types::{StateDelta, WorkflowState};
use std::sync::Arc;
use tracing::info;

use crate::node::{EventSender, Node, NodeType};

/// Derives the document identity from the uploaded file when none was supplied
pub struct SetDocIdNode;

#[async_trait]
impl Node for SetDocIdNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        if !state.doc_ids.is_empty() {
            return Ok(StateDelta::default());
        }

        let path = state.documents_path.clone().ok_or_else(|| {
            IngestError::InvalidInput("no document id and no document path".to_string())
        })?;
        let display = path.display().to_string();

        let doc_id = tokio::task::spawn_blocking(move || hash_file(&path))
            .await?
            .map_err(|source| IngestError::Io {
                path: display,
                source,
            })?;

        info!(doc_id = %doc_id, "Document id derived from content");
        state.doc_ids = vec![doc_id];
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::SetDocId
    }
}

/// Marks the documents as uploaded when every one is already ingested for
/// this owner
pub struct CheckIngestedNode {
    gate: IngestionGate,
}

impl CheckIngestedNode {
    pub fn new(gate: IngestionGate) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl Node for CheckIngestedNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        if !state.vectorstore_uploaded {
            let missing = self.gate.missing(&state.doc_ids, &state.user_id).await?;
            state.vectorstore_uploaded = missing.is_empty();
        }
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::CheckIngested
    }
}

/// Ingests the uploaded file for the document ids not yet stored
pub struct DocumentIngestionNode {
    ingestor: Arc<DocumentIngestor>,
}

impl DocumentIngestionNode {
    pub fn new(ingestor: Arc<DocumentIngestor>) -> Self {
        Self { ingestor }
    }
}

#[async_trait]
impl Node for DocumentIngestionNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        let missing = self
            .ingestor
            .gate()
            .missing(&state.doc_ids, &state.user_id)
            .await?;

        // The uploaded file is the source of exactly one document
        match (missing.as_slice(), state.documents_path.as_deref()) {
            ([], _) => {}
            ([doc_id], Some(path)) => {
                let report = self
                    .ingestor
                    .ingest(path, doc_id, &state.user_id, &state.collection_name)
                    .await?;
                info!(
                    doc_id = %report.doc_id,
                    chunks = report.chunks,
                    skipped = report.skipped,
                    "Ingestion finished"
                );
            }
            (ids, _) => {
                return Err(anyhow!(IngestError::InvalidInput(format!(
                    "no source file for documents: {}",
                    ids.join(", ")
                ))));
            }
        }

        state.vectorstore_uploaded = true;
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::DocumentIngestion
    }
}
