use thiserror::Error;

/// Failures a caller must tell apart once a request runs.
///
/// Unknown threads and exhausted quotas are rejected by the HTTP layer before
/// a workflow starts.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generation, embedding, index or store failure inside a node
    #[error("Upstream call failed in {node}: {source}")]
    Upstream {
        node: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Max iterations ({0}) reached")]
    MaxIterations(usize),
}

impl WorkflowError {
    /// Classify a node failure, surfacing ingestion input errors as such
    pub(crate) fn from_node(node: &str, error: anyhow::Error) -> Self {
        match error.downcast_ref::<folio_retrieval::IngestError>() {
            Some(folio_retrieval::IngestError::InvalidInput(msg)) => Self::InvalidInput(msg.clone()),
            _ => Self::Upstream {
                node: node.to_string(),
                source: error,
            },
        }
    }
}
