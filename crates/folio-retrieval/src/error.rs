use folio_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("Vector index error: {0}")]
    Index(#[source] anyhow::Error),

    #[error("Row store error: {0}")]
    Store(#[from] PersistError),
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("Vector search failed: {0}")]
    Index(#[source] anyhow::Error),

    #[error("Row store error: {0}")]
    Store(#[from] PersistError),
}
