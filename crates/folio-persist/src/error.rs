use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    /// Unique-key conflict, i.e. the row is already there
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
