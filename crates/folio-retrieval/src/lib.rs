pub mod error;
pub mod hasher;
pub mod loader;
pub mod chunker;
pub mod vector;
pub mod lexical;
pub mod fusion;
pub mod hybrid;
pub mod ingest;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use error::{IngestError, RetrievalError};
pub use hasher::{hash_bytes, hash_file};
pub use loader::{collection_name_from_path, load_pages, PageText};
pub use chunker::{chunk_pages, ChunkingConfig};
pub use vector::{ChunkFilter, InMemoryVectorIndex, ScoredChunk, VectorEntry, VectorIndex};
pub use lexical::Bm25Index;
pub use fusion::{FusedChunk, RrfFusion};
pub use hybrid::HybridRetriever;
pub use ingest::{DocumentIngestor, IngestReport, IngestionGate};

#[cfg(feature = "mongodb")]
pub use mongo::MongoVectorIndex;
