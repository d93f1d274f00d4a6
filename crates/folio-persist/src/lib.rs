pub mod models;
pub mod error;
pub mod trait_client;
pub mod memory;
pub mod usage;
pub mod dbs;

pub use models::{MessageRole, ThreadMessage, ThreadRecord, UsageRecord};
pub use error::{PersistError, Result};
pub use trait_client::PersistenceClient;
pub use memory::InMemoryPersistenceClient;
pub use usage::{log_usage_with_retry, USAGE_LOG_ATTEMPTS};

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
