mod db_thread;
mod db_usage;

// Database-agnostic models
pub use db_thread::{MessageRole, ThreadMessage, ThreadRecord};
pub use db_usage::UsageRecord;
