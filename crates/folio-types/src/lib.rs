pub mod chunk;
pub mod config;
pub mod events;
pub mod state;

pub use chunk::Chunk;
pub use config::{GraphConfig, LLMConfig, RagConfig};
pub use events::{StateDelta, StreamEvent};
pub use state::{UsageSnapshot, WorkflowInput, WorkflowState};
