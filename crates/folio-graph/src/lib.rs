pub mod node;
pub mod router;
pub mod error;
pub mod prompts;
pub mod context;
pub mod grader;
pub mod transformer;
pub mod memory;
pub mod generator;
pub mod nodes;
pub mod graph;
pub mod builder;
pub mod multiplexer;

pub use node::{EventSender, Node, NodeType};
pub use router::{decide_to_generate, should_summarize, GradeDecision, NextNode, RagRouter, Router};
pub use error::WorkflowError;
pub use context::assemble_context;
pub use grader::{Grading, RelevanceGrader};
pub use transformer::QueryTransformer;
pub use memory::{Compaction, ConversationMemory};
pub use generator::{AnswerGenerator, Generation};
pub use graph::Workflow;
pub use builder::WorkflowBuilder;
pub use multiplexer::{CompletionCallback, FinalState, SseEvent, StreamMultiplexer};
pub use prompts::NO_INFORMATION_ANSWER;

// Re-export key types from folio-types
pub use folio_types::{
    GraphConfig, LLMConfig, RagConfig, StateDelta, StreamEvent, WorkflowInput, WorkflowState,
};
