use anyhow::Result;
use async_trait::async_trait;
use folio_types::{StateDelta, StreamEvent, WorkflowState};
use std::fmt;
use tokio::sync::mpsc;

pub type EventSender = mpsc::Sender<StreamEvent>;

/// A unit of computation in the workflow
#[async_trait]
pub trait Node: Send + Sync {
    /// Run against the state, returning the persistable fields it wrote.
    /// May emit events (tokens) while running.
    async fn execute(&self, state: &mut WorkflowState, events: EventSender) -> Result<StateDelta>;

    fn node_type(&self) -> NodeType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    SetDocId,
    CheckIngested,
    DocumentIngestion,
    QueryRewrite,
    Retrieve,
    Grade,
    TransformQuery,
    AssembleContext,
    Generate,
    Summarize,
}

impl NodeType {
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::SetDocId => "set_doc_id",
            NodeType::CheckIngested => "check_ingested",
            NodeType::DocumentIngestion => "document_ingestion",
            NodeType::QueryRewrite => "query_rewrite",
            NodeType::Retrieve => "retrieve",
            NodeType::Grade => "grade",
            NodeType::TransformQuery => "transform_query",
            NodeType::AssembleContext => "assemble_context",
            NodeType::Generate => "generate",
            NodeType::Summarize => "summarize",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
