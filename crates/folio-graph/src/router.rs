//! Conditional edges, as pure functions of the state.

use crate::node::NodeType;
use folio_types::{RagConfig, WorkflowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextNode {
    Node(NodeType),
    End,
}

/// Decides which node runs after `current`
pub trait Router: Send + Sync {
    fn next(&self, state: &WorkflowState, current: NodeType) -> NextNode;
}

/// Outcome of the generate-or-retry decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeDecision {
    AssembleContext,
    TransformQuery,
}

/// Confidence at or above the threshold generates; below it, retry while
/// budget remains, otherwise generate with what was found.
pub fn decide_to_generate(confidence: f32, retries: u32, config: &RagConfig) -> GradeDecision {
    if confidence >= config.confidence_threshold {
        GradeDecision::AssembleContext
    } else if retries < config.retry_budget {
        GradeDecision::TransformQuery
    } else {
        GradeDecision::AssembleContext
    }
}

/// Compact once human turns exceed the configured count
pub fn should_summarize(state: &WorkflowState, config: &RagConfig) -> bool {
    state.human_turns() > config.summarize_after_turns
}

/// The corrective RAG graph:
///
/// ```text
/// set_doc_id -> check_ingested -> [document_ingestion] -> query_rewrite -> retrieve -> grade
/// grade -> assemble_context | transform_query -> retrieve
/// assemble_context -> generate -> [summarize] -> END
/// ```
#[derive(Debug, Clone, Default)]
pub struct RagRouter {
    config: RagConfig,
}

impl RagRouter {
    pub fn new(config: RagConfig) -> Self {
        Self { config }
    }
}

impl Router for RagRouter {
    fn next(&self, state: &WorkflowState, current: NodeType) -> NextNode {
        let next = match current {
            NodeType::SetDocId => NodeType::CheckIngested,
            NodeType::CheckIngested => {
                if state.vectorstore_uploaded {
                    NodeType::QueryRewrite
                } else {
                    NodeType::DocumentIngestion
                }
            }
            NodeType::DocumentIngestion => NodeType::QueryRewrite,
            NodeType::QueryRewrite => NodeType::Retrieve,
            NodeType::Retrieve => NodeType::Grade,
            NodeType::Grade => {
                match decide_to_generate(state.retrieval_confidence, state.crag_retries, &self.config) {
                    GradeDecision::AssembleContext => NodeType::AssembleContext,
                    GradeDecision::TransformQuery => NodeType::TransformQuery,
                }
            }
            NodeType::TransformQuery => NodeType::Retrieve,
            NodeType::AssembleContext => NodeType::Generate,
            NodeType::Generate => {
                if should_summarize(state, &self.config) {
                    NodeType::Summarize
                } else {
                    return NextNode::End;
                }
            }
            NodeType::Summarize => return NextNode::End,
        };
        NextNode::Node(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_llm::Message;
    use folio_types::WorkflowInput;

    fn state() -> WorkflowState {
        WorkflowState::from_input(WorkflowInput::new("t1", "u1", "What is the penalty for X?", "code"))
    }

    #[test]
    fn test_confidence_boundary_is_inclusive() {
        let config = RagConfig::default();
        assert_eq!(decide_to_generate(0.25, 0, &config), GradeDecision::AssembleContext);
        assert_eq!(decide_to_generate(0.0, 0, &config), GradeDecision::TransformQuery);
        assert_eq!(decide_to_generate(0.0, 1, &config), GradeDecision::AssembleContext);
        assert_eq!(decide_to_generate(0.24, 1, &config), GradeDecision::AssembleContext);
    }

    #[test]
    fn test_ingestion_branch() {
        let router = RagRouter::default();
        let mut state = state();

        assert_eq!(
            router.next(&state, NodeType::CheckIngested),
            NextNode::Node(NodeType::DocumentIngestion)
        );

        state.vectorstore_uploaded = true;
        assert_eq!(
            router.next(&state, NodeType::CheckIngested),
            NextNode::Node(NodeType::QueryRewrite)
        );
    }

    #[test]
    fn test_grade_routes_through_retry_once() {
        let router = RagRouter::default();
        let mut state = state();
        state.retrieval_confidence = 0.0;

        assert_eq!(
            router.next(&state, NodeType::Grade),
            NextNode::Node(NodeType::TransformQuery)
        );

        state.crag_retries = 1;
        assert_eq!(
            router.next(&state, NodeType::Grade),
            NextNode::Node(NodeType::AssembleContext)
        );
    }

    #[test]
    fn test_summarize_after_threshold() {
        let router = RagRouter::default();
        let mut state = state();
        assert_eq!(router.next(&state, NodeType::Generate), NextNode::End);

        for i in 0..3 {
            state.add_message(Message::ai(format!("answer {}", i)));
            state.add_message(Message::human(format!("question {}", i)));
        }
        assert_eq!(state.human_turns(), 4);
        assert_eq!(
            router.next(&state, NodeType::Generate),
            NextNode::Node(NodeType::Summarize)
        );
        assert_eq!(router.next(&state, NodeType::Summarize), NextNode::End);
    }
}
