use anyhow::Result;
use async_trait::async_trait;
use folio_retrieval::HybridRetriever;
use folio_types::{StateDelta, WorkflowState};
use std::sync::Arc;
use tracing::info;

use crate::grader::RelevanceGrader;
use crate::memory::ConversationMemory;
use crate::node::{EventSender, Node, NodeType};
use crate::transformer::QueryTransformer;

pub struct QueryRewriteNode {
    memory: Arc<ConversationMemory>,
}

impl QueryRewriteNode {
    pub fn new(memory: Arc<ConversationMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Node for QueryRewriteNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        let rewritten = self.memory.contextualize(state).await?;
        info!(thread_id = %state.thread_id, query = %rewritten, "Standalone query");
        state.rewritten_query = Some(rewritten);
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::QueryRewrite
    }
}

pub struct RetrieveNode {
    retriever: Arc<HybridRetriever>,
}

impl RetrieveNode {
    pub fn new(retriever: Arc<HybridRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Node for RetrieveNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        let chunks = self
            .retriever
            .retrieve(
                state.search_query(),
                &state.doc_ids,
                &state.user_id,
                &state.collection_name,
            )
            .await?;

        info!(retrieved = chunks.len(), retries = state.crag_retries, "Retrieved chunks");
        state.retrieved_docs = chunks;
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Retrieve
    }
}

/// Narrows the retrieved set to relevant chunks and records the confidence
pub struct GradeNode {
    grader: Arc<RelevanceGrader>,
}

impl GradeNode {
    pub fn new(grader: Arc<RelevanceGrader>) -> Self {
        Self { grader }
    }
}

#[async_trait]
impl Node for GradeNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        let chunks = std::mem::take(&mut state.retrieved_docs);
        let grading = self.grader.grade(state.search_query(), chunks).await?;

        info!(
            relevant = grading.relevant.len(),
            confidence = grading.confidence,
            retries = state.crag_retries,
            "Graded retrieval"
        );
        state.retrieved_docs = grading.relevant;
        state.retrieval_confidence = grading.confidence;
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Grade
    }
}

/// Rewrites the query for another retrieval pass; the retry counter it bumps
/// bounds the loop
pub struct TransformQueryNode {
    transformer: Arc<QueryTransformer>,
}

impl TransformQueryNode {
    pub fn new(transformer: Arc<QueryTransformer>) -> Self {
        Self { transformer }
    }
}

#[async_trait]
impl Node for TransformQueryNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        let rewritten = self.transformer.transform(state.search_query()).await?;
        state.crag_retries += 1;

        info!(retries = state.crag_retries, query = %rewritten, "Query transformed");
        state.rewritten_query = Some(rewritten);
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::TransformQuery
    }
}
