use anyhow::{anyhow, Result};
use folio_llm::{ChatClient, EmbeddingClient};
use folio_persist::PersistenceClient;
use folio_retrieval::{DocumentIngestor, HybridRetriever, InMemoryVectorIndex, VectorIndex};
use folio_types::{GraphConfig, LLMConfig, RagConfig};
use std::sync::Arc;

use crate::generator::AnswerGenerator;
use crate::grader::RelevanceGrader;
use crate::graph::Workflow;
use crate::memory::ConversationMemory;
use crate::node::Node;
use crate::nodes::{
    AssembleContextNode, CheckIngestedNode, DocumentIngestionNode, GenerateNode, GradeNode,
    QueryRewriteNode, RetrieveNode, SetDocIdNode, SummarizeNode, TransformQueryNode,
};
use crate::router::RagRouter;
use crate::transformer::QueryTransformer;

/// Builder wiring the shared clients into every node
pub struct WorkflowBuilder {
    chat_client: Option<Arc<dyn ChatClient>>,
    embedding_client: Option<Arc<dyn EmbeddingClient>>,
    persistence: Option<Arc<dyn PersistenceClient>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    llm_config: LLMConfig,
    rag_config: RagConfig,
    graph_config: GraphConfig,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            chat_client: None,
            embedding_client: None,
            persistence: None,
            vector_index: None,
            llm_config: LLMConfig::default(),
            rag_config: RagConfig::default(),
            graph_config: GraphConfig::default(),
        }
    }

    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    pub fn embedding_client(mut self, client: Arc<dyn EmbeddingClient>) -> Self {
        self.embedding_client = Some(client);
        self
    }

    pub fn persistence(mut self, client: Arc<dyn PersistenceClient>) -> Self {
        self.persistence = Some(client);
        self
    }

    /// Defaults to an in-memory index
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    pub fn llm_config(mut self, config: LLMConfig) -> Self {
        self.llm_config = config;
        self
    }

    pub fn rag_config(mut self, config: RagConfig) -> Self {
        self.rag_config = config;
        self
    }

    pub fn graph_config(mut self, config: GraphConfig) -> Self {
        self.graph_config = config;
        self
    }

    pub fn build(self) -> Result<Workflow> {
        let chat = self
            .chat_client
            .ok_or_else(|| anyhow!("Chat client is required"))?;
        let embedder = self
            .embedding_client
            .ok_or_else(|| anyhow!("Embedding client is required"))?;
        let store = self
            .persistence
            .ok_or_else(|| anyhow!("Persistence client is required"))?;
        let vectors = self
            .vector_index
            .unwrap_or_else(|| Arc::new(InMemoryVectorIndex::new()));

        let rag = &self.rag_config;
        let llm = self.llm_config;

        let ingestor = Arc::new(DocumentIngestor::new(
            embedder.clone(),
            vectors.clone(),
            store.clone(),
            rag,
        ));
        let retriever = Arc::new(HybridRetriever::new(embedder, vectors, store, rag));
        let memory = Arc::new(ConversationMemory::new(
            chat.clone(),
            llm.clone(),
            rag.keep_recent_messages,
        ));
        let grader = Arc::new(RelevanceGrader::new(
            chat.clone(),
            llm.clone(),
            rag.grade_excerpt_chars,
        ));
        let transformer = Arc::new(QueryTransformer::new(chat.clone(), llm.clone()));
        let generator = Arc::new(AnswerGenerator::new(chat, llm));

        let nodes: Vec<Arc<dyn Node>> = vec![
            Arc::new(SetDocIdNode),
            Arc::new(CheckIngestedNode::new(ingestor.gate().clone())),
            Arc::new(DocumentIngestionNode::new(ingestor)),
            Arc::new(QueryRewriteNode::new(memory.clone())),
            Arc::new(RetrieveNode::new(retriever)),
            Arc::new(GradeNode::new(grader)),
            Arc::new(TransformQueryNode::new(transformer)),
            Arc::new(AssembleContextNode),
            Arc::new(GenerateNode::new(generator)),
            Arc::new(SummarizeNode::new(memory)),
        ];

        Ok(Workflow::new(
            nodes,
            Arc::new(RagRouter::new(self.rag_config.clone())),
            self.graph_config,
        ))
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
