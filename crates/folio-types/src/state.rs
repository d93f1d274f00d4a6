use crate::chunk::Chunk;
use folio_llm::{Message, TokenUsage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Token accounting for one generation call, with the exchange it paid for.
/// A snapshot, never accumulated within a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub total_tokens: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub query: String,
    pub answer: String,
}

impl UsageSnapshot {
    pub fn new(usage: TokenUsage, query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            total_tokens: usage.total_tokens,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            query: query.into(),
            answer: answer.into(),
        }
    }
}

/// The mutable record threaded through the workflow for one request.
///
/// Created fresh per request and discarded after completion. Callers persist
/// derived fields, never the state itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub run_id: String,
    pub thread_id: String,
    pub user_id: String,
    pub doc_ids: Vec<String>,
    pub documents_path: Option<PathBuf>,
    pub collection_name: String,
    pub messages: Vec<Message>,
    pub summary: Option<String>,
    pub vectorstore_uploaded: bool,
    pub rewritten_query: Option<String>,
    pub retrieved_docs: Vec<Chunk>,
    pub retrieval_confidence: f32,
    pub crag_retries: u32,
    pub context: String,
    pub answer: Option<String>,
    pub token_usage: Option<UsageSnapshot>,
}

impl WorkflowState {
    /// Build the initial state. The question becomes the one new human
    /// message of this request.
    pub fn from_input(input: WorkflowInput) -> Self {
        let mut messages = input.history;
        messages.push(Message::human(input.question));

        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            thread_id: input.thread_id,
            user_id: input.user_id,
            doc_ids: input.doc_ids,
            documents_path: input.documents_path,
            collection_name: input.collection_name,
            messages,
            summary: input.summary,
            vectorstore_uploaded: input.vectorstore_uploaded,
            rewritten_query: None,
            retrieved_docs: Vec::new(),
            retrieval_confidence: 0.0,
            crag_retries: 0,
            context: String::new(),
            answer: None,
            token_usage: None,
        }
    }

    /// Latest human question
    pub fn last_question(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_human())
            .map(|m| m.content())
    }

    /// Query handed to retrieval: the rewritten one when present
    pub fn search_query(&self) -> &str {
        self.rewritten_query
            .as_deref()
            .or_else(|| self.last_question())
            .unwrap_or_default()
    }

    pub fn human_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.is_human()).count()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub thread_id: String,
    pub user_id: String,
    pub question: String,
    /// Prior turns loaded from the thread record
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub doc_ids: Vec<String>,
    #[serde(default)]
    pub documents_path: Option<PathBuf>,
    pub collection_name: String,
    #[serde(default)]
    pub vectorstore_uploaded: bool,
}

impl WorkflowInput {
    pub fn new(
        thread_id: impl Into<String>,
        user_id: impl Into<String>,
        question: impl Into<String>,
        collection_name: impl Into<String>,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            user_id: user_id.into(),
            question: question.into(),
            history: Vec::new(),
            summary: None,
            doc_ids: Vec::new(),
            documents_path: None,
            collection_name: collection_name.into(),
            vectorstore_uploaded: false,
        }
    }

    pub fn with_history(mut self, history: Vec<Message>, summary: Option<String>) -> Self {
        self.history = history;
        self.summary = summary;
        self
    }

    pub fn with_doc_ids(mut self, doc_ids: Vec<String>) -> Self {
        self.doc_ids = doc_ids;
        self
    }

    pub fn with_documents_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents_path = Some(path.into());
        self
    }

    pub fn with_vectorstore_uploaded(mut self, uploaded: bool) -> Self {
        self.vectorstore_uploaded = uploaded;
        self
    }
}
