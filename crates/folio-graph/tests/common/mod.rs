#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use folio_graph::{Workflow, WorkflowBuilder};
use folio_llm::{
    ChatClient, ChatRequest, ChatResponse, ChatStream, EmbeddingClient, Message, StreamEvent,
    TokenUsage,
};
use folio_persist::InMemoryPersistenceClient;
use folio_retrieval::InMemoryVectorIndex;
use folio_types::RagConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const ANSWER_TOKENS: [&str; 3] = ["The", " law", " states"];

#[derive(Debug, Clone)]
pub enum GradeMode {
    AllRelevant,
    NoneRelevant,
    /// Relevant when the passage contains the marker
    Marker(String),
}

/// Chat client answering by prompt kind, counting calls per kind
pub struct ScriptedChat {
    pub grade_mode: GradeMode,
    pub grades: AtomicUsize,
    pub rewrites: AtomicUsize,
    pub transforms: AtomicUsize,
    pub summaries: AtomicUsize,
    pub streams: AtomicUsize,
}

impl ScriptedChat {
    pub fn new(grade_mode: GradeMode) -> Self {
        Self {
            grade_mode,
            grades: AtomicUsize::new(0),
            rewrites: AtomicUsize::new(0),
            transforms: AtomicUsize::new(0),
            summaries: AtomicUsize::new(0),
            streams: AtomicUsize::new(0),
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn reply(text: impl Into<String>) -> ChatResponse {
        ChatResponse {
            content: Some(text.into()),
            usage: Some(TokenUsage::new(10, 2)),
            finish_reason: Some("stop".to_string()),
            raw: serde_json::Value::Null,
        }
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let last = request
            .messages
            .last()
            .map(|m| m.content().to_string())
            .unwrap_or_default();

        if last.contains("Relevant:") {
            self.grades.fetch_add(1, Ordering::SeqCst);
            let relevant = match &self.grade_mode {
                GradeMode::AllRelevant => true,
                GradeMode::NoneRelevant => false,
                GradeMode::Marker(marker) => last.contains(marker.as_str()),
            };
            return Ok(Self::reply(if relevant { "yes" } else { "no" }));
        }
        if last.contains("Standalone question:") {
            self.rewrites.fetch_add(1, Ordering::SeqCst);
            return Ok(Self::reply("What is the appeal deadline for homicide?"));
        }
        if last.contains("Rewritten question:") {
            self.transforms.fetch_add(1, Ordering::SeqCst);
            return Ok(Self::reply("penalty for homicide under the penal code"));
        }

        // Summarization: fold the first human turn into the summary
        self.summaries.fetch_add(1, Ordering::SeqCst);
        let first = request
            .messages
            .iter()
            .find(|m| m.is_human())
            .map(|m| m.content().to_string())
            .unwrap_or_default();
        Ok(Self::reply(format!("Summary: the user asked \"{}\".", first)))
    }

    async fn chat_stream(&self, _request: ChatRequest) -> Result<ChatStream> {
        self.streams.fetch_add(1, Ordering::SeqCst);
        let mut events: Vec<Result<StreamEvent>> = ANSWER_TOKENS
            .iter()
            .map(|t| Ok(StreamEvent::Message { content: t.to_string() }))
            .collect();
        events.push(Ok(StreamEvent::Done {
            finish_reason: Some("stop".to_string()),
        }));
        events.push(Ok(StreamEvent::Usage {
            usage: TokenUsage::new(20, 3),
        }));
        Ok(ChatStream::split_usage(Box::pin(futures::stream::iter(events))))
    }
}

/// Bag-of-words embedder
pub struct HashingEmbedder;

impl HashingEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; 32];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let bucket = token
                .to_lowercase()
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % 32] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

pub struct Harness {
    pub chat: Arc<ScriptedChat>,
    pub store: Arc<InMemoryPersistenceClient>,
    pub vectors: Arc<InMemoryVectorIndex>,
    pub workflow: Workflow,
}

pub fn harness(grade_mode: GradeMode) -> Harness {
    harness_on(Arc::new(InMemoryPersistenceClient::new()), grade_mode)
}

/// A workflow with a fresh vector index over an existing row store
pub fn harness_on(store: Arc<InMemoryPersistenceClient>, grade_mode: GradeMode) -> Harness {
    let chat = Arc::new(ScriptedChat::new(grade_mode));
    let vectors = Arc::new(InMemoryVectorIndex::new());

    let workflow = WorkflowBuilder::new()
        .chat_client(chat.clone())
        .embedding_client(Arc::new(HashingEmbedder))
        .persistence(store.clone())
        .vector_index(vectors.clone())
        .rag_config(RagConfig::default().with_chunking(300, 60))
        .build()
        .unwrap();

    Harness {
        chat,
        store,
        vectors,
        workflow,
    }
}

pub fn penal_code() -> String {
    [
        "Article 121. Homicide: killing someone carries a penalty of six to twenty years of imprisonment.",
        "Article 155. Theft: taking movable property of another carries a penalty of one to four years and a fine.",
        "Article 157. Robbery: theft committed with violence carries a penalty of four to ten years.",
        "Article 171. Fraud: obtaining unlawful advantage by deceit carries a penalty of one to five years.",
        "Article 593. Appeals must be filed within five days of the judgment.",
    ]
    .join("\n")
}

pub fn write_document(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn history(turns: usize) -> Vec<Message> {
    (0..turns)
        .flat_map(|i| {
            [
                Message::human(format!("question {}", i)),
                Message::ai(format!("answer {}", i)),
            ]
        })
        .collect()
}
