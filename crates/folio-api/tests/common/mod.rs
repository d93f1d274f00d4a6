#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use folio_api::{config::Config, routes::build_router, state::AppState};
use folio_graph::Workflow;
use folio_llm::{
    ChatClient, ChatRequest, ChatResponse, ChatStream, EmbeddingClient, StreamEvent, TokenUsage,
};
use folio_persist::InMemoryPersistenceClient;
use folio_types::RagConfig;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "folio-test-boundary";

/// Grades everything relevant, streams a fixed three-token answer and
/// summarizes by naming the first message it was given
pub struct CannedChat;

#[async_trait]
impl ChatClient for CannedChat {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let last = request
            .messages
            .last()
            .map(|m| m.content().to_string())
            .unwrap_or_default();

        let text = if last.contains("Relevant:") {
            "yes".to_string()
        } else if last.contains("Standalone question:") {
            "What is the appeal deadline?".to_string()
        } else {
            // Summaries name the first folded question
            let first = request
                .messages
                .first()
                .map(|m| m.content().to_string())
                .unwrap_or_default();
            format!("Summary of: {}", first)
        };

        Ok(ChatResponse {
            content: Some(text),
            usage: Some(TokenUsage::new(5, 1)),
            finish_reason: Some("stop".to_string()),
            raw: Value::Null,
        })
    }

    async fn chat_stream(&self, _request: ChatRequest) -> Result<ChatStream> {
        let events: Vec<Result<StreamEvent>> = vec![
            Ok(StreamEvent::Message { content: "Six".to_string() }),
            Ok(StreamEvent::Message { content: " to".to_string() }),
            Ok(StreamEvent::Message { content: " twenty years.".to_string() }),
            Ok(StreamEvent::Done { finish_reason: Some("stop".to_string()) }),
            Ok(StreamEvent::Usage { usage: TokenUsage::new(40, 4) }),
        ];
        Ok(ChatStream::split_usage(Box::pin(futures::stream::iter(events))))
    }
}

pub struct CountingEmbedder;

#[async_trait]
impl EmbeddingClient for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.len() as f32, 1.0, 0.5])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0, 0.5]).collect())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryPersistenceClient>,
    pub uploads: tempfile::TempDir,
}

pub fn test_config(uploads: &std::path::Path) -> Config {
    let toml = format!(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [cors]
        enabled = false
        origins = []

        [llm]
        model = "test-model"
        embedding_model = "test-embedding"
        temperature = 0.0

        [storage]
        backend = "memory"
        database = "folio_test"

        [quota]
        token_limit = 1000

        [logging]
        level = "warn"
        format = "pretty"

        [uploads]
        directory = {:?}
        "#,
        uploads.display().to_string()
    );
    toml::from_str(&toml).unwrap()
}

pub fn test_app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryPersistenceClient::new());

    let workflow = Workflow::builder()
        .chat_client(Arc::new(CannedChat))
        .embedding_client(Arc::new(CountingEmbedder))
        .persistence(store.clone())
        .rag_config(RagConfig::default().with_chunking(200, 40))
        .build()
        .unwrap();

    let config = test_config(uploads.path());
    let state = Arc::new(AppState::new(config, store.clone(), workflow));

    TestApp {
        router: build_router(state),
        store,
        uploads,
    }
}

pub fn penal_code() -> String {
    [
        "Article 121. Homicide: killing someone carries a penalty of six to twenty years of imprisonment.",
        "Article 155. Theft: taking movable property of another carries a penalty of one to four years.",
        "Article 593. Appeals must be filed within five days of the judgment.",
    ]
    .join("\n")
}

pub fn ask_request(user_id: &str, question: &str, file_name: &str, content: &str) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in [("user_id", user_id), ("question", question)] {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"pdf\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
    ));

    Request::post("/ask")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn follow_up_request(user_id: &str, thread_id: &str, question: &str) -> Request<Body> {
    let body = format!(
        "user_id={}&thread_id={}&question={}",
        user_id,
        thread_id,
        question.replace(' ', "+").replace('?', "%3F")
    );
    Request::post("/follow_up")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// JSON payloads of every `data:` line, in order
pub fn sse_events(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

pub fn tokens(events: &[Value]) -> String {
    events
        .iter()
        .filter_map(|e| e.get("token").and_then(Value::as_str))
        .collect()
}
