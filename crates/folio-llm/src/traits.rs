use crate::streaming::StreamEvent;
use crate::types::Message;
use anyhow::Result;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio::sync::oneshot;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Trait for chat-based LLM interactions
///
/// `chat` is the plain "complete" capability. `chat_stream` yields tokens in
/// generation order and hands back the exact usage of the call separately,
/// so callers never have to scrape it out of the token stream.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Streaming chat completion
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream>;
}

/// Trait for embedding generation
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, one vector per input in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub raw: serde_json::Value,
}

impl ChatResponse {
    /// Response text, empty when the provider returned none
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Result of a streaming call: ordered token events plus the call's usage.
pub struct ChatStream {
    pub events: EventStream,
    pub usage: UsageReceiver,
}

impl ChatStream {
    /// Split a raw provider stream into tokens and usage.
    ///
    /// `Usage` events are removed from the token stream and delivered to the
    /// receiver instead. The receiver resolves once the events are drained.
    pub fn split_usage(raw: EventStream) -> Self {
        let (tx, rx) = oneshot::channel();

        let events = Box::pin(async_stream::stream! {
            let mut raw = raw;
            let mut usage_tx = Some(tx);

            while let Some(item) = raw.next().await {
                match item {
                    Ok(StreamEvent::Usage { usage }) => {
                        if let Some(tx) = usage_tx.take() {
                            let _ = tx.send(usage);
                        }
                    }
                    other => yield other,
                }
            }
        });

        Self {
            events,
            usage: UsageReceiver { rx },
        }
    }
}

/// Future-like handle to the token usage of a single streaming call
pub struct UsageReceiver {
    rx: oneshot::Receiver<TokenUsage>,
}

impl UsageReceiver {
    /// Receiver that is already resolved
    pub fn ready(usage: TokenUsage) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(usage);
        Self { rx }
    }

    /// Receiver for a call whose provider reported no usage
    pub fn unavailable() -> Self {
        let (_tx, rx) = oneshot::channel();
        Self { rx }
    }

    /// Wait for the usage. `None` when the provider never reported it or the
    /// stream was dropped before the usage chunk arrived.
    pub async fn resolve(self) -> Option<TokenUsage> {
        self.rx.await.ok()
    }
}
