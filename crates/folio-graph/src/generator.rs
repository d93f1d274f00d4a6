//! Grounded answer generation with token streaming.

use anyhow::Result;
use folio_llm::{ChatClient, ChatOptions, ChatRequest, Message, StreamEvent as LlmEvent, TokenUsage};
use folio_types::{LLMConfig, StreamEvent, WorkflowState};
use futures::StreamExt;
use std::sync::Arc;
use tracing::warn;

use crate::memory::memory_text;
use crate::node::EventSender;
use crate::prompts::{render, ANSWER_TEMPLATE, MEMORY_HEADER};

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub answer: String,
    /// `None` when the provider reported no usage for the call
    pub usage: Option<TokenUsage>,
}

pub struct AnswerGenerator {
    client: Arc<dyn ChatClient>,
    llm: LLMConfig,
}

impl AnswerGenerator {
    pub fn new(client: Arc<dyn ChatClient>, llm: LLMConfig) -> Self {
        Self { client, llm }
    }

    /// Memory block as a system message, then the filled answer template
    pub fn build_prompt(state: &WorkflowState) -> Vec<Message> {
        let memory = format!("{}\n{}", MEMORY_HEADER, memory_text(state));
        let question = state.last_question().unwrap_or_default();
        let body = render(
            ANSWER_TEMPLATE,
            &[("context", &state.context), ("question", question)],
        );
        vec![Message::system(memory), Message::human(body)]
    }

    /// Stream tokens to `events` in generation order and return the full
    /// answer with the exact usage of this call.
    pub async fn generate(&self, state: &WorkflowState, events: &EventSender) -> Result<Generation> {
        let mut options = ChatOptions::new();
        if let Some(temp) = self.llm.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = self.llm.max_tokens {
            options = options.max_tokens(max_tokens);
        }
        let request =
            ChatRequest::new(self.llm.model.clone(), Self::build_prompt(state)).with_options(options);

        let chat_stream = self.client.chat_stream(request).await?;
        let mut tokens = chat_stream.events;
        let mut answer = String::new();
        let mut receiver_gone = false;

        // Drain fully: the usage chunk arrives after the finish marker
        while let Some(event) = tokens.next().await {
            if let LlmEvent::Message { content } = event? {
                if content.is_empty() {
                    continue;
                }
                answer.push_str(&content);
                // A gone receiver must not stop generation
                if !receiver_gone && events.send(StreamEvent::Token { content }).await.is_err() {
                    warn!("Event receiver dropped during generation");
                    receiver_gone = true;
                }
            }
        }
        drop(tokens);

        let usage = chat_stream.usage.resolve().await;
        Ok(Generation { answer, usage })
    }
}
