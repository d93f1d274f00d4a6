use anyhow::Result;
use async_trait::async_trait;
use folio_llm::Message;
use folio_types::{StateDelta, UsageSnapshot, WorkflowState};
use std::sync::Arc;
use tracing::{error, info};

use crate::context::assemble_context;
use crate::generator::AnswerGenerator;
use crate::memory::ConversationMemory;
use crate::node::{EventSender, Node, NodeType};
use crate::prompts::NO_INFORMATION_ANSWER;

pub struct AssembleContextNode;

#[async_trait]
impl Node for AssembleContextNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        state.context = assemble_context(&state.retrieved_docs);
        if state.context.is_empty() {
            state.answer = Some(NO_INFORMATION_ANSWER.to_string());
        }
        Ok(StateDelta::default())
    }

    fn node_type(&self) -> NodeType {
        NodeType::AssembleContext
    }
}

pub struct GenerateNode {
    generator: Arc<AnswerGenerator>,
}

impl GenerateNode {
    pub fn new(generator: Arc<AnswerGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node for GenerateNode {
    async fn execute(&self, state: &mut WorkflowState, events: EventSender) -> Result<StateDelta> {
        let generation = self.generator.generate(state, &events).await?;

        // Empty stream keeps the pre-set placeholder, if any
        let answer = if generation.answer.is_empty() {
            state.answer.clone().unwrap_or_default()
        } else {
            generation.answer
        };

        let question = state.last_question().unwrap_or_default().to_string();
        let usage = generation
            .usage
            .map(|u| UsageSnapshot::new(u, question, answer.clone()));

        state.add_message(Message::ai(answer.clone()));
        state.answer = Some(answer.clone());
        state.token_usage = usage.clone();

        Ok(StateDelta {
            answer: Some(answer),
            token_usage: usage,
            summary: None,
            messages: Some(state.messages.clone()),
        })
    }

    fn node_type(&self) -> NodeType {
        NodeType::Generate
    }
}

/// Folds older turns into the running summary. The answer is already
/// delivered, so a failure here is logged and leaves the history untouched.
pub struct SummarizeNode {
    memory: Arc<ConversationMemory>,
}

impl SummarizeNode {
    pub fn new(memory: Arc<ConversationMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Node for SummarizeNode {
    async fn execute(&self, state: &mut WorkflowState, _events: EventSender) -> Result<StateDelta> {
        match self
            .memory
            .compact(&state.messages, state.summary.as_deref())
            .await
        {
            Ok(compaction) => {
                info!(
                    thread_id = %state.thread_id,
                    kept = compaction.messages.len(),
                    folded = state.messages.len() - compaction.messages.len(),
                    "Conversation compacted"
                );
                state.summary = Some(compaction.summary.clone());
                state.messages = compaction.messages.clone();
                Ok(StateDelta {
                    summary: Some(compaction.summary),
                    messages: Some(compaction.messages),
                    ..Default::default()
                })
            }
            Err(e) => {
                error!(thread_id = %state.thread_id, error = %e, "Summarization failed");
                Ok(StateDelta::default())
            }
        }
    }

    fn node_type(&self) -> NodeType {
        NodeType::Summarize
    }
}
