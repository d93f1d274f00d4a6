//! Conversation memory: standalone-query rewriting and history compaction.

use anyhow::{bail, Result};
use folio_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use folio_types::{LLMConfig, WorkflowState};
use std::sync::Arc;

use crate::prompts::{
    render, CONTEXTUALIZE_TEMPLATE, EXTEND_SUMMARY_TEMPLATE, NO_PREVIOUS_CONVERSATION,
    SUMMARIZE_TEMPLATE,
};

/// Result of folding old turns into the summary
#[derive(Debug, Clone, PartialEq)]
pub struct Compaction {
    pub summary: String,
    /// The unfolded tail that stays live
    pub messages: Vec<Message>,
}

/// Render messages as `User:` / `Assistant:` lines
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Human { content } => Some(format!("User: {}", content)),
            Message::AI { content } => Some(format!("Assistant: {}", content)),
            Message::System { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary when present, otherwise the full transcript
pub fn memory_text(state: &WorkflowState) -> String {
    if let Some(summary) = state.summary.as_deref().filter(|s| !s.is_empty()) {
        return summary.to_string();
    }
    let history = transcript(&state.messages);
    if history.is_empty() {
        NO_PREVIOUS_CONVERSATION.to_string()
    } else {
        history
    }
}

pub struct ConversationMemory {
    client: Arc<dyn ChatClient>,
    llm: LLMConfig,
    keep_recent: usize,
}

impl ConversationMemory {
    pub fn new(client: Arc<dyn ChatClient>, llm: LLMConfig, keep_recent: usize) -> Self {
        Self {
            client,
            llm,
            keep_recent,
        }
    }

    fn request(&self, messages: Vec<Message>) -> ChatRequest {
        let mut options = ChatOptions::new();
        if let Some(temp) = self.llm.temperature {
            options = options.temperature(temp);
        }
        ChatRequest::new(self.llm.model.clone(), messages).with_options(options)
    }

    /// Rewrite the latest question into a standalone query.
    ///
    /// A single-message conversation passes the question through without a
    /// model call.
    pub async fn contextualize(&self, state: &WorkflowState) -> Result<String> {
        let Some(question) = state.last_question() else {
            bail!("no human message in state");
        };

        if state.messages.len() <= 1 {
            return Ok(question.to_string());
        }

        let history = match state.summary.as_deref().filter(|s| !s.is_empty()) {
            Some(summary) => summary.to_string(),
            None => transcript(&state.messages[..state.messages.len() - 1]),
        };

        let prompt = render(
            CONTEXTUALIZE_TEMPLATE,
            &[("history", &history), ("question", question)],
        );
        let response = self.client.chat(self.request(vec![Message::human(prompt)])).await?;
        let rewritten = response.text().trim();

        Ok(if rewritten.is_empty() {
            question.to_string()
        } else {
            rewritten.to_string()
        })
    }

    /// Fold all but the last `keep_recent` messages into an extended summary
    pub async fn compact(&self, messages: &[Message], summary: Option<&str>) -> Result<Compaction> {
        let instruction = match summary.filter(|s| !s.is_empty()) {
            Some(existing) => render(EXTEND_SUMMARY_TEMPLATE, &[("summary", existing)]),
            None => SUMMARIZE_TEMPLATE.to_string(),
        };

        let mut prompt: Vec<Message> = messages.to_vec();
        prompt.push(Message::human(instruction));

        let response = self.client.chat(self.request(prompt)).await?;
        let new_summary = response.text().trim().to_string();
        if new_summary.is_empty() {
            bail!("summarizer returned no content");
        }

        let keep_from = messages.len().saturating_sub(self.keep_recent);
        Ok(Compaction {
            summary: new_summary,
            messages: messages[keep_from..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::WorkflowInput;

    #[test]
    fn test_transcript_skips_system() {
        let text = transcript(&[
            Message::system("memory"),
            Message::human("What is the penalty for X?"),
            Message::ai("Two years."),
        ]);
        assert_eq!(text, "User: What is the penalty for X?\nAssistant: Two years.");
    }

    #[test]
    fn test_memory_text_prefers_summary() {
        let input = WorkflowInput::new("t", "u", "q", "c")
            .with_history(vec![Message::human("old"), Message::ai("reply")], Some("S".into()));
        let state = WorkflowState::from_input(input);
        assert_eq!(memory_text(&state), "S");

        let state = WorkflowState::from_input(WorkflowInput::new("t", "u", "q", "c"));
        assert_eq!(memory_text(&state), "User: q");
    }
}
