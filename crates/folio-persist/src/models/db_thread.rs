use chrono::{DateTime, Utc};
use folio_llm::Message;
use serde::{Deserialize, Serialize};

const PREVIEW_CHARS: usize = 50;

/// Database-agnostic thread model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub thread_id: String,
    pub user_id: String,
    pub doc_ids: Vec<String>,
    pub messages: Vec<ThreadMessage>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThreadRecord {
    pub fn new(
        thread_id: impl Into<String>,
        user_id: impl Into<String>,
        doc_ids: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            user_id: user_id.into(),
            doc_ids,
            messages: Vec::new(),
            summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_messages(mut self, messages: Vec<ThreadMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }

    /// Sidebar label: first human message, truncated
    pub fn preview(&self) -> String {
        let first = self
            .messages
            .iter()
            .find(|m| m.role == MessageRole::Human)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        if first.chars().count() > PREVIEW_CHARS {
            let cut: String = first.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", cut)
        } else {
            first.to_string()
        }
    }

    /// Messages in provider form, for seeding the next request
    pub fn history(&self) -> Vec<Message> {
        self.messages.iter().cloned().map(ThreadMessage::into_message).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ThreadMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Ai,
            content: content.into(),
        }
    }

    /// System messages are prompt scaffolding and are not stored
    pub fn from_message(message: &Message) -> Option<Self> {
        match message {
            Message::Human { content } => Some(Self::human(content.clone())),
            Message::AI { content } => Some(Self::ai(content.clone())),
            Message::System { .. } => None,
        }
    }

    pub fn from_messages(messages: &[Message]) -> Vec<Self> {
        messages.iter().filter_map(Self::from_message).collect()
    }

    pub fn into_message(self) -> Message {
        match self.role {
            MessageRole::Human => Message::human(self.content),
            MessageRole::Ai => Message::ai(self.content),
        }
    }
}
