use folio_llm::Message;
use serde::{Deserialize, Serialize};

use crate::state::UsageSnapshot;

/// Events emitted by the workflow runner while a request executes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Workflow execution started
    InitStream {
        run_id: String,
        thread_id: String,
        timestamp: i64,
    },

    NodeStart {
        node: String,
    },

    /// Answer token from the generation node, in generation order
    Token {
        content: String,
    },

    /// Node finished; `output` carries the fields it wrote that callers persist
    NodeEnd {
        node: String,
        #[serde(default, skip_serializing_if = "StateDelta::is_empty")]
        output: StateDelta,
    },

    /// Fatal error occurred
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        node: Option<String>,
    },

    /// Workflow execution completed
    EndStream {
        status: String,
        total_duration_ms: u64,
    },
}

/// Persistable fields written by a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<UsageSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl StateDelta {
    pub fn is_empty(&self) -> bool {
        self.answer.is_none()
            && self.token_usage.is_none()
            && self.summary.is_none()
            && self.messages.is_none()
    }

    /// Later deltas win field by field
    pub fn merge(&mut self, other: StateDelta) {
        if other.answer.is_some() {
            self.answer = other.answer;
        }
        if other.token_usage.is_some() {
            self.token_usage = other.token_usage;
        }
        if other.summary.is_some() {
            self.summary = other.summary;
        }
        if other.messages.is_some() {
            self.messages = other.messages;
        }
    }
}
