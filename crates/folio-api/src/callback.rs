//! Persists a finished exchange: the thread record, then token usage.

use anyhow::Result;
use async_trait::async_trait;
use folio_graph::{CompletionCallback, FinalState};
use folio_persist::{
    log_usage_with_retry, PersistenceClient, ThreadMessage, ThreadRecord, UsageRecord,
    USAGE_LOG_ATTEMPTS,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Where the exchange lands
pub enum ThreadUpdate {
    /// First exchange of a thread created by this request
    Create,
    /// Appended to the stored turns of an existing thread
    Append {
        previous: Vec<ThreadMessage>,
        summary: Option<String>,
    },
}

pub struct PersistingCallback {
    persist: Arc<dyn PersistenceClient>,
    thread_id: String,
    user_id: String,
    doc_ids: Vec<String>,
    question: String,
    update: ThreadUpdate,
}

impl PersistingCallback {
    pub fn new(
        persist: Arc<dyn PersistenceClient>,
        thread_id: impl Into<String>,
        user_id: impl Into<String>,
        doc_ids: Vec<String>,
        question: impl Into<String>,
        update: ThreadUpdate,
    ) -> Self {
        Self {
            persist,
            thread_id: thread_id.into(),
            user_id: user_id.into(),
            doc_ids,
            question: question.into(),
            update,
        }
    }

    /// The message list the next turn starts from.
    ///
    /// A completed run reports its live list, already compacted when
    /// summarization folded old turns. A failed run only adds this exchange.
    fn live_messages(
        &self,
        previous: &[ThreadMessage],
        answer: &str,
        state: &FinalState,
    ) -> Vec<ThreadMessage> {
        match &state.messages {
            Some(live) if state.completed => ThreadMessage::from_messages(live),
            _ => {
                let mut messages = previous.to_vec();
                messages.push(ThreadMessage::human(self.question.clone()));
                messages.push(ThreadMessage::ai(answer));
                messages
            }
        }
    }
}

#[async_trait]
impl CompletionCallback for PersistingCallback {
    async fn on_complete(&self, answer: &str, state: FinalState) -> Result<()> {
        if !state.completed {
            warn!(thread_id = %self.thread_id, "Persisting partial answer of a failed run");
        }

        // Full writes of the resulting thread, so a repeated call is harmless
        match &self.update {
            ThreadUpdate::Create => {
                let record = ThreadRecord::new(&self.thread_id, &self.user_id, self.doc_ids.clone())
                    .with_messages(self.live_messages(&[], answer, &state))
                    .with_summary(state.summary.clone());
                self.persist.upsert_thread(record).await?;
            }
            ThreadUpdate::Append { previous, summary } => {
                let messages = self.live_messages(previous, answer, &state);
                let summary = state.summary.clone().or_else(|| summary.clone());
                self.persist
                    .update_thread_messages(&self.thread_id, messages, summary)
                    .await?;
            }
        }

        info!(thread_id = %self.thread_id, user_id = %self.user_id, "Thread persisted");

        if let Some(usage) = &state.token_usage {
            let record =
                UsageRecord::from_snapshot(&self.user_id, &self.thread_id, self.doc_ids.clone(), usage);
            log_usage_with_retry(self.persist.as_ref(), record, USAGE_LOG_ATTEMPTS).await;
        }

        Ok(())
    }
}
