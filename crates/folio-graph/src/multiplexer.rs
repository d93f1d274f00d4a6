//! Turns workflow events into the ordered, caller-facing event sequence.
//!
//! Order on the wire: optional `transcribed_text`, optional `thread_created`,
//! tokens in generation order, then exactly one `done` or `error`.

use anyhow::Result;
use async_trait::async_trait;
use folio_llm::Message;
use folio_types::{StateDelta, StreamEvent, UsageSnapshot};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    TranscribedText(String),
    ThreadCreated { thread_id: String },
    Token(String),
    Error { message: String },
    Done,
}

impl SseEvent {
    pub fn to_json(&self) -> Value {
        match self {
            SseEvent::TranscribedText(text) => json!({ "transcribed_text": text }),
            SseEvent::ThreadCreated { thread_id } => {
                json!({ "type": "thread_created", "thread_id": thread_id })
            }
            SseEvent::Token(token) => json!({ "token": token }),
            SseEvent::Error { message } => json!({ "type": "error", "message": message }),
            SseEvent::Done => json!({ "type": "done" }),
        }
    }

    /// `data: <json>` followed by a blank line
    pub fn to_sse_frame(&self) -> String {
        format!("data: {}\n\n", self.to_json())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SseEvent::Error { .. } | SseEvent::Done)
    }
}

/// What the workflow produced, captured from node outputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalState {
    pub answer: String,
    pub token_usage: Option<UsageSnapshot>,
    pub summary: Option<String>,
    /// Live message list after the run (compacted when summarization ran)
    pub messages: Option<Vec<Message>>,
    /// False when the run failed after tokens were already streamed
    pub completed: bool,
}

impl FinalState {
    fn from_delta(delta: StateDelta, streamed: String, completed: bool) -> Self {
        let answer = match delta.answer {
            Some(answer) if completed => answer,
            _ => streamed,
        };
        Self {
            answer,
            token_usage: delta.token_usage,
            summary: delta.summary,
            messages: delta.messages,
            completed,
        }
    }
}

/// Invoked once per stream, after the last token and before the terminal event
#[async_trait]
pub trait CompletionCallback: Send + Sync {
    async fn on_complete(&self, answer: &str, state: FinalState) -> Result<()>;
}

pub struct StreamMultiplexer {
    prelude: Vec<SseEvent>,
    callback: Option<Arc<dyn CompletionCallback>>,
    buffer: usize,
}

impl StreamMultiplexer {
    pub fn new() -> Self {
        Self {
            prelude: Vec::new(),
            callback: None,
            buffer: 1000,
        }
    }

    pub fn with_transcribed_text(mut self, text: impl Into<String>) -> Self {
        // Always first
        self.prelude.insert(0, SseEvent::TranscribedText(text.into()));
        self
    }

    pub fn with_thread_created(mut self, thread_id: impl Into<String>) -> Self {
        self.prelude.push(SseEvent::ThreadCreated {
            thread_id: thread_id.into(),
        });
        self
    }

    pub fn with_callback(mut self, callback: Arc<dyn CompletionCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_buffer(mut self, size: usize) -> Self {
        self.buffer = size.max(1);
        self
    }

    /// Drive on a background task so the callback still runs if the caller
    /// stops reading.
    pub fn spawn(self, events: mpsc::Receiver<StreamEvent>) -> mpsc::Receiver<SseEvent> {
        let (tx, rx) = mpsc::channel(self.buffer);
        tokio::spawn(async move {
            self.drive(events, tx).await;
        });
        rx
    }

    /// Consume workflow events until the run ends, forwarding to `out`
    pub async fn drive(self, mut events: mpsc::Receiver<StreamEvent>, out: mpsc::Sender<SseEvent>) {
        let mut sink = Sink { out, open: true };

        for event in self.prelude {
            sink.send(event).await;
        }

        let mut streamed = String::new();
        let mut tokens_sent = false;
        let mut delta = StateDelta::default();
        let mut failure: Option<String> = None;
        let mut succeeded = false;

        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Token { content } => {
                    streamed.push_str(&content);
                    tokens_sent = true;
                    sink.send(SseEvent::Token(content)).await;
                }
                StreamEvent::NodeEnd { output, .. } => delta.merge(output),
                StreamEvent::Error { message, node } => {
                    warn!(node = ?node, error = %message, "Workflow reported an error");
                    failure = Some(message);
                    break;
                }
                StreamEvent::EndStream { .. } => {
                    succeeded = true;
                    break;
                }
                StreamEvent::InitStream { .. } | StreamEvent::NodeStart { .. } => {}
            }
        }

        if !succeeded && failure.is_none() {
            failure = Some("workflow ended without completing".to_string());
        }

        if succeeded || tokens_sent {
            if let Some(callback) = self.callback {
                let state = FinalState::from_delta(delta, streamed, succeeded);
                let answer = state.answer.clone();
                if let Err(e) = callback.on_complete(&answer, state).await {
                    error!(error = %e, "Completion callback failed");
                }
            }
        }

        let terminal = match failure {
            Some(message) => SseEvent::Error { message },
            None => SseEvent::Done,
        };
        sink.send(terminal).await;
    }
}

impl Default for StreamMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Output channel that goes quiet once the reader is gone
struct Sink {
    out: mpsc::Sender<SseEvent>,
    open: bool,
}

impl Sink {
    async fn send(&mut self, event: SseEvent) {
        if self.open && self.out.send(event).await.is_err() {
            warn!("Stream reader disconnected");
            self.open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
        last: Mutex<Option<(String, FinalState)>>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionCallback for Recorder {
        async fn on_complete(&self, answer: &str, state: FinalState) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().await = Some((answer.to_string(), state));
            if self.fail {
                anyhow::bail!("store unavailable");
            }
            Ok(())
        }
    }

    async fn run(events: Vec<StreamEvent>, mux: StreamMultiplexer) -> Vec<SseEvent> {
        let (tx, rx) = mpsc::channel(64);
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let mut out = mux.spawn(rx);
        let mut collected = Vec::new();
        while let Some(event) = out.recv().await {
            collected.push(event);
        }
        collected
    }

    fn token(s: &str) -> StreamEvent {
        StreamEvent::Token {
            content: s.to_string(),
        }
    }

    fn end() -> StreamEvent {
        StreamEvent::EndStream {
            status: "success".to_string(),
            total_duration_ms: 5,
        }
    }

    #[tokio::test]
    async fn test_order_and_single_terminal() {
        let recorder = Arc::new(Recorder::default());
        let mux = StreamMultiplexer::new()
            .with_thread_created("t1")
            .with_transcribed_text("what is the penalty")
            .with_callback(recorder.clone());

        let out = run(
            vec![
                StreamEvent::NodeStart { node: "generate".to_string() },
                token("The"),
                token(" law"),
                token(" states"),
                StreamEvent::NodeEnd {
                    node: "generate".to_string(),
                    output: StateDelta {
                        answer: Some("The law states".to_string()),
                        ..Default::default()
                    },
                },
                end(),
            ],
            mux,
        )
        .await;

        assert_eq!(
            out,
            vec![
                SseEvent::TranscribedText("what is the penalty".to_string()),
                SseEvent::ThreadCreated { thread_id: "t1".to_string() },
                SseEvent::Token("The".to_string()),
                SseEvent::Token(" law".to_string()),
                SseEvent::Token(" states".to_string()),
                SseEvent::Done,
            ]
        );
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
        let (answer, state) = recorder.last.lock().await.clone().unwrap();
        assert_eq!(answer, "The law states");
        assert!(state.completed);
    }

    #[tokio::test]
    async fn test_error_before_tokens_skips_callback() {
        let recorder = Arc::new(Recorder::default());
        let out = run(
            vec![StreamEvent::Error {
                message: "embedding failed".to_string(),
                node: Some("retrieve".to_string()),
            }],
            StreamMultiplexer::new().with_callback(recorder.clone()),
        )
        .await;

        assert_eq!(
            out,
            vec![SseEvent::Error {
                message: "embedding failed".to_string()
            }]
        );
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_after_tokens_passes_partial_answer() {
        let recorder = Arc::new(Recorder::default());
        let out = run(
            vec![
                token("Partial"),
                StreamEvent::Error {
                    message: "stream reset".to_string(),
                    node: Some("generate".to_string()),
                },
            ],
            StreamMultiplexer::new().with_callback(recorder.clone()),
        )
        .await;

        assert!(out.last().unwrap().is_terminal());
        assert_eq!(out.iter().filter(|e| e.is_terminal()).count(), 1);
        let (answer, state) = recorder.last.lock().await.clone().unwrap();
        assert_eq!(answer, "Partial");
        assert!(!state.completed);
    }

    #[tokio::test]
    async fn test_callback_failure_still_done() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let out = run(
            vec![token("ok"), end()],
            StreamMultiplexer::new().with_callback(recorder.clone()),
        )
        .await;

        assert_eq!(out.last(), Some(&SseEvent::Done));
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closed_without_end_is_error() {
        let out = run(vec![StreamEvent::NodeStart { node: "retrieve".to_string() }], StreamMultiplexer::new()).await;
        assert!(matches!(out.as_slice(), [SseEvent::Error { .. }]));
    }

    #[test]
    fn test_sse_frames() {
        assert_eq!(SseEvent::Done.to_sse_frame(), "data: {\"type\":\"done\"}\n\n");
        assert_eq!(
            SseEvent::Token("The".to_string()).to_sse_frame(),
            "data: {\"token\":\"The\"}\n\n"
        );
        assert_eq!(
            SseEvent::ThreadCreated { thread_id: "t1".to_string() }.to_json()["type"],
            "thread_created"
        );
    }
}
