use crate::error::WorkflowError;
use crate::node::{EventSender, Node, NodeType};
use crate::router::{NextNode, Router};
use folio_types::{GraphConfig, StreamEvent, WorkflowInput, WorkflowState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Explicit state-machine runner over the workflow nodes
pub struct Workflow {
    nodes: Arc<HashMap<NodeType, Arc<dyn Node>>>,
    router: Arc<dyn Router>,
    config: GraphConfig,
}

impl Clone for Workflow {
    fn clone(&self) -> Self {
        Self {
            nodes: Arc::clone(&self.nodes),
            router: Arc::clone(&self.router),
            config: self.config.clone(),
        }
    }
}

impl Workflow {
    pub fn new(nodes: Vec<Arc<dyn Node>>, router: Arc<dyn Router>, config: GraphConfig) -> Self {
        let nodes = nodes.into_iter().map(|n| (n.node_type(), n)).collect();
        Self {
            nodes: Arc::new(nodes),
            router,
            config,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::WorkflowBuilder {
        crate::builder::WorkflowBuilder::new()
    }

    /// Spawn execution in background, return event receiver
    pub fn spawn_run(&self, input: WorkflowInput) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(self.config.event_buffer.max(1));
        let workflow = self.clone();

        tokio::spawn(async move {
            // Failures were already reported on the channel
            let _ = workflow.run(input, tx).await;
        });

        rx
    }

    /// Execute in-line until END, emitting events as nodes run.
    ///
    /// On failure an `Error` event is the last event sent and the error is
    /// returned; on success the last event is `EndStream`.
    pub async fn run(
        &self,
        input: WorkflowInput,
        events: EventSender,
    ) -> Result<WorkflowState, WorkflowError> {
        let start_time = Instant::now();
        let mut state = WorkflowState::from_input(input);

        let _ = events
            .send(StreamEvent::InitStream {
                run_id: state.run_id.clone(),
                thread_id: state.thread_id.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            })
            .await;

        match self.execute_loop(&mut state, &events).await {
            Ok(()) => {
                let total_duration_ms = start_time.elapsed().as_millis() as u64;
                info!(
                    run_id = %state.run_id,
                    thread_id = %state.thread_id,
                    duration_ms = total_duration_ms,
                    "Workflow finished"
                );
                let _ = events
                    .send(StreamEvent::EndStream {
                        status: "success".to_string(),
                        total_duration_ms,
                    })
                    .await;
                Ok(state)
            }
            Err((node, e)) => {
                error!(run_id = %state.run_id, node = ?node, error = %e, "Workflow failed");
                let _ = events
                    .send(StreamEvent::Error {
                        message: e.to_string(),
                        node: node.map(|n| n.name().to_string()),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn execute_loop(
        &self,
        state: &mut WorkflowState,
        events: &EventSender,
    ) -> Result<(), (Option<NodeType>, WorkflowError)> {
        let mut current = NodeType::SetDocId;
        let mut iteration = 0;

        loop {
            // Guardrail: max iterations
            if iteration >= self.config.max_iterations {
                return Err((None, WorkflowError::MaxIterations(self.config.max_iterations)));
            }

            let node = self.nodes.get(&current).ok_or_else(|| {
                (
                    Some(current),
                    WorkflowError::InvalidInput(format!("node {} is not registered", current)),
                )
            })?;

            let _ = events
                .send(StreamEvent::NodeStart {
                    node: current.name().to_string(),
                })
                .await;

            let output = node
                .execute(state, events.clone())
                .await
                .map_err(|e| (Some(current), WorkflowError::from_node(current.name(), e)))?;

            let _ = events
                .send(StreamEvent::NodeEnd {
                    node: current.name().to_string(),
                    output,
                })
                .await;

            match self.router.next(state, current) {
                NextNode::End => return Ok(()),
                NextNode::Node(next) => current = next,
            }

            iteration += 1;
        }
    }
}
