use axum::response::sse::{Event, Sse};
use folio_graph::{CompletionCallback, SseEvent, StreamMultiplexer, WorkflowInput};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use crate::state::AppState;

/// Start a workflow run and expose its events as Server-Sent Events.
///
/// The multiplexer runs on its own task: persistence completes even when the
/// client goes away mid-stream.
pub fn stream_workflow(
    state: &AppState,
    input: WorkflowInput,
    multiplexer: StreamMultiplexer,
    callback: Arc<dyn CompletionCallback>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state.workflow.spawn_run(input);
    let receiver = multiplexer.with_callback(callback).spawn(events);

    let sse_stream = ReceiverStream::new(receiver).map(|event| Ok(to_event(&event)));

    Sse::new(sse_stream)
}

fn to_event(event: &SseEvent) -> Event {
    Event::default().data(event.to_json().to_string())
}
