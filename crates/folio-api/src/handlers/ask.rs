use axum::{
    extract::{Multipart, State},
    response::sse::{Event, Sse},
    Form,
};
use folio_graph::{StreamMultiplexer, WorkflowInput};
use folio_retrieval::{collection_name_from_path, hash_bytes};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::callback::{PersistingCallback, ThreadUpdate};
use crate::error::{ApiError, ApiResult};
use crate::handlers::stream::stream_workflow;
use crate::quota::ensure_within_quota;
use crate::state::AppState;

/// Form fields of a first question
struct AskForm {
    user_id: String,
    question: String,
    file_name: String,
    bytes: Vec<u8>,
}

/// Read the form, checking the owner's quota before any file body is buffered.
///
/// A client sending the file ahead of `user_id` gets the check once the
/// whole form is read.
async fn read_ask_form(state: &AppState, mut multipart: Multipart) -> ApiResult<AskForm> {
    let mut user_id: Option<String> = None;
    let mut question = None;
    let mut upload = None;
    let mut quota_checked = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf" | "file" => {
                let file_name = field
                    .file_name()
                    .map(sanitize_file_name)
                    .ok_or_else(|| ApiError::BadRequest("upload has no file name".to_string()))?;
                if let Some(user_id) = user_id.as_deref() {
                    check_quota(state, user_id).await?;
                    quota_checked = true;
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            "user_id" | "question" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                if name == "user_id" {
                    user_id = Some(text);
                } else {
                    question = Some(text);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("missing field: pdf".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }

    let user_id = required(user_id, "user_id")?;
    if !quota_checked {
        check_quota(state, &user_id).await?;
    }

    Ok(AskForm {
        user_id,
        question: required(question, "question")?,
        file_name,
        bytes,
    })
}

async fn check_quota(state: &AppState, user_id: &str) -> ApiResult<()> {
    ensure_within_quota(state.persist.as_ref(), user_id.trim(), state.config.quota.token_limit).await
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing field: {}", field)))
}

/// Keep the last path component only
fn sanitize_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .unwrap_or("document")
        .to_string()
}

/// Store the upload under its content hash so equal names never collide
async fn save_upload(dir: &Path, doc_id: &str, file_name: &str, bytes: &[u8]) -> ApiResult<PathBuf> {
    let folder = dir.join(doc_id);
    tokio::fs::create_dir_all(&folder).await?;
    let path = folder.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// First question about a document: upload, open a thread, stream the answer
pub async fn ask(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let form = read_ask_form(&state, multipart).await?;

    let doc_id = hash_bytes(&form.bytes);
    let path = save_upload(&state.config.uploads.directory, &doc_id, &form.file_name, &form.bytes).await?;
    let collection = collection_name_from_path(&path);
    let thread_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(
        thread_id = %thread_id,
        user_id = %form.user_id,
        doc_id = %doc_id,
        collection = %collection,
        "New thread"
    );

    let input = WorkflowInput::new(&thread_id, &form.user_id, &form.question, collection)
        .with_doc_ids(vec![doc_id.clone()])
        .with_documents_path(path);

    let callback = Arc::new(PersistingCallback::new(
        state.persist.clone(),
        &thread_id,
        &form.user_id,
        vec![doc_id],
        &form.question,
        ThreadUpdate::Create,
    ));

    let multiplexer = StreamMultiplexer::new().with_thread_created(&thread_id);
    Ok(stream_workflow(&state, input, multiplexer, callback))
}

#[derive(Debug, Deserialize)]
pub struct FollowUpRequest {
    pub user_id: String,
    pub thread_id: String,
    pub question: String,
}

/// Further question on an existing thread, documents already ingested
pub async fn follow_up(
    State(state): State<Arc<AppState>>,
    Form(req): Form<FollowUpRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let question = required(Some(req.question), "question")?;
    check_quota(&state, &req.user_id).await?;

    let thread = state
        .persist
        .get_thread(&req.thread_id, &req.user_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(req.thread_id.clone()))?;

    let primary = thread
        .doc_ids
        .first()
        .ok_or_else(|| ApiError::DocumentNotFound(format!("thread {} has no document", thread.thread_id)))?;
    let file_name = state
        .persist
        .document_file_name(primary, &req.user_id)
        .await?
        .ok_or_else(|| ApiError::DocumentNotFound(primary.clone()))?;
    let collection = collection_name_from_path(Path::new(&file_name));

    let input = WorkflowInput::new(&thread.thread_id, &req.user_id, &question, collection)
        .with_history(thread.history(), thread.summary.clone())
        .with_doc_ids(thread.doc_ids.clone())
        .with_vectorstore_uploaded(true);

    let callback = Arc::new(PersistingCallback::new(
        state.persist.clone(),
        &thread.thread_id,
        &req.user_id,
        thread.doc_ids.clone(),
        &question,
        ThreadUpdate::Append {
            previous: thread.messages,
            summary: thread.summary,
        },
    ));

    Ok(stream_workflow(&state, input, StreamMultiplexer::new(), callback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Penal Code.pdf"), "Penal Code.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".."), "document");
        assert_eq!(sanitize_file_name(""), "document");
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  u1 ".into()), "user_id").unwrap(), "u1");
        assert!(required(Some("   ".into()), "user_id").is_err());
        assert!(required(None, "question").is_err());
    }
}
