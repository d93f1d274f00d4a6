use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use folio_persist::{ThreadMessage, ThreadRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const EMPTY_PREVIEW: &str = "New Chat";

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadPreview {
    pub thread_id: String,
    pub doc_ids: Vec<String>,
    pub preview: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&ThreadRecord> for ThreadPreview {
    fn from(thread: &ThreadRecord) -> Self {
        let preview = thread.preview();
        Self {
            thread_id: thread.thread_id.clone(),
            doc_ids: thread.doc_ids.clone(),
            preview: if preview.is_empty() {
                EMPTY_PREVIEW.to_string()
            } else {
                preview
            },
            updated_at: thread.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadPreview>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub doc_ids: Vec<String>,
    pub messages: Vec<ThreadMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ThreadRecord> for ThreadResponse {
    fn from(thread: ThreadRecord) -> Self {
        Self {
            thread_id: thread.thread_id,
            doc_ids: thread.doc_ids,
            messages: thread.messages,
            summary: thread.summary,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

/// Threads of a user with sidebar previews, most recent first
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<ListThreadsResponse>> {
    let threads = state.persist.list_threads(&query.user_id).await?;

    Ok(Json(ListThreadsResponse {
        threads: threads.iter().map(ThreadPreview::from).collect(),
    }))
}

pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Json<ThreadResponse>> {
    let thread = state
        .persist
        .get_thread(&thread_id, &query.user_id)
        .await?
        .ok_or(ApiError::ThreadNotFound(thread_id))?;

    Ok(Json(thread.into()))
}
