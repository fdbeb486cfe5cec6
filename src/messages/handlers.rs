/**
 * Message Handlers
 *
 * The thread message page plus the atomic post endpoint and the live SSE
 * mirror. The page is served chronologically ascending (the service pages
 * newest-first; the handler re-sorts for display) with its author profiles
 * batch-fetched in one lookup.
 */

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::Event;
use axum::response::{IntoResponse, Sse};
use axum::Json;
use futures_util::Stream;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{Message, UserProfile};
use crate::realtime::sse::snapshot_stream;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageListParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessagePage {
    /// Messages in chronological (ascending) order
    pub messages: Vec<Message>,
    /// Profiles of every distinct author on the page
    pub authors: Vec<UserProfile>,
}

/// `GET /threads/{id}/messages?limit` - a page of messages with their
/// authors.
pub async fn list(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Query(params): Query<MessageListParams>,
) -> Result<Json<MessagePage>, ApiError> {
    let mut messages = state.messages.get_by_thread(&thread_id, params.limit).await?;
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let author_ids: Vec<String> = messages
        .iter()
        .map(|message| message.author_id.clone())
        .collect();
    let authors = state.profiles.get_many(&author_ids).await?;

    Ok(Json(MessagePage { messages, authors }))
}

/// `POST /threads/{id}/messages` - post a message; the message write and
/// the thread's activity bump commit atomically.
pub async fn post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(thread_id): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .messages
        .post(&thread_id, &user.id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /threads/{id}/messages/subscribe` - SSE mirror of the thread's
/// message page.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    snapshot_stream(state.messages.subscribe_by_thread(&thread_id))
}
