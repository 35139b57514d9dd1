//! Request handlers for the observer.
//!
//! Every handler reads straight from the [`RecordStore`] on the blocking
//! pool. Nothing here writes.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML topic index, newest first |
//! | `GET` | `/topic/{*location}` | HTML topic page with replies |
//! | `GET` | `/api/topics` | Topic summaries as JSON |
//! | `GET` | `/api/topics/{*location}` | Full topic JSON |
//! | `GET` | `/health` | Liveness probe |
//!
//! [`RecordStore`]: kommunity_store::RecordStore

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect};
use kommunity_types::{Location, Topic, TopicSummary};
use serde::Serialize;

use crate::error::ObserverError;
use crate::pages::summarize;
use crate::state::AppState;

/// Body of `GET /api/topics`.
#[derive(Debug, Serialize)]
pub struct TopicList {
    /// Number of topics listed.
    pub count: usize,
    /// Summaries, newest first.
    pub topics: Vec<TopicSummary>,
}

/// Body of `GET /api/topics/{*location}`: the stored record plus its location.
#[derive(Debug, Serialize)]
pub struct TopicDetail {
    /// The record as stored.
    #[serde(flatten)]
    pub topic: Topic,
    /// Store-relative location of the record.
    pub location: Option<Location>,
}

async fn summaries(state: &AppState) -> Result<Vec<TopicSummary>, ObserverError> {
    let topics = state.read(kommunity_store::RecordStore::list_all).await??;
    Ok(topics.iter().map(summarize).collect())
}

async fn lookup(state: &AppState, location: String) -> Result<Topic, ObserverError> {
    let requested = location.clone();
    state
        .read(move |store| store.get_by_location(&location))
        .await?
        .map_err(|e| ObserverError::from_lookup(&requested, e))
}

/// `GET /` -- HTML index of every topic.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ObserverError> {
    let topics = summaries(&state).await?;
    Ok(Html(state.pages.index(&topics)?))
}

/// `GET /topic/{*location}` -- HTML page for one topic.
pub async fn topic_page(
    State(state): State<Arc<AppState>>,
    Path(location): Path<String>,
) -> Result<Html<String>, ObserverError> {
    let topic = lookup(&state, location).await?;
    Ok(Html(state.pages.topic(&topic)?))
}

/// `GET /topic/` -- nothing to show, back to the index.
pub async fn topic_root() -> Redirect {
    Redirect::to("/")
}

/// `GET /api/topics` -- topic summaries as JSON.
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TopicList>, ObserverError> {
    let topics = summaries(&state).await?;
    Ok(Json(TopicList {
        count: topics.len(),
        topics,
    }))
}

/// `GET /api/topics/{*location}` -- one full topic as JSON.
pub async fn get_topic(
    State(state): State<Arc<AppState>>,
    Path(location): Path<String>,
) -> Result<Json<TopicDetail>, ObserverError> {
    let topic = lookup(&state, location).await?;
    let location = topic.location().cloned();
    Ok(Json(TopicDetail { topic, location }))
}

/// `GET /health` -- liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
