//! Routes for the live journal session.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use ironwriter_core::error::DomainError;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use ironwriter_journal::application::document::SessionDocument;
use ironwriter_journal::application::query_handlers::{self, BookmarkView, SessionView};
use ironwriter_journal::application::command_handlers;
use ironwriter_journal::domain::bookmarks::BookmarkFilter;
use ironwriter_journal::domain::commands;
use ironwriter_journal::domain::moment::Category;
use ironwriter_journal::domain::roll::RollSource;
use ironwriter_journal::domain::state::Stat;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for submitting or editing an entry.
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    /// Free text with embedded `[tag ...]` commands.
    pub text: String,
    /// Fiction unless stated otherwise.
    #[serde(default = "default_category")]
    pub category: Category,
}

fn default_category() -> Category {
    Category::Fiction
}

/// Request body for POST /rolls.
#[derive(Debug, Deserialize)]
pub struct RollRequest {
    /// Stat added to the action value.
    #[serde(default)]
    pub stat: Option<Stat>,
    /// Flat modifier.
    #[serde(default)]
    pub add: i32,
    /// Action die, or a progress track named by id or display name.
    #[serde(default)]
    pub source: RollSource,
}

/// Query string for GET /bookmarks.
#[derive(Debug, Deserialize)]
pub struct BookmarkQuery {
    /// One of `all`, `bonds`, `story` or `progress`.
    pub filter: Option<String>,
}

/// Response body for commands that may record a new moment.
#[derive(Debug, Serialize)]
pub struct RecordedResponse {
    /// Position of the recorded moment, if one was recorded.
    pub index: Option<usize>,
    /// The session after the command.
    pub session: SessionView,
}

/// GET /
#[instrument(skip(state))]
async fn get_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let timeline = state.timeline()?;
    Ok(Json(query_handlers::get_session(&timeline)))
}

/// POST /new
#[instrument(skip(state))]
async fn start_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
    };

    let mut timeline = state.timeline()?;
    command_handlers::handle_start_session(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        state.store.as_ref(),
    )?;

    Ok(Json(query_handlers::get_session(&timeline)))
}

/// POST /moments
#[instrument(skip(state, request), fields(category = ?request.category))]
async fn submit_entry(
    State(state): State<AppState>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<RecordedResponse>, ApiError> {
    let command = commands::SubmitEntry {
        correlation_id: Uuid::new_v4(),
        text: request.text,
        category: request.category,
    };

    let mut timeline = state.timeline()?;
    let index = command_handlers::handle_submit_entry(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        state.store.as_ref(),
    )?;

    Ok(Json(RecordedResponse {
        index: Some(index),
        session: query_handlers::get_session(&timeline),
    }))
}

/// PUT /moments/{index}
#[instrument(skip(state, request))]
async fn edit_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::EditEntry {
        correlation_id: Uuid::new_v4(),
        index,
        text: request.text,
        category: request.category,
    };

    let mut timeline = state.timeline()?;
    command_handlers::handle_edit_entry(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        state.store.as_ref(),
    )?;

    Ok(Json(query_handlers::get_session(&timeline)))
}

/// DELETE /moments/{index}
#[instrument(skip(state))]
async fn delete_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::DeleteEntry {
        correlation_id: Uuid::new_v4(),
        index,
    };

    let mut timeline = state.timeline()?;
    command_handlers::handle_delete_entry(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        state.store.as_ref(),
    )?;

    Ok(Json(query_handlers::get_session(&timeline)))
}

/// POST /moments/{index}/reroll
#[instrument(skip(state))]
async fn reroll_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::RerollEntry {
        correlation_id: Uuid::new_v4(),
        index,
    };

    let mut timeline = state.timeline()?;
    command_handlers::handle_reroll_entry(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        &state.rng,
        &state.oracles,
        state.store.as_ref(),
    )?;

    Ok(Json(query_handlers::get_session(&timeline)))
}

/// POST /rolls
#[instrument(skip(state, request), fields(stat = ?request.stat, add = request.add))]
async fn perform_roll(
    State(state): State<AppState>,
    Json(request): Json<RollRequest>,
) -> Result<Json<RecordedResponse>, ApiError> {
    let command = commands::PerformRoll {
        correlation_id: Uuid::new_v4(),
        stat: request.stat,
        add: request.add,
        source: request.source,
    };

    let mut timeline = state.timeline()?;
    let index = command_handlers::handle_perform_roll(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        &state.rng,
        state.store.as_ref(),
    )?;

    Ok(Json(RecordedResponse {
        index,
        session: query_handlers::get_session(&timeline),
    }))
}

/// POST /oracles/{table}
#[instrument(skip(state))]
async fn consult_oracle(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<RecordedResponse>, ApiError> {
    let command = commands::ConsultOracle {
        correlation_id: Uuid::new_v4(),
        table,
    };

    let mut timeline = state.timeline()?;
    let index = command_handlers::handle_consult_oracle(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        &state.rng,
        &state.oracles,
        state.store.as_ref(),
    )?;

    Ok(Json(RecordedResponse {
        index: Some(index),
        session: query_handlers::get_session(&timeline),
    }))
}

/// GET /bookmarks?filter=
#[instrument(skip(state))]
async fn list_bookmarks(
    State(state): State<AppState>,
    Query(query): Query<BookmarkQuery>,
) -> Result<Json<Vec<BookmarkView>>, ApiError> {
    let filter = match query.filter.as_deref() {
        None => BookmarkFilter::default(),
        Some(name) => BookmarkFilter::parse(name).ok_or_else(|| {
            DomainError::Validation(format!("unknown bookmark filter: {name}"))
        })?,
    };

    let timeline = state.timeline()?;
    Ok(Json(query_handlers::list_bookmarks(&timeline, filter)))
}

/// GET /export
#[instrument(skip(state))]
async fn export_session(State(state): State<AppState>) -> Result<Json<SessionDocument>, ApiError> {
    let timeline = state.timeline()?;
    Ok(Json(query_handlers::export_session(
        &timeline,
        state.clock.as_ref(),
    )))
}

/// POST /import
#[instrument(skip(state, document))]
async fn import_session(
    State(state): State<AppState>,
    Json(document): Json<serde_json::Value>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::ImportSession {
        correlation_id: Uuid::new_v4(),
        document,
    };

    let mut timeline = state.timeline()?;
    command_handlers::handle_import_session(
        &command,
        &mut timeline,
        state.clock.as_ref(),
        state.store.as_ref(),
    )
    .map_err(ApiError::RejectedDocument)?;

    Ok(Json(query_handlers::get_session(&timeline)))
}

/// Returns the router for the session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/new", post(start_session))
        .route("/moments", post(submit_entry))
        .route("/moments/{index}", put(edit_entry).delete(delete_entry))
        .route("/moments/{index}/reroll", post(reroll_entry))
        .route("/rolls", post(perform_roll))
        .route("/oracles/{table}", post(consult_oracle))
        .route("/bookmarks", get(list_bookmarks))
        .route("/export", get(export_session))
        .route("/import", post(import_session))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ironwriter_core::clock::Clock;
    use ironwriter_core::repository::SessionStore;
    use ironwriter_core::rng::DeterministicRng;
    use ironwriter_journal::domain::timeline::Timeline;
    use ironwriter_oracle::OracleBook;
    use ironwriter_test_support::{FailingSessionStore, FixedClock, InMemorySessionStore, MockRng};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app_state_with(store: Arc<dyn SessionStore>) -> AppState {
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock::default());
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
        AppState::new(
            Timeline::new_session(Uuid::new_v4()),
            clock,
            rng,
            store,
            Arc::new(OracleBook::builtin().unwrap()),
        )
    }

    fn test_app_state() -> AppState {
        app_state_with(Arc::new(InMemorySessionStore::new()))
    }

    fn failing_app_state() -> AppState {
        app_state_with(Arc::new(FailingSessionStore))
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_submit_entry_returns_200_with_index() {
        // Arrange
        let app = router().with_state(test_app_state());
        let body = serde_json::json!({ "text": "[bond Greta]" });

        // Act
        let response = app.oneshot(post("/moments", &body)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["index"], 1);
        assert_eq!(json["session"]["state"]["stats"]["bonds"], 1);
    }

    #[tokio::test]
    async fn test_submit_entry_returns_422_for_missing_text() {
        let app = router().with_state(test_app_state());

        let response = app
            .oneshot(post("/moments", &serde_json::json!({})))
            .await
            .unwrap();

        // Axum returns 422 for deserialization failures.
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_submit_entry_returns_500_when_store_fails() {
        // Arrange
        let app = router().with_state(failing_app_state());
        let body = serde_json::json!({ "text": "The rain falls." });

        // Act
        let response = app.oneshot(post("/moments", &body)).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "infrastructure_error");
    }

    #[tokio::test]
    async fn test_reroll_of_fiction_entry_returns_400() {
        let state = test_app_state();
        let app = router().with_state(state.clone());
        app.oneshot(post("/moments", &serde_json::json!({ "text": "Quiet." })))
            .await
            .unwrap();

        let app = router().with_state(state);
        let response = app
            .oneshot(post("/moments/1/reroll", &Value::Null))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_bookmark_filter_returns_400() {
        let app = router().with_state(test_app_state());
        let request = Request::builder()
            .method("GET")
            .uri("/bookmarks?filter=weather")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "validation_error");
    }
}
