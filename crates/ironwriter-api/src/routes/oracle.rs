//! Routes for browsing the oracle book.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use ironwriter_journal::application::query_handlers;

use crate::state::AppState;

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct OracleTablesResponse {
    /// Table names in sorted order.
    pub tables: Vec<String>,
}

/// GET /
async fn list_tables(State(state): State<AppState>) -> Json<OracleTablesResponse> {
    Json(OracleTablesResponse {
        tables: query_handlers::list_oracle_tables(&state.oracles),
    })
}

/// Returns the router for the oracle book.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_tables))
}
