//! IronWriter API — library crate exposing routes, state and errors for
//! integration tests.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

/// Builds the full application router.
pub fn build_router(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/session", routes::session::router())
        .nest("/api/v1/oracles", routes::oracle::router())
        .with_state(state)
}
