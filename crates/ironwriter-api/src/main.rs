//! IronWriter journal API server entry point.

use std::sync::{Arc, Mutex};

use ironwriter_api::config::AppConfig;
use ironwriter_api::error::AppError;
use ironwriter_api::state::AppState;
use ironwriter_core::clock::{Clock, SystemClock};
use ironwriter_core::repository::SessionStore;
use ironwriter_core::rng::{DeterministicRng, StandardRng};
use ironwriter_oracle::OracleBook;
use ironwriter_store::json_file_store::JsonFileSessionStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting IronWriter journal server");

    let config = AppConfig::from_env()?;

    let oracles = match &config.oracle_path {
        Some(path) => OracleBook::from_path(path)?,
        None => OracleBook::builtin()?,
    };
    let rng = match config.rng_seed {
        Some(seed) => StandardRng::seeded(seed),
        None => StandardRng::from_os(),
    };

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let store: Arc<dyn SessionStore> = Arc::new(JsonFileSessionStore::new(&config.session_path));
    let app_state = AppState::load(clock, rng, store, Arc::new(oracles))?;

    let app = ironwriter_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!(
        %addr,
        session_path = %config.session_path.display(),
        "Listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
