//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_PATH: &str = "ironwriter-session.json";

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// File the session is saved to.
    pub session_path: PathBuf,
    /// YAML oracle book replacing the built-in one.
    pub oracle_path: Option<PathBuf>,
    /// Seed for reproducible dice.
    pub rng_seed: Option<u64>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let session_path = lookup("IRONWRITER_SESSION_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH), PathBuf::from);
        let oracle_path = lookup("IRONWRITER_ORACLE_PATH").map(PathBuf::from);
        let rng_seed = lookup("IRONWRITER_RNG_SEED")
            .map(|raw| {
                raw.parse().map_err(|e| {
                    AppError::Config(format!("IRONWRITER_RNG_SEED must be a valid u64: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            host,
            port,
            session_path,
            oracle_path,
            rng_seed,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` and `port` do not form an
    /// address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
