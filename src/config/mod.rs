//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the `PARIVAR_`
//! prefix; nested values use `__` as separator, e.g. `PARIVAR_SERVER__PORT`.

mod database;
mod engine;
mod error;
mod server;

pub use database::{DatabaseConfig, StoreBackend};
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Store configuration (backend selection, PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Engine configuration (resolver depth, provisioning defaults)
    #[serde(default)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables with
    /// the `PARIVAR` prefix.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("PARIVAR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}
