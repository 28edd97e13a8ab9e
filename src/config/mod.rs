//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `FEST_REGISTRY`
//! prefix and nested keys use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use fest_registry::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod gateway;
mod server;
mod tickets;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use server::{Environment, ServerConfig};
pub use tickets::{TicketCatalog, TicketKind, TicketPolicy, TicketsConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Booking provider configuration (API, webhook token, payment page)
    pub gateway: GatewayConfig,

    /// Ticket catalog location
    #[serde(default)]
    pub tickets: TicketsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file when present, then environment variables with the
    /// `FEST_REGISTRY` prefix. Nested keys use `__`:
    ///
    /// - `FEST_REGISTRY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `FEST_REGISTRY__GATEWAY__API_TOKEN=...` -> `gateway.api_token = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FEST_REGISTRY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.gateway.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize these tests.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var(
            "FEST_REGISTRY__DATABASE__URL",
            "postgresql://test@localhost/fest",
        );
        env::set_var(
            "FEST_REGISTRY__GATEWAY__BASE_URL",
            "https://provider.example.com/api",
        );
        env::set_var("FEST_REGISTRY__GATEWAY__API_TOKEN", "tok_x");
        env::set_var("FEST_REGISTRY__GATEWAY__WEBHOOK_TOKEN", "whk_x");
        env::set_var(
            "FEST_REGISTRY__GATEWAY__PAYMENT_PAGE_BASE_URL",
            "https://pay.example.com/order/",
        );
    }

    fn clear_env() {
        env::remove_var("FEST_REGISTRY__DATABASE__URL");
        env::remove_var("FEST_REGISTRY__GATEWAY__BASE_URL");
        env::remove_var("FEST_REGISTRY__GATEWAY__API_TOKEN");
        env::remove_var("FEST_REGISTRY__GATEWAY__WEBHOOK_TOKEN");
        env::remove_var("FEST_REGISTRY__GATEWAY__PAYMENT_PAGE_BASE_URL");
        env::remove_var("FEST_REGISTRY__SERVER__PORT");
        env::remove_var("FEST_REGISTRY__SERVER__ENVIRONMENT");
    }

    #[test]
    fn loads_and_validates_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.database.url, "postgresql://test@localhost/fest");
        assert_eq!(config.tickets.catalog_path, "tickets.yaml");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn server_section_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(!config.is_production());
    }

    #[test]
    fn environment_overrides_win() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FEST_REGISTRY__SERVER__PORT", "3000");
        env::set_var("FEST_REGISTRY__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
    }
}
