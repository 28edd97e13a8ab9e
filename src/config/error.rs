//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Ticket catalog unreadable: {0}")]
    CatalogIo(#[from] std::io::Error),

    #[error("Ticket catalog malformed: {0}")]
    CatalogParse(#[from] serde_yaml::Error),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Gateway base URL must be http(s)")]
    InvalidGatewayUrl,

    #[error("Payment page base URL must be http(s)")]
    InvalidPaymentPageUrl,

    #[error("Ticket catalog contains duplicate ticket id {0}")]
    DuplicateTicket(u32),

    #[error("Ticket {0} has min_members greater than max_members")]
    InvalidTicketBounds(u32),

    #[error("Ticket {0} must require at least one member")]
    EmptyGroupBound(u32),
}
