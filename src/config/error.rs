//! Configuration error types

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors raised by semantic validation of loaded configuration.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("Stripe API key must start with 'sk_'")]
    InvalidStripeKey,

    #[error("Stripe webhook secret must start with 'whsec_'")]
    InvalidStripeWebhookSecret,

    #[error("Server port must be non-zero")]
    InvalidPort,

    #[error("Request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("Store URL must be a postgres:// or postgresql:// URL")]
    InvalidStoreUrl,

    #[error("Boleto expiry must be between 1 and 60 days")]
    InvalidBoletoExpiry,
}
