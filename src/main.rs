//! Premia backend entry point.
//!
//! Loads configuration, constructs the provider client and store once, and
//! serves the HTTP API. All dependencies are wired here and injected into
//! the handlers as shared state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use premia::adapters::http::billing::{api_router, BillingAppState};
use premia::adapters::postgres::PostgresEntitlementStore;
use premia::adapters::stripe::{StripeConfig, StripeGateway};
use premia::config::AppConfig;
use premia::domain::billing::WebhookVerifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    if config.payment.is_test_mode() {
        tracing::warn!("Payment provider is in TEST mode");
    }

    // One authenticated provider client for the process lifetime.
    let gateway = StripeGateway::new(StripeConfig::new(SecretString::new(
        config.payment.stripe_api_key.clone(),
    )));

    let pool = PgPoolOptions::new()
        .max_connections(config.store.max_connections)
        .connect(&config.store.url)
        .await
        .context("failed to connect to the user store")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run store migrations")?;

    let state = BillingAppState {
        payment_provider: Arc::new(gateway),
        entitlement_store: Arc::new(PostgresEntitlementStore::new(pool)),
        webhook_verifier: WebhookVerifier::new(SecretString::new(
            config.payment.stripe_webhook_secret.clone(),
        )),
        fallback_checkout_email: config.payment.fallback_checkout_email.clone(),
        boleto_enabled: config.payment.boleto_enabled,
        boleto_expiry_days: config.payment.boleto_expiry_days,
    };

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Starting Premia payment backend");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server exited")?;

    Ok(())
}

/// Builds the CORS layer from configured origins; permissive when none are
/// configured (development).
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(origins)
    }
}
