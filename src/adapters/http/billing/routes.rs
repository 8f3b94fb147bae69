//! Axum router configuration for the billing endpoints.

use axum::{routing::post, Router};

use super::handlers::{create_payment_intent, handle_stripe_webhook, BillingAppState};

/// Checkout routes.
///
/// - `POST /intent` - create a payment intent + ephemeral key
///
/// Only POST is routed; axum answers other methods with 405.
pub fn checkout_routes() -> Router<BillingAppState> {
    Router::new().route("/intent", post(create_payment_intent))
}

/// Webhook routes.
///
/// Separate from the checkout routes: webhooks carry no user identity and
/// are authenticated by signature instead.
///
/// - `POST /stripe` - provider event delivery
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Complete API router, mounted at `/api`.
pub fn api_router(state: BillingAppState) -> Router {
    Router::new()
        .nest("/api/checkout", checkout_routes())
        .nest("/api/webhooks", webhook_routes())
        .with_state(state)
}
