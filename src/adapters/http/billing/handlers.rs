//! HTTP handlers for the billing endpoints.
//!
//! The webhook handler takes the body as raw bytes: signature verification
//! runs over the byte-exact payload, so nothing upstream may parse or
//! re-serialize it.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    CreatePaymentIntentCommand, CreatePaymentIntentHandler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler,
};
use crate::domain::billing::{BillingError, WebhookError, WebhookVerifier};
use crate::ports::{EntitlementStore, PaymentProvider};

use super::dto::{
    CreateIntentRequestDto, ErrorResponse, PaymentSheetResponse, WebhookAckResponse,
};

/// Header carrying the provider's webhook signature.
const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Shared application state for the billing module.
///
/// Cloned per request; dependencies are Arc-wrapped and constructed once at
/// process start.
#[derive(Clone)]
pub struct BillingAppState {
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub entitlement_store: Arc<dyn EntitlementStore>,
    pub webhook_verifier: WebhookVerifier,
    /// Email used when an anonymous client checks out without one.
    pub fallback_checkout_email: String,
    /// Whether boleto is offered alongside card.
    pub boleto_enabled: bool,
    /// Voucher expiry window, in days.
    pub boleto_expiry_days: u32,
}

impl BillingAppState {
    /// Creates the checkout command handler from the shared state.
    pub fn create_payment_intent_handler(&self) -> CreatePaymentIntentHandler {
        CreatePaymentIntentHandler::new(
            self.payment_provider.clone(),
            self.boleto_enabled,
            self.boleto_expiry_days,
        )
    }

    /// Creates the webhook command handler from the shared state.
    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.entitlement_store.clone(),
        )
    }
}

/// POST /api/checkout/intent - create a payment intent for one checkout.
pub async fn create_payment_intent(
    State(state): State<BillingAppState>,
    Json(request): Json<CreateIntentRequestDto>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.create_payment_intent_handler();
    let cmd = CreatePaymentIntentCommand {
        plan: request.plan_id,
        email: request
            .email
            .unwrap_or_else(|| state.fallback_checkout_email.clone()),
        user_id: request.user_id,
    };

    let sheet = handler.handle(cmd).await?;

    let response = PaymentSheetResponse {
        payment_intent: sheet.payment_intent_secret,
        ephemeral_key: sheet.ephemeral_key_secret,
        customer: sheet.customer_id,
        boleto_url: sheet.boleto_url,
    };

    Ok(Json(response))
}

/// POST /api/webhooks/stripe - process a provider webhook delivery.
///
/// Responds `200 {"received": true}` for every authenticated event, even
/// when the downstream entitlement write failed; only verification
/// failures produce an error status.
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(BillingApiError::MissingSignatureHeader)?;

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok(Json(WebhookAckResponse { received: true }))
}

/// API error type converting domain errors to HTTP responses.
#[derive(Debug)]
pub enum BillingApiError {
    Checkout(BillingError),
    Webhook(WebhookError),
    MissingSignatureHeader,
}

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self::Checkout(err)
    }
}

impl From<WebhookError> for BillingApiError {
    fn from(err: WebhookError) -> Self {
        Self::Webhook(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            BillingApiError::Checkout(err) => {
                let body = ErrorResponse::new(err.to_string()).with_type(err.category());
                (err.status_code(), Json(body)).into_response()
            }
            BillingApiError::Webhook(err) => {
                tracing::warn!(error = %err, "Webhook rejected");
                let body = ErrorResponse::new(format!("Webhook error: {}", err));
                (err.status_code(), Json(body)).into_response()
            }
            BillingApiError::MissingSignatureHeader => {
                let body = ErrorResponse::new("Missing Stripe-Signature header");
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}
