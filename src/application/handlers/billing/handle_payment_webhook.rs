//! HandlePaymentWebhookHandler - webhook-flow command handler.
//!
//! Verifies the event signature over the raw body, then applies succeeded
//! payments to the user's entitlement record. Once a payload is
//! authenticated the event is always acknowledged: post-verification
//! failures are logged, never returned, so the provider does not redeliver
//! an event we can never use.

use std::sync::Arc;

use crate::domain::billing::{
    EntitlementPatch, ProviderEvent, ProviderEventType, SucceededPayment, WebhookError,
    WebhookVerifier,
};
use crate::domain::foundation::Timestamp;
use crate::ports::EntitlementStore;

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, byte-exact as delivered.
    pub payload: Vec<u8>,
    /// Signature header value.
    pub signature: String,
}

/// Result of processing an authenticated webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Entitlement granted or refreshed.
    EntitlementGranted {
        user_id: String,
        plan_id: String,
        payment_id: String,
    },
    /// Event authenticated but unusable (missing metadata, unknown plan,
    /// uninteresting type); logged and acknowledged.
    Ignored,
    /// Entitlement write failed; acknowledged anyway so the provider does
    /// not redeliver (the grant is recoverable only from logs).
    Acknowledged,
}

/// Handler for provider webhook deliveries.
pub struct HandlePaymentWebhookHandler {
    verifier: WebhookVerifier,
    entitlement_store: Arc<dyn EntitlementStore>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(verifier: WebhookVerifier, entitlement_store: Arc<dyn EntitlementStore>) -> Self {
        Self {
            verifier,
            entitlement_store,
        }
    }

    /// Processes one delivery.
    ///
    /// # Errors
    ///
    /// Returns an error only when signature verification fails; the payload
    /// must not be processed and the endpoint responds with a client error.
    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &cmd.signature)?;

        match event.parsed_type() {
            ProviderEventType::PaymentIntentSucceeded => {
                Ok(self.apply_succeeded_payment(&event).await)
            }
            ProviderEventType::PaymentIntentFailed => {
                tracing::info!(event_id = %event.id, "Payment failed; no entitlement change");
                Ok(WebhookOutcome::Ignored)
            }
            ProviderEventType::Unknown => {
                tracing::debug!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Ignoring unhandled event type"
                );
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Applies a succeeded payment to the user's entitlement record.
    ///
    /// Never fails: the event was authenticated, so every outcome here is
    /// an acknowledgment. Malformed metadata must not grant access and must
    /// not trigger redelivery either.
    async fn apply_succeeded_payment(&self, event: &ProviderEvent) -> WebhookOutcome {
        let payment = match SucceededPayment::try_from_event(event) {
            Ok(payment) => payment,
            Err(err) => {
                tracing::warn!(
                    event_id = %event.id,
                    error = %err,
                    "Succeeded payment unusable for entitlement"
                );
                return WebhookOutcome::Ignored;
            }
        };

        tracing::info!(
            payment_id = %payment.payment_id,
            amount = payment.amount_minor_units,
            user_id = %payment.user_id,
            plan = %payment.plan.plan_id,
            order_id = payment.order_id.as_deref().unwrap_or("-"),
            "Payment succeeded"
        );

        let now = Timestamp::now();
        let patch = EntitlementPatch::for_succeeded_payment(payment.plan, &payment.payment_id, now);

        match self.entitlement_store.merge(&payment.user_id, &patch).await {
            Ok(()) => WebhookOutcome::EntitlementGranted {
                user_id: payment.user_id.to_string(),
                plan_id: payment.plan.plan_id.to_string(),
                payment_id: payment.payment_id,
            },
            Err(err) => {
                // Deliberate trade-off: the provider already has its ack,
                // so a store outage loses the grant rather than causing a
                // redelivery storm. The error log is the recovery hook.
                tracing::error!(
                    payment_id = %payment.payment_id,
                    user_id = %payment.user_id,
                    error = %err,
                    "Entitlement write failed; event acknowledged anyway"
                );
                WebhookOutcome::Acknowledged
            }
        }
    }
}
