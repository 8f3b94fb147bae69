//! Request and response DTOs for the billing endpoints.
//!
//! Field names are camelCase; they are the wire contract with the mobile
//! client and must not drift.

use serde::{Deserialize, Serialize};

use crate::domain::billing::NO_USER_SENTINEL;

/// Body of `POST /api/checkout/intent`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequestDto {
    /// Requested plan ("monthly" or "annual").
    #[serde(rename = "planId")]
    pub plan_id: String,

    /// Customer email; falls back to the configured checkout email when
    /// the client has none.
    pub email: Option<String>,

    /// Signed-in user, when there is one. The sentinel keeps anonymous
    /// checkouts from ever granting an entitlement.
    #[serde(rename = "userId", default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    NO_USER_SENTINEL.to_string()
}

/// Successful response of `POST /api/checkout/intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSheetResponse {
    /// Payment-intent client secret.
    #[serde(rename = "paymentIntent")]
    pub payment_intent: String,

    /// Ephemeral key secret.
    #[serde(rename = "ephemeralKey")]
    pub ephemeral_key: String,

    /// Provider customer ID.
    pub customer: String,

    /// Hosted boleto voucher URL, when the intent carries one.
    #[serde(rename = "boletoUrl", skip_serializing_if = "Option::is_none")]
    pub boleto_url: Option<String>,
}

/// Acknowledgment body for the webhook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,

    /// Machine-readable category, when one applies.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_type: None,
        }
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}
