//! Stripe API response types.
//!
//! Only the fields this adapter reads are captured; the rest of Stripe's
//! response schema is ignored.

use serde::Deserialize;
use std::collections::HashMap;

/// Paginated list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

/// Customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Payment intent object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub amount: u32,
    pub currency: String,
    pub status: String,
    pub next_action: Option<StripeNextAction>,
}

/// Next action the client must take to complete an intent.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeNextAction {
    pub boleto_display_details: Option<StripeBoletoDisplayDetails>,
}

/// Boleto voucher details inside a next action.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeBoletoDisplayDetails {
    pub hosted_voucher_url: Option<String>,
}

impl StripePaymentIntent {
    /// Extracts the hosted voucher URL when the intent already carries a
    /// boleto next-action.
    pub fn boleto_voucher_url(&self) -> Option<String> {
        self.next_action
            .as_ref()
            .and_then(|a| a.boleto_display_details.as_ref())
            .and_then(|d| d.hosted_voucher_url.clone())
    }
}

/// Ephemeral key object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEphemeralKey {
    pub secret: String,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

/// Error body inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
}
