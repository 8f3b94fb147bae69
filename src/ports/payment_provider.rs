//! Payment provider port.
//!
//! Contract for the card-processing provider (customer directory, payment
//! intents, ephemeral client credentials). A single authenticated
//! implementation is constructed at process start and injected into every
//! handler; the provider owns all payment-intent state transitions, this
//! system only creates intents and reads status via webhooks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::billing::PlanId;

/// Port for the payment provider integration.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Looks up at most one customer with this exact email in the
    /// provider's customer directory.
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CustomerRecord>, ProviderError>;

    /// Creates a customer in the provider directory.
    ///
    /// Find-then-create is not atomic; concurrent first-time checkouts for
    /// the same email may create duplicates (accepted limitation).
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerRecord, ProviderError>;

    /// Creates a payment intent for one checkout attempt.
    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, ProviderError>;

    /// Issues a short-lived client credential scoped to a customer.
    ///
    /// Implementations must pin the provider API version for this call;
    /// the response shape is version-sensitive.
    async fn create_ephemeral_key(&self, customer_id: &str)
        -> Result<EphemeralKey, ProviderError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Customer email address.
    pub email: String,

    /// Internal user ID, stored as provider metadata.
    pub user_id: String,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// Customer in the provider directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Provider's customer ID.
    pub id: String,

    /// Customer email.
    pub email: String,

    /// Provider-side metadata. Owned by the provider; never updated here.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Payment methods offered on an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodKind {
    /// Card payment, settles synchronously.
    Card,
    /// Boleto voucher, settles asynchronously (days later).
    Boleto,
}

impl PaymentMethodKind {
    /// Wire name used by the provider API.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodKind::Card => "card",
            PaymentMethodKind::Boleto => "boleto",
        }
    }
}

/// Request to create a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    /// Charge amount in minor currency units. Always the catalog amount
    /// for `plan_id`; verifiable end-to-end for audit.
    pub amount_minor_units: u32,

    /// Charge currency.
    pub currency: String,

    /// Statement/dashboard description from the plan catalog.
    pub description: String,

    /// Provider customer the intent is billed to.
    pub customer_id: String,

    /// Payment methods the client may complete with.
    pub payment_methods: Vec<PaymentMethodKind>,

    /// Expiry window, in days, for the boleto voucher (when offered).
    pub boleto_expiry_days: u32,

    /// Order identifier, unique per creation attempt. Carried unchanged
    /// into webhook metadata as the join key between creation and
    /// confirmation.
    pub order_id: String,

    /// Plan the amount was resolved from.
    pub plan_id: PlanId,

    /// Internal user the checkout belongs to.
    pub user_id: String,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// Payment intent as created at the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider's intent ID.
    pub id: String,

    /// Client-side secret the app uses to drive the payment form.
    pub client_secret: String,

    /// Charge amount in minor currency units.
    pub amount_minor_units: u32,

    /// Charge currency.
    pub currency: String,

    /// Intent status at creation time. Owned and transitioned exclusively
    /// by the provider.
    pub status: IntentStatus,

    /// Hosted voucher URL, present when the intent already carries a
    /// boleto next-action.
    pub boleto_voucher_url: Option<String>,
}

/// Payment intent lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Waiting for the client to supply or confirm a payment method.
    RequiresPayment,

    /// Payment submitted, settlement pending.
    Processing,

    /// Payment collected.
    Succeeded,

    /// Payment failed or was canceled.
    Failed,
}

/// Short-lived client credential scoped to one customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeralKey {
    /// The secret handed to the client. Never persisted server-side.
    pub secret: String,

    /// Customer the credential is scoped to.
    pub customer_id: String,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    /// Error code for categorization.
    pub code: ProviderErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's own error code (if reported).
    pub provider_code: Option<String>,
}

impl ProviderError {
    /// Creates a new provider error.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    /// Attaches the provider's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationError, message)
    }

    /// Creates an API error from the provider's error envelope.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ApiError, message)
    }

    /// Creates a response-parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ParseError, message)
    }

    /// True when the failure happened in transport or authentication,
    /// before the provider could evaluate the request.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.code,
            ProviderErrorCode::NetworkError | ProviderErrorCode::AuthenticationError
        )
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Provider error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Provider reported the request as invalid.
    InvalidRequest,

    /// Provider-side error (outage, internal failure).
    ApiError,

    /// Provider response could not be parsed.
    ParseError,
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderErrorCode::NetworkError => "network_error",
            ProviderErrorCode::AuthenticationError => "authentication_error",
            ProviderErrorCode::InvalidRequest => "invalid_request_error",
            ProviderErrorCode::ApiError => "api_error",
            ProviderErrorCode::ParseError => "parse_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn PaymentProvider) {}
    }

    #[test]
    fn transport_classification() {
        assert!(ProviderError::network("timeout").is_transport());
        assert!(ProviderError::authentication("bad key").is_transport());

        assert!(!ProviderError::api("internal error").is_transport());
        assert!(
            !ProviderError::new(ProviderErrorCode::InvalidRequest, "bad email").is_transport()
        );
        assert!(!ProviderError::parse("truncated body").is_transport());
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = ProviderError::network("connection refused");
        assert_eq!(err.to_string(), "network_error: connection refused");
    }

    #[test]
    fn provider_code_is_attached() {
        let err = ProviderError::new(ProviderErrorCode::InvalidRequest, "amount too small")
            .with_provider_code("amount_too_small");
        assert_eq!(err.provider_code.as_deref(), Some("amount_too_small"));
    }

    #[test]
    fn payment_method_wire_names() {
        assert_eq!(PaymentMethodKind::Card.as_str(), "card");
        assert_eq!(PaymentMethodKind::Boleto.as_str(), "boleto");
    }

    #[test]
    fn intent_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&IntentStatus::RequiresPayment).unwrap(),
            "\"requires_payment\""
        );
    }
}
