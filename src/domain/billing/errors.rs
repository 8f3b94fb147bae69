//! Billing error taxonomy.
//!
//! Checkout-flow errors (`BillingError`) are surfaced to the caller with
//! enough detail to distinguish a fixable client error from a provider
//! outage. Webhook-flow errors (`WebhookError`) are only surfaced before
//! signature verification succeeds; afterwards they are logged and the
//! event is acknowledged so the provider does not redeliver forever.

use axum::http::StatusCode;
use thiserror::Error;

use crate::ports::ProviderError;

/// Errors in the checkout (payment-intent creation) flow.
#[derive(Debug, Clone, Error)]
pub enum BillingError {
    /// Requested plan is not in the catalog.
    #[error("Unrecognized plan: {0}")]
    InvalidPlan(String),

    /// The provider rejected the request; its message is user-visible.
    #[error("Payment provider rejected the request: {message}")]
    ProviderRejected {
        /// Provider-reported error message, passed through to the caller.
        message: String,
        /// Provider-reported error category (e.g. "invalid_request_error").
        category: String,
    },

    /// Transport or authentication failure talking to the provider.
    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl BillingError {
    /// Maps the error to the HTTP status the checkout endpoint returns.
    ///
    /// `InvalidPlan` and `ProviderRejected` are client-correctable (400);
    /// `ProviderUnavailable` is a server-side fault (500).
    pub fn status_code(&self) -> StatusCode {
        match self {
            BillingError::InvalidPlan(_) | BillingError::ProviderRejected { .. } => {
                StatusCode::BAD_REQUEST
            }
            BillingError::ProviderUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error category for the response body.
    pub fn category(&self) -> &str {
        match self {
            BillingError::InvalidPlan(_) => "invalid_plan",
            BillingError::ProviderRejected { category, .. } => category,
            BillingError::ProviderUnavailable(_) => "provider_unavailable",
        }
    }

    /// Classifies a provider error from an identity/credential call.
    ///
    /// Transport and auth failures become `ProviderUnavailable`; anything
    /// the provider itself reported becomes `ProviderRejected`.
    pub fn from_directory_failure(err: ProviderError) -> Self {
        if err.is_transport() {
            BillingError::ProviderUnavailable(err.message)
        } else {
            BillingError::ProviderRejected {
                category: err.code.to_string(),
                message: err.message,
            }
        }
    }

    /// Classifies a provider error from intent creation.
    ///
    /// Creation failures are surfaced as `ProviderRejected` regardless of
    /// cause: the caller sees the provider's reported message and category.
    pub fn from_creation_failure(err: ProviderError) -> Self {
        BillingError::ProviderRejected {
            category: err
                .provider_code
                .clone()
                .unwrap_or_else(|| err.code.to_string()),
            message: err.message,
        }
    }
}

/// Errors in the webhook flow.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    /// Signature did not match the recomputed one over the raw body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event timestamp is outside the acceptable delivery window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock-skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Signature header or JSON payload could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata field missing (or the "no user" sentinel).
    ///
    /// The event is unusable for entitlement purposes; it is logged and
    /// acknowledged, never surfaced to the provider as an error.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Metadata carried a plan identifier not in the catalog.
    #[error("Unrecognized plan in metadata: {0}")]
    UnknownPlan(String),
}

impl WebhookError {
    /// True for failures that occur before the payload is trusted.
    ///
    /// These are the only webhook errors surfaced as an HTTP error; the
    /// payload must not be processed.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
                | WebhookError::ParseError(_)
        )
    }

    /// Maps the error to the HTTP status the webhook endpoint returns.
    ///
    /// Verification failures are client errors (400) so the provider stops
    /// retrying a payload that can never verify. Post-verification errors
    /// never reach this mapping; they are acknowledged with 200.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
