//! Payment provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// Whether boleto is offered alongside card
    #[serde(default = "default_boleto_enabled")]
    pub boleto_enabled: bool,

    /// Boleto voucher expiry window, in days
    #[serde(default = "default_boleto_expiry_days")]
    pub boleto_expiry_days: u32,

    /// Email used when an anonymous client checks out without one
    #[serde(default = "default_fallback_email")]
    pub fallback_checkout_email: String,
}

fn default_boleto_enabled() -> bool {
    true
}

fn default_boleto_expiry_days() -> u32 {
    3
}

fn default_fallback_email() -> String {
    "guest@premia.app".to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            boleto_enabled: default_boleto_enabled(),
            boleto_expiry_days: default_boleto_expiry_days(),
            fallback_checkout_email: default_fallback_email(),
        }
    }
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }

        // Verify key prefixes so a publishable key or a copy-paste mistake
        // fails at startup instead of at the first provider call.
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if self.boleto_expiry_days == 0 || self.boleto_expiry_days > 60 {
            return Err(ValidationError::InvalidBoletoExpiry);
        }

        Ok(())
    }
}
