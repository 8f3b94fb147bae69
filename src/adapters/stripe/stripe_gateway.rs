//! Stripe gateway - `PaymentProvider` implementation over the Stripe HTTP
//! API.
//!
//! # Security
//!
//! - API key held as `secrecy::SecretString`, sent via basic auth
//! - Ephemeral key issuance pinned to a fixed API version; the response
//!   shape of that endpoint changes across provider versions
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key);
//! let gateway = StripeGateway::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{
    CreateCustomerRequest, CreateIntentRequest, CustomerRecord, EphemeralKey, IntentStatus,
    PaymentIntent, PaymentMethodKind, PaymentProvider, ProviderError, ProviderErrorCode,
};

use super::api_types::{
    StripeCustomer, StripeEphemeralKey, StripeErrorEnvelope, StripeList, StripePaymentIntent,
};

/// API version the ephemeral-key call is pinned to.
const PINNED_API_VERSION: &str = "2023-10-16";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API.
    api_base_url: String,
}

impl StripeConfig {
    /// Creates a new Stripe configuration.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Sets a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// `PaymentProvider` implementation talking to Stripe.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    /// Creates a new gateway with the given configuration.
    ///
    /// Construct once at process start and share behind an `Arc`; the
    /// underlying HTTP client pools connections.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn api_key(&self) -> &str {
        self.config.api_key.expose_secret()
    }

    /// Decodes a successful response body.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("invalid provider response: {}", e)))
    }

    /// Converts a non-2xx response into a `ProviderError`.
    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        provider_error_from(status, &body)
    }
}

/// Classifies a non-2xx Stripe response.
fn provider_error_from(status: reqwest::StatusCode, body: &[u8]) -> ProviderError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return ProviderError::authentication(format!("provider returned {}", status));
    }

    match serde_json::from_slice::<StripeErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = match envelope.error.error_type.as_deref() {
                Some("invalid_request_error") | Some("card_error") => {
                    ProviderErrorCode::InvalidRequest
                }
                _ => ProviderErrorCode::ApiError,
            };
            let message = envelope
                .error
                .message
                .unwrap_or_else(|| format!("provider returned {}", status));
            let mut err = ProviderError::new(code, message);
            if let Some(provider_code) = envelope.error.code.or(envelope.error.error_type) {
                err = err.with_provider_code(provider_code);
            }
            err
        }
        Err(_) => ProviderError::api(format!("provider returned {}", status)),
    }
}

/// Maps Stripe's intent status strings onto the lifecycle this service
/// tracks. Creation-time statuses all map to `RequiresPayment`.
fn parse_intent_status(status: &str) -> IntentStatus {
    match status {
        "succeeded" => IntentStatus::Succeeded,
        "processing" => IntentStatus::Processing,
        "canceled" => IntentStatus::Failed,
        _ => IntentStatus::RequiresPayment,
    }
}

/// Builds the form parameters for an intent-creation call.
fn intent_params(request: &CreateIntentRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("amount".to_string(), request.amount_minor_units.to_string()),
        ("currency".to_string(), request.currency.clone()),
        ("description".to_string(), request.description.clone()),
        ("customer".to_string(), request.customer_id.clone()),
        // Boleto settles days after confirmation; automatic_async capture
        // tolerates that.
        ("capture_method".to_string(), "automatic_async".to_string()),
        (
            "payment_method_options[card][request_three_d_secure]".to_string(),
            "automatic".to_string(),
        ),
        (
            "metadata[order_id]".to_string(),
            request.order_id.clone(),
        ),
        (
            "metadata[plan_id]".to_string(),
            request.plan_id.as_str().to_string(),
        ),
        ("metadata[user_id]".to_string(), request.user_id.clone()),
    ];

    for (i, method) in request.payment_methods.iter().enumerate() {
        params.push((
            format!("payment_method_types[{}]", i),
            method.as_str().to_string(),
        ));
    }

    if request.payment_methods.contains(&PaymentMethodKind::Boleto) {
        params.push((
            "payment_method_options[boleto][expires_after_days]".to_string(),
            request.boleto_expiry_days.to_string(),
        ));
    }

    params
}

#[async_trait]
impl PaymentProvider for StripeGateway {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CustomerRecord>, ProviderError> {
        let response = self
            .http_client
            .get(self.url("/v1/customers"))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let list: StripeList<StripeCustomer> = Self::decode(response).await?;
        let customer = list.data.into_iter().find(|c| !c.deleted);

        Ok(customer.map(|c| CustomerRecord {
            id: c.id,
            email: c.email.unwrap_or_else(|| email.to_string()),
            metadata: c.metadata,
        }))
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerRecord, ProviderError> {
        let params = [
            ("email", request.email.clone()),
            ("metadata[user_id]", request.user_id.clone()),
            ("metadata[app]", "premium".to_string()),
        ];

        let mut builder = self
            .http_client
            .post(self.url("/v1/customers"))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .form(&params);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(error = %err, "Stripe create_customer failed");
            return Err(err);
        }

        let customer: StripeCustomer = Self::decode(response).await?;
        Ok(CustomerRecord {
            id: customer.id,
            email: customer.email.unwrap_or(request.email),
            metadata: customer.metadata,
        })
    }

    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, ProviderError> {
        let params = intent_params(&request);

        let mut builder = self
            .http_client
            .post(self.url("/v1/payment_intents"))
            .basic_auth(self.api_key(), Option::<&str>::None)
            .form(&params);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(error = %err, order_id = %request.order_id, "Stripe create_payment_intent failed");
            return Err(err);
        }

        let intent: StripePaymentIntent = Self::decode(response).await?;
        let boleto_voucher_url = intent.boleto_voucher_url();
        let client_secret = intent
            .client_secret
            .ok_or_else(|| ProviderError::parse("intent response missing client_secret"))?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
            amount_minor_units: intent.amount,
            currency: intent.currency,
            status: parse_intent_status(&intent.status),
            boleto_voucher_url,
        })
    }

    async fn create_ephemeral_key(
        &self,
        customer_id: &str,
    ) -> Result<EphemeralKey, ProviderError> {
        let response = self
            .http_client
            .post(self.url("/v1/ephemeral_keys"))
            .basic_auth(self.api_key(), Option::<&str>::None)
            // Mandatory version pin: the secret format of this endpoint is
            // version-sensitive.
            .header("Stripe-Version", PINNED_API_VERSION)
            .form(&[("customer", customer_id)])
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let key: StripeEphemeralKey = Self::decode(response).await?;
        Ok(EphemeralKey {
            secret: key.secret,
            customer_id: customer_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanId;

    fn intent_request(methods: Vec<PaymentMethodKind>) -> CreateIntentRequest {
        CreateIntentRequest {
            amount_minor_units: 1999,
            currency: "brl".to_string(),
            description: "monthly premium".to_string(),
            customer_id: "cus_1".to_string(),
            payment_methods: methods,
            boleto_expiry_days: 3,
            order_id: "premium_monthly_1700000000000".to_string(),
            plan_id: PlanId::Monthly,
            user_id: "u1".to_string(),
            idempotency_key: None,
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn intent_params_carry_amount_currency_and_metadata() {
        let params = intent_params(&intent_request(vec![PaymentMethodKind::Card]));

        assert_eq!(param(&params, "amount"), Some("1999"));
        assert_eq!(param(&params, "currency"), Some("brl"));
        assert_eq!(param(&params, "description"), Some("monthly premium"));
        assert_eq!(param(&params, "customer"), Some("cus_1"));
        assert_eq!(param(&params, "capture_method"), Some("automatic_async"));
        assert_eq!(
            param(&params, "metadata[order_id]"),
            Some("premium_monthly_1700000000000")
        );
        assert_eq!(param(&params, "metadata[plan_id]"), Some("monthly"));
        assert_eq!(param(&params, "metadata[user_id]"), Some("u1"));
    }

    #[test]
    fn intent_params_card_only_omits_boleto_options() {
        let params = intent_params(&intent_request(vec![PaymentMethodKind::Card]));

        assert_eq!(param(&params, "payment_method_types[0]"), Some("card"));
        assert_eq!(param(&params, "payment_method_types[1]"), None);
        assert_eq!(
            param(&params, "payment_method_options[boleto][expires_after_days]"),
            None
        );
    }

    #[test]
    fn intent_params_with_boleto_set_expiry_window() {
        let params = intent_params(&intent_request(vec![
            PaymentMethodKind::Card,
            PaymentMethodKind::Boleto,
        ]));

        assert_eq!(param(&params, "payment_method_types[0]"), Some("card"));
        assert_eq!(param(&params, "payment_method_types[1]"), Some("boleto"));
        assert_eq!(
            param(&params, "payment_method_options[boleto][expires_after_days]"),
            Some("3")
        );
    }

    #[test]
    fn intent_params_request_3ds_automatically() {
        let params = intent_params(&intent_request(vec![PaymentMethodKind::Card]));
        assert_eq!(
            param(&params, "payment_method_options[card][request_three_d_secure]"),
            Some("automatic")
        );
    }

    #[test]
    fn creation_time_statuses_map_to_requires_payment() {
        assert_eq!(
            parse_intent_status("requires_payment_method"),
            IntentStatus::RequiresPayment
        );
        assert_eq!(
            parse_intent_status("requires_confirmation"),
            IntentStatus::RequiresPayment
        );
        assert_eq!(
            parse_intent_status("requires_action"),
            IntentStatus::RequiresPayment
        );
    }

    #[test]
    fn terminal_statuses_map_onto_lifecycle() {
        assert_eq!(parse_intent_status("succeeded"), IntentStatus::Succeeded);
        assert_eq!(parse_intent_status("processing"), IntentStatus::Processing);
        assert_eq!(parse_intent_status("canceled"), IntentStatus::Failed);
    }

    #[test]
    fn unauthorized_maps_to_authentication_error() {
        let err = provider_error_from(reqwest::StatusCode::UNAUTHORIZED, b"");
        assert_eq!(err.code, ProviderErrorCode::AuthenticationError);
        assert!(err.is_transport());
    }

    #[test]
    fn invalid_request_envelope_is_classified_with_provider_code() {
        let body = br#"{
            "error": {
                "message": "No such customer: cus_404",
                "type": "invalid_request_error",
                "code": "resource_missing"
            }
        }"#;

        let err = provider_error_from(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code, ProviderErrorCode::InvalidRequest);
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
        assert!(err.message.contains("cus_404"));
    }

    #[test]
    fn server_error_without_envelope_is_an_api_error() {
        let err = provider_error_from(reqwest::StatusCode::INTERNAL_SERVER_ERROR, b"oops");
        assert_eq!(err.code, ProviderErrorCode::ApiError);
    }

    #[test]
    fn envelope_without_code_falls_back_to_type() {
        let body = br#"{"error": {"message": "busy", "type": "api_error"}}"#;
        let err = provider_error_from(reqwest::StatusCode::SERVICE_UNAVAILABLE, body);
        assert_eq!(err.code, ProviderErrorCode::ApiError);
        assert_eq!(err.provider_code.as_deref(), Some("api_error"));
    }
}
