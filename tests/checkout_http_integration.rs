//! Integration tests for the checkout HTTP endpoint.
//!
//! Drives the real axum router with a mock payment provider:
//! 1. Request DTOs deserialize and defaults apply
//! 2. The payment sheet response carries the provider secrets
//! 3. Errors map to the documented statuses

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use premia::adapters::http::billing::{api_router, BillingAppState};
use premia::adapters::stripe::MockPaymentProvider;
use premia::domain::billing::{EntitlementPatch, UserEntitlement, WebhookVerifier};
use premia::domain::foundation::UserId;
use premia::ports::{EntitlementStore, ProviderError, StoreError};

use async_trait::async_trait;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Store stub; the checkout flow never touches the store.
struct NullEntitlementStore;

#[async_trait]
impl EntitlementStore for NullEntitlementStore {
    async fn find(&self, _user_id: &UserId) -> Result<Option<UserEntitlement>, StoreError> {
        Ok(None)
    }

    async fn merge(&self, _user_id: &UserId, _patch: &EntitlementPatch) -> Result<(), StoreError> {
        panic!("checkout flow must not write the store");
    }
}

fn test_app(provider: Arc<MockPaymentProvider>) -> axum::Router {
    api_router(BillingAppState {
        payment_provider: provider,
        entitlement_store: Arc::new(NullEntitlementStore),
        webhook_verifier: WebhookVerifier::new(SecretString::new(
            "whsec_checkout_test".to_string(),
        )),
        fallback_checkout_email: "guest@premia.app".to_string(),
        boleto_enabled: true,
        boleto_expiry_days: 3,
    })
}

fn checkout_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/checkout/intent")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Scenario A: monthly checkout
// =============================================================================

#[tokio::test]
async fn monthly_checkout_returns_payment_sheet() {
    let provider = Arc::new(MockPaymentProvider::new());
    let app = test_app(provider.clone());

    let response = app
        .oneshot(checkout_request(json!({
            "planId": "monthly",
            "email": "a@x.com",
            "userId": "u1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paymentIntent"].as_str().unwrap().contains("secret"));
    assert!(body["ephemeralKey"].as_str().is_some());
    assert!(body["customer"].as_str().unwrap().starts_with("cus_"));
    assert!(body.get("boletoUrl").is_none());

    // The submitted amount is the monthly catalog amount.
    let intents = provider.recorded_intents();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].amount_minor_units, 1999);
    assert_eq!(intents[0].description, "monthly premium");
    assert_eq!(intents[0].user_id, "u1");
    assert!(intents[0].order_id.starts_with("premium_monthly_"));
}

#[tokio::test]
async fn annual_checkout_submits_annual_amount() {
    let provider = Arc::new(MockPaymentProvider::new());
    let app = test_app(provider.clone());

    let response = app
        .oneshot(checkout_request(json!({
            "planId": "annual",
            "email": "a@x.com",
            "userId": "u1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(provider.recorded_intents()[0].amount_minor_units, 14999);
}

#[tokio::test]
async fn boleto_voucher_url_is_included_when_present() {
    let provider = Arc::new(MockPaymentProvider::new());
    provider.set_boleto_url("https://provider.example/voucher/1");
    let app = test_app(provider);

    let response = app
        .oneshot(checkout_request(json!({
            "planId": "monthly",
            "email": "a@x.com",
            "userId": "u1"
        })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["boletoUrl"], "https://provider.example/voucher/1");
}

// =============================================================================
// Identity reconciliation
// =============================================================================

#[tokio::test]
async fn existing_customer_is_reused() {
    let provider = Arc::new(MockPaymentProvider::new().with_customer("cus_known", "a@x.com"));
    let app = test_app(provider.clone());

    let response = app
        .oneshot(checkout_request(json!({
            "planId": "monthly",
            "email": "a@x.com",
            "userId": "u1"
        })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["customer"], "cus_known");
    assert!(provider.created_customers().is_empty());
}

#[tokio::test]
async fn missing_email_and_user_fall_back_to_defaults() {
    let provider = Arc::new(MockPaymentProvider::new());
    let app = test_app(provider.clone());

    let response = app
        .oneshot(checkout_request(json!({"planId": "monthly"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let created = provider.created_customers();
    assert_eq!(created[0].email, "guest@premia.app");
    assert_eq!(provider.recorded_intents()[0].user_id, "no_user");
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn unknown_plan_returns_400_before_any_provider_call() {
    let provider = Arc::new(MockPaymentProvider::new());
    let app = test_app(provider.clone());

    let response = app
        .oneshot(checkout_request(json!({
            "planId": "lifetime",
            "email": "a@x.com",
            "userId": "u1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("lifetime"));
    assert_eq!(body["type"], "invalid_plan");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn provider_rejection_passes_message_through_as_400() {
    let provider = Arc::new(MockPaymentProvider::new());
    provider.fail_create_intent(
        ProviderError::api("Amount must be at least R$0.50").with_provider_code("amount_too_small"),
    );
    let app = test_app(provider);

    let response = app
        .oneshot(checkout_request(json!({
            "planId": "monthly",
            "email": "a@x.com",
            "userId": "u1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("R$0.50"));
    assert_eq!(body["type"], "amount_too_small");
}

#[tokio::test]
async fn provider_outage_returns_500() {
    let provider = Arc::new(MockPaymentProvider::new());
    provider.fail_next(ProviderError::network("connection refused"));
    let app = test_app(provider);

    let response = app
        .oneshot(checkout_request(json!({
            "planId": "monthly",
            "email": "a@x.com",
            "userId": "u1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn non_post_method_returns_405() {
    let app = test_app(Arc::new(MockPaymentProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/checkout/intent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
