//! Mock payment provider for testing.
//!
//! Configurable in-memory implementation of `PaymentProvider` for unit and
//! integration tests. Supports:
//! - A pre-seeded customer directory
//! - Per-operation and next-call error injection
//! - Recording of every creation request for assertions

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{
    CreateCustomerRequest, CreateIntentRequest, CustomerRecord, EphemeralKey, IntentStatus,
    PaymentIntent, PaymentProvider, ProviderError,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new().with_customer("cus_1", "a@x.com");
/// mock.fail_create_intent(ProviderError::api("out of order"));
///
/// let intents = mock.recorded_intents();
/// ```
#[derive(Default)]
pub struct MockPaymentProvider {
    /// Customer directory.
    customers: Mutex<Vec<CustomerRecord>>,

    /// Every create_customer request received.
    created_customers: Mutex<Vec<CreateCustomerRequest>>,

    /// Every create_payment_intent request received.
    recorded_intents: Mutex<Vec<CreateIntentRequest>>,

    /// Voucher URL to attach to created intents.
    boleto_url: Mutex<Option<String>>,

    /// Error returned by the next call of any kind.
    fail_next: Mutex<Option<ProviderError>>,

    /// Error returned by the next create_payment_intent call.
    fail_create_intent: Mutex<Option<ProviderError>>,

    /// Error returned by the next create_ephemeral_key call.
    fail_ephemeral_key: Mutex<Option<ProviderError>>,

    /// Total provider calls made.
    calls: AtomicUsize,

    /// Sequence for generated IDs.
    seq: AtomicUsize,
}

impl MockPaymentProvider {
    /// Creates a new mock with an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the directory with an existing customer.
    pub fn with_customer(self, id: impl Into<String>, email: impl Into<String>) -> Self {
        self.customers.lock().unwrap().push(CustomerRecord {
            id: id.into(),
            email: email.into(),
            metadata: HashMap::new(),
        });
        self
    }

    /// Attaches a boleto voucher URL to intents created from now on.
    pub fn set_boleto_url(&self, url: impl Into<String>) {
        *self.boleto_url.lock().unwrap() = Some(url.into());
    }

    /// Fails the next provider call, whichever operation it is.
    pub fn fail_next(&self, err: ProviderError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Fails the next intent creation only.
    pub fn fail_create_intent(&self, err: ProviderError) {
        *self.fail_create_intent.lock().unwrap() = Some(err);
    }

    /// Fails the next ephemeral-key issuance only.
    pub fn fail_ephemeral_key(&self, err: ProviderError) {
        *self.fail_ephemeral_key.lock().unwrap() = Some(err);
    }

    /// Total provider calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every intent-creation request received, in order.
    pub fn recorded_intents(&self) -> Vec<CreateIntentRequest> {
        self.recorded_intents.lock().unwrap().clone()
    }

    /// Every customer-creation request received, in order.
    pub fn created_customers(&self) -> Vec<CreateCustomerRequest> {
        self.created_customers.lock().unwrap().clone()
    }

    fn next_seq(&self) -> usize {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn take_failure(
        &self,
        slot: Option<&Mutex<Option<ProviderError>>>,
    ) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        if let Some(slot) = slot {
            if let Some(err) = slot.lock().unwrap().take() {
                return Err(err);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CustomerRecord>, ProviderError> {
        self.take_failure(None)?;
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerRecord, ProviderError> {
        self.take_failure(None)?;

        let customer = CustomerRecord {
            id: format!("cus_mock_{}", self.next_seq()),
            email: request.email.clone(),
            metadata: HashMap::from([
                ("user_id".to_string(), request.user_id.clone()),
                ("app".to_string(), "premium".to_string()),
            ]),
        };

        self.created_customers.lock().unwrap().push(request);
        self.customers.lock().unwrap().push(customer.clone());
        Ok(customer)
    }

    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, ProviderError> {
        self.take_failure(Some(&self.fail_create_intent))?;

        let seq = self.next_seq();
        let intent = PaymentIntent {
            id: format!("pi_mock_{}", seq),
            client_secret: format!("pi_mock_{}_secret_test", seq),
            amount_minor_units: request.amount_minor_units,
            currency: request.currency.clone(),
            status: IntentStatus::RequiresPayment,
            boleto_voucher_url: self.boleto_url.lock().unwrap().clone(),
        };

        self.recorded_intents.lock().unwrap().push(request);
        Ok(intent)
    }

    async fn create_ephemeral_key(
        &self,
        customer_id: &str,
    ) -> Result<EphemeralKey, ProviderError> {
        self.take_failure(Some(&self.fail_ephemeral_key))?;
        Ok(EphemeralKey {
            secret: format!("ek_test_{}", customer_id),
            customer_id: customer_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanId;
    use crate::ports::PaymentMethodKind;

    fn intent_request() -> CreateIntentRequest {
        CreateIntentRequest {
            amount_minor_units: 1999,
            currency: "brl".to_string(),
            description: "monthly premium".to_string(),
            customer_id: "cus_1".to_string(),
            payment_methods: vec![PaymentMethodKind::Card],
            boleto_expiry_days: 3,
            order_id: "premium_monthly_1".to_string(),
            plan_id: PlanId::Monthly,
            user_id: "u1".to_string(),
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn directory_lookup_finds_seeded_customer() {
        let mock = MockPaymentProvider::new().with_customer("cus_1", "a@x.com");

        let found = mock.find_customer_by_email("a@x.com").await.unwrap();
        assert_eq!(found.unwrap().id, "cus_1");

        let missing = mock.find_customer_by_email("b@x.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn created_customers_become_findable() {
        let mock = MockPaymentProvider::new();

        let created = mock
            .create_customer(CreateCustomerRequest {
                email: "a@x.com".to_string(),
                user_id: "u1".to_string(),
                idempotency_key: None,
            })
            .await
            .unwrap();

        let found = mock.find_customer_by_email("a@x.com").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn intents_are_recorded_with_their_request() {
        let mock = MockPaymentProvider::new();

        let intent = mock.create_payment_intent(intent_request()).await.unwrap();

        assert!(intent.client_secret.contains(&intent.id));
        let recorded = mock.recorded_intents();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].amount_minor_units, 1999);
    }

    #[tokio::test]
    async fn fail_next_hits_whatever_comes_first() {
        let mock = MockPaymentProvider::new();
        mock.fail_next(ProviderError::network("down"));

        assert!(mock.find_customer_by_email("a@x.com").await.is_err());
        // Consumed; the next call succeeds.
        assert!(mock.find_customer_by_email("a@x.com").await.is_ok());
    }

    #[tokio::test]
    async fn targeted_failure_spares_other_operations() {
        let mock = MockPaymentProvider::new();
        mock.fail_create_intent(ProviderError::api("no"));

        assert!(mock.find_customer_by_email("a@x.com").await.is_ok());
        assert!(mock.create_payment_intent(intent_request()).await.is_err());
        assert!(mock.create_payment_intent(intent_request()).await.is_ok());
    }

    #[tokio::test]
    async fn ephemeral_key_is_scoped_to_customer() {
        let mock = MockPaymentProvider::new();

        let key = mock.create_ephemeral_key("cus_7").await.unwrap();
        assert_eq!(key.customer_id, "cus_7");
        assert!(key.secret.contains("cus_7"));
    }
}
