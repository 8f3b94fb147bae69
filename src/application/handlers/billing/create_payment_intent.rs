//! CreatePaymentIntentHandler - checkout-flow command handler.
//!
//! Resolves the plan, reconciles the customer identity, creates the payment
//! intent and issues the ephemeral client credential, in that order. The
//! plan is resolved before any external call so an unresolvable amount is
//! never charged.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::billing::{BillingError, PlanDefinition, CURRENCY};
use crate::domain::foundation::Timestamp;
use crate::ports::{
    CreateCustomerRequest, CreateIntentRequest, CustomerRecord, PaymentMethodKind, PaymentProvider,
};

/// Command to create a payment intent for one checkout attempt.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentCommand {
    /// Requested plan, in wire form.
    pub plan: String,
    /// Customer email for directory reconciliation.
    pub email: String,
    /// Internal user ID (or the "no user" sentinel for anonymous checkout).
    pub user_id: String,
}

/// Everything the mobile client needs to present the payment sheet.
#[derive(Debug, Clone)]
pub struct PaymentSheet {
    /// Payment-intent client secret.
    pub payment_intent_secret: String,
    /// Ephemeral credential secret scoped to the customer.
    pub ephemeral_key_secret: String,
    /// Provider customer ID.
    pub customer_id: String,
    /// Hosted boleto voucher URL, when the intent carries one.
    pub boleto_url: Option<String>,
}

/// Handler for the checkout creation flow.
pub struct CreatePaymentIntentHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    boleto_enabled: bool,
    boleto_expiry_days: u32,
}

impl CreatePaymentIntentHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        boleto_enabled: bool,
        boleto_expiry_days: u32,
    ) -> Self {
        Self {
            payment_provider,
            boleto_enabled,
            boleto_expiry_days,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentIntentCommand,
    ) -> Result<PaymentSheet, BillingError> {
        // 1. Resolve the plan first; fail fast before any external call.
        let plan = crate::domain::billing::resolve_plan(&cmd.plan)?;

        // 2. Find-or-create the customer for this email.
        let customer = self.resolve_customer(&cmd.email, &cmd.user_id).await?;

        // 3. Build the order ID; unique per attempt at human request rates
        //    and carried unchanged into webhook metadata.
        let order_id = format!(
            "premium_{}_{}",
            plan.plan_id,
            Timestamp::now().as_unix_millis()
        );

        // 4. Create the intent with the catalog amount.
        let intent = self
            .payment_provider
            .create_payment_intent(self.intent_request(plan, &customer, order_id, &cmd.user_id))
            .await
            .map_err(BillingError::from_creation_failure)?;

        // 5. Issue the client-side credential for the payment sheet.
        let ephemeral_key = self
            .payment_provider
            .create_ephemeral_key(&customer.id)
            .await
            .map_err(BillingError::from_directory_failure)?;

        tracing::info!(
            intent_id = %intent.id,
            customer_id = %customer.id,
            plan = %plan.plan_id,
            amount = plan.amount_minor_units,
            "Payment intent created"
        );

        Ok(PaymentSheet {
            payment_intent_secret: intent.client_secret,
            ephemeral_key_secret: ephemeral_key.secret,
            customer_id: customer.id,
            boleto_url: intent.boleto_voucher_url,
        })
    }

    /// Finds an existing customer by exact email, or creates one.
    ///
    /// An existing record is returned unchanged: no metadata update, so
    /// provider-side edits are never clobbered. Find-then-create is not
    /// atomic; a concurrent first checkout for the same email may create a
    /// duplicate (accepted limitation, the directory has no upsert).
    async fn resolve_customer(
        &self,
        email: &str,
        user_id: &str,
    ) -> Result<CustomerRecord, BillingError> {
        let existing = self
            .payment_provider
            .find_customer_by_email(email)
            .await
            .map_err(BillingError::from_directory_failure)?;

        if let Some(customer) = existing {
            tracing::debug!(customer_id = %customer.id, "Reusing existing customer");
            return Ok(customer);
        }

        self.payment_provider
            .create_customer(CreateCustomerRequest {
                email: email.to_string(),
                user_id: user_id.to_string(),
                idempotency_key: Some(Uuid::new_v4().to_string()),
            })
            .await
            .map_err(BillingError::from_directory_failure)
    }

    fn intent_request(
        &self,
        plan: &'static PlanDefinition,
        customer: &CustomerRecord,
        order_id: String,
        user_id: &str,
    ) -> CreateIntentRequest {
        let mut payment_methods = vec![PaymentMethodKind::Card];
        if self.boleto_enabled {
            payment_methods.push(PaymentMethodKind::Boleto);
        }

        CreateIntentRequest {
            amount_minor_units: plan.amount_minor_units,
            currency: CURRENCY.to_string(),
            description: plan.description.to_string(),
            customer_id: customer.id.clone(),
            payment_methods,
            boleto_expiry_days: self.boleto_expiry_days,
            order_id,
            plan_id: plan.plan_id,
            user_id: user_id.to_string(),
            idempotency_key: Some(Uuid::new_v4().to_string()),
        }
    }
}
