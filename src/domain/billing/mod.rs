//! Billing bounded context.
//!
//! Owns the plan catalog, the premium entitlement record, provider webhook
//! event types and their signature verification, and the billing error
//! taxonomy.

mod entitlement;
mod errors;
mod plan;
mod provider_event;
mod webhook_verifier;

pub use entitlement::{EntitlementPatch, UserEntitlement};
pub use errors::{BillingError, WebhookError};
pub use plan::{resolve_plan, PlanDefinition, PlanId, CURRENCY};
pub use provider_event::{ProviderEvent, ProviderEventType, SucceededPayment, NO_USER_SENTINEL};
pub use webhook_verifier::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use provider_event::ProviderEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
