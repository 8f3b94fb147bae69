//! Ports - trait contracts for external collaborators.
//!
//! The payment provider and the entitlement store are both external
//! systems; the application layer depends only on these traits so the core
//! stays testable with in-memory fakes.

mod entitlement_store;
mod payment_provider;

pub use entitlement_store::{EntitlementStore, StoreError};
pub use payment_provider::{
    CreateCustomerRequest, CreateIntentRequest, CustomerRecord, EphemeralKey, IntentStatus,
    PaymentIntent, PaymentMethodKind, PaymentProvider, ProviderError, ProviderErrorCode,
};
