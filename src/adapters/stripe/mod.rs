//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe HTTP API:
//! customer directory lookup and creation, payment-intent creation, and
//! ephemeral key issuance.

mod api_types;
mod mock_payment_provider;
mod stripe_gateway;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_gateway::{StripeConfig, StripeGateway};
