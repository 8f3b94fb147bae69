//! HTTP surface for the billing module.

mod dto;
mod handlers;
mod routes;

pub use dto::{CreateIntentRequestDto, ErrorResponse, PaymentSheetResponse, WebhookAckResponse};
pub use handlers::{BillingApiError, BillingAppState};
pub use routes::{api_router, checkout_routes, webhook_routes};
