//! Provider webhook event types.
//!
//! Structures for parsing verified webhook payloads. Only the fields this
//! service processes are captured; the rest of the provider's event schema
//! is ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::WebhookError;
use super::plan::{PlanDefinition, PlanId};
use crate::domain::foundation::UserId;

/// Placeholder the client sends when no signed-in user started the
/// checkout. Events carrying it must never grant an entitlement.
pub const NO_USER_SENTINEL: &str = "no_user";

/// Provider webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: ProviderEventData,

    /// Whether this is a live mode event (vs test mode).
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEventData {
    /// The object that triggered the event (polymorphic by event type).
    pub object: serde_json::Value,
}

/// Event types this service distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventType {
    /// A payment intent was fully collected.
    PaymentIntentSucceeded,
    /// A payment attempt on an intent failed.
    PaymentIntentFailed,
    /// Anything else; acknowledged without processing.
    Unknown,
}

impl ProviderEventType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            _ => Self::Unknown,
        }
    }
}

impl ProviderEvent {
    /// Parses the event type into a known variant.
    pub fn parsed_type(&self) -> ProviderEventType {
        ProviderEventType::from_str(&self.event_type)
    }

    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }
}

/// Payment-intent fields carried in a succeeded event.
#[derive(Debug, Clone, Deserialize)]
struct PaymentIntentObject {
    id: String,
    amount: u32,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// A verified, well-formed "payment succeeded" notification, ready for the
/// entitlement update.
#[derive(Debug, Clone)]
pub struct SucceededPayment {
    /// Provider payment-intent ID.
    pub payment_id: String,

    /// Amount collected, in minor currency units.
    pub amount_minor_units: u32,

    /// User the checkout was started for.
    pub user_id: UserId,

    /// Plan named in the intent metadata, resolved against the catalog.
    pub plan: &'static PlanDefinition,

    /// Order identifier from intent creation, when present.
    pub order_id: Option<String>,
}

impl SucceededPayment {
    /// Extracts and validates the entitlement-relevant fields.
    ///
    /// # Errors
    ///
    /// - `ParseError` - the data object is not a payment intent
    /// - `MissingMetadata` - `user_id` absent or the "no user" sentinel,
    ///   or `plan_id` absent
    /// - `UnknownPlan` - `plan_id` present but not in the catalog
    pub fn try_from_event(event: &ProviderEvent) -> Result<Self, WebhookError> {
        let intent: PaymentIntentObject = serde_json::from_value(event.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("not a payment intent: {}", e)))?;

        let user_id = match intent.metadata.get("user_id") {
            None => return Err(WebhookError::MissingMetadata("user_id")),
            Some(v) if v == NO_USER_SENTINEL => {
                return Err(WebhookError::MissingMetadata("user_id"))
            }
            Some(v) => {
                UserId::new(v.clone()).map_err(|_| WebhookError::MissingMetadata("user_id"))?
            }
        };

        let plan_str = intent
            .metadata
            .get("plan_id")
            .ok_or(WebhookError::MissingMetadata("plan_id"))?;
        let plan_id =
            PlanId::parse(plan_str).ok_or_else(|| WebhookError::UnknownPlan(plan_str.clone()))?;

        Ok(Self {
            payment_id: intent.id,
            amount_minor_units: intent.amount,
            user_id,
            plan: PlanDefinition::for_plan(plan_id),
            order_id: intent.metadata.get("order_id").cloned(),
        })
    }
}

/// Builder for creating test ProviderEvent instances.
#[cfg(test)]
pub struct ProviderEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for ProviderEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "payment_intent.succeeded".to_string(),
            created: 1_704_067_200,
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl ProviderEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = created;
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> ProviderEvent {
        ProviderEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: ProviderEventData {
                object: self.object,
            },
            livemode: self.livemode,
        }
    }
}
