//! Premium entitlement record and its merge patch.
//!
//! The entitlement lives on the user's persisted record. This service only
//! ever grants or refreshes it; expiry is advisory data enforced by another
//! reader, so there is no demotion transition here.

use serde::{Deserialize, Serialize};

use super::plan::{PlanDefinition, PlanId};
use crate::domain::foundation::{Timestamp, UserId};

/// Entitlement fields of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntitlement {
    /// User the record belongs to.
    pub user_id: UserId,

    /// Whether the user currently has paid access.
    pub is_premium: bool,

    /// When the current entitlement window ends.
    pub premium_expiry_date: Timestamp,

    /// Plan the entitlement was granted under.
    pub plan_type: PlanId,

    /// Provider payment-intent ID of the payment that last granted or
    /// refreshed the entitlement.
    pub last_payment_id: String,

    /// When the entitlement fields were last written.
    pub updated_at: Timestamp,
}

/// Partial update applied to a user record on a successful payment.
///
/// Exactly these fields are written; the merge leaves every other field on
/// the record untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementPatch {
    pub is_premium: bool,
    pub premium_expiry_date: Timestamp,
    pub plan_type: PlanId,
    pub last_payment_id: String,
    pub updated_at: Timestamp,
}

impl EntitlementPatch {
    /// Builds the patch for a succeeded payment on the given plan.
    ///
    /// Expiry is computed from `now`, not from any prior expiry: duplicate
    /// events reset rather than extend the window.
    pub fn for_succeeded_payment(
        plan: &PlanDefinition,
        payment_id: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            is_premium: true,
            premium_expiry_date: now.add_days(i64::from(plan.duration_days)),
            plan_type: plan.plan_id,
            last_payment_id: payment_id.into(),
            updated_at: now,
        }
    }

    /// Applies the patch to an existing record (or creates one), the way
    /// the store's merge-write does.
    pub fn apply_to(&self, user_id: &UserId, existing: Option<UserEntitlement>) -> UserEntitlement {
        let user_id = existing
            .map(|e| e.user_id)
            .unwrap_or_else(|| user_id.clone());
        UserEntitlement {
            user_id,
            is_premium: self.is_premium,
            premium_expiry_date: self.premium_expiry_date,
            plan_type: self.plan_type,
            last_payment_id: self.last_payment_id.clone(),
            updated_at: self.updated_at,
        }
    }
}
