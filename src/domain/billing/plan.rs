//! Premium plan catalog.
//!
//! Static mapping from a plan identifier to its charge amount, description
//! and entitlement duration. Defined once at process start; every amount
//! submitted to the payment provider must come from here.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::BillingError;

/// Currency for all charges, in the app's target market.
pub const CURRENCY: &str = "brl";

/// Premium subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    /// Monthly premium subscription.
    Monthly,
    /// Annual premium subscription.
    Annual,
}

impl PlanId {
    /// Parses a plan identifier from its wire form.
    ///
    /// Recognizes exactly the lowercase identifiers the mobile client and
    /// the provider metadata carry; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(PlanId::Monthly),
            "annual" => Some(PlanId::Annual),
            _ => None,
        }
    }

    /// Returns the wire identifier for this plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Monthly => "monthly",
            PlanId::Annual => "annual",
        }
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the plan catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanDefinition {
    /// Plan this definition belongs to.
    pub plan_id: PlanId,

    /// Charge amount in minor currency units (centavos).
    pub amount_minor_units: u32,

    /// Human-readable description, shown on the provider dashboard and
    /// payment statements.
    pub description: &'static str,

    /// Entitlement duration granted per successful payment.
    pub duration_days: u32,
}

/// The full catalog, built once at first use. Immutable for the process
/// lifetime.
static CATALOG: Lazy<HashMap<PlanId, PlanDefinition>> = Lazy::new(|| {
    HashMap::from([
        (
            PlanId::Monthly,
            PlanDefinition {
                plan_id: PlanId::Monthly,
                amount_minor_units: 1999,
                description: "monthly premium",
                duration_days: 30,
            },
        ),
        (
            PlanId::Annual,
            PlanDefinition {
                plan_id: PlanId::Annual,
                amount_minor_units: 14999,
                description: "annual premium",
                duration_days: 365,
            },
        ),
    ])
});

impl PlanDefinition {
    /// Looks up the catalog entry for a plan.
    pub fn for_plan(plan_id: PlanId) -> &'static PlanDefinition {
        CATALOG
            .get(&plan_id)
            .expect("catalog covers every PlanId variant")
    }
}

/// Resolves a wire-form plan identifier to its catalog entry.
///
/// # Errors
///
/// Returns `BillingError::InvalidPlan` for unrecognized identifiers. This is
/// a hard validation error, not a default, and must be raised before any
/// external call.
pub fn resolve_plan(plan: &str) -> Result<&'static PlanDefinition, BillingError> {
    PlanId::parse(plan)
        .map(PlanDefinition::for_plan)
        .ok_or_else(|| BillingError::InvalidPlan(plan.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_plan_has_documented_amount_and_duration() {
        let plan = resolve_plan("monthly").unwrap();
        assert_eq!(plan.plan_id, PlanId::Monthly);
        assert_eq!(plan.amount_minor_units, 1999);
        assert_eq!(plan.description, "monthly premium");
        assert_eq!(plan.duration_days, 30);
    }

    #[test]
    fn annual_plan_has_documented_amount_and_duration() {
        let plan = resolve_plan("annual").unwrap();
        assert_eq!(plan.plan_id, PlanId::Annual);
        assert_eq!(plan.amount_minor_units, 14999);
        assert_eq!(plan.description, "annual premium");
        assert_eq!(plan.duration_days, 365);
    }

    #[test]
    fn unknown_plan_fails_with_invalid_plan() {
        let result = resolve_plan("lifetime");
        assert!(matches!(result, Err(BillingError::InvalidPlan(ref p)) if p == "lifetime"));
    }

    #[test]
    fn empty_plan_fails_with_invalid_plan() {
        assert!(matches!(resolve_plan(""), Err(BillingError::InvalidPlan(_))));
    }

    #[test]
    fn parse_is_case_sensitive() {
        // The wire format is lowercase; anything else is a client bug we
        // surface rather than paper over.
        assert!(PlanId::parse("Monthly").is_none());
        assert!(PlanId::parse("ANNUAL").is_none());
    }

    #[test]
    fn plan_id_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PlanId::Monthly).unwrap(), "\"monthly\"");
        assert_eq!(serde_json::to_string(&PlanId::Annual).unwrap(), "\"annual\"");
    }

    #[test]
    fn plan_id_deserializes_from_lowercase() {
        let plan: PlanId = serde_json::from_str("\"annual\"").unwrap();
        assert_eq!(plan, PlanId::Annual);
    }

    #[test]
    fn wire_form_roundtrips() {
        for plan in [PlanId::Monthly, PlanId::Annual] {
            assert_eq!(PlanId::parse(plan.as_str()), Some(plan));
        }
    }

    #[test]
    fn every_catalog_amount_is_positive() {
        for plan in CATALOG.values() {
            assert!(plan.amount_minor_units > 0);
            assert!(plan.duration_days > 0);
        }
    }
}
