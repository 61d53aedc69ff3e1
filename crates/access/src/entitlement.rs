//! Feature entitlement derivation
//!
//! Answers "what does this principal's plan unlock right now?". The actual
//! per-feature allow/deny decision lives in the plan store; this module holds
//! the session-side view over it.

use serde::{Deserialize, Serialize};
use supportal_shared::types::{PlanDetails, PlanTier, SubscriptionStatus};

/// Point-in-time view of a principal's plan and entitlements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    pub plan_details: Option<PlanDetails>,
    pub is_loading: bool,
}

impl EntitlementSnapshot {
    /// Empty snapshot for a signed-out session
    pub fn signed_out() -> Self {
        Self {
            plan_details: None,
            is_loading: false,
        }
    }

    /// Initial snapshot while the first fetch is in flight
    pub fn loading() -> Self {
        Self {
            plan_details: None,
            is_loading: true,
        }
    }

    /// Display name of the plan in force, defaulting to "Free" when plan
    /// details have not loaded
    pub fn plan_display(&self) -> &'static str {
        self.plan_details
            .as_ref()
            .map(|p| p.plan_type.display_name())
            .unwrap_or(PlanTier::Free.display_name())
    }
}

/// Share of platform functionality available to the session, 0-100.
///
/// The platform owner and active trials see everything; otherwise the plan
/// tier sets the share. No plan details means nothing is unlocked.
pub fn functionality_percent(plan: Option<&PlanDetails>, is_platform_creator: bool) -> u8 {
    if is_platform_creator {
        return 100;
    }
    let Some(plan) = plan else {
        return 0;
    };
    if plan.status == SubscriptionStatus::Trial && plan.trial_days_remaining > 0 {
        return 100;
    }
    match plan.plan_type {
        PlanTier::Free => 25,
        PlanTier::Starter => 50,
        PlanTier::Pro => 80,
        PlanTier::Enterprise => 100,
    }
}
