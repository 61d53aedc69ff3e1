//! Feature panel gating
//!
//! Gates individual feature panels inside an already-accessible page. The
//! decision table is evaluated in order, first match wins. When the outcome
//! is an upsell overlay, callers keep the gated children mounted underneath
//! (obscured and non-interactive) to avoid layout shift; gated content must
//! therefore never carry secrets.

use serde::Serialize;

use crate::entitlement::EntitlementSnapshot;

/// Outcome of a feature gate evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGateOutcome {
    /// Entitlements still resolving; show a loading indicator
    Loading,
    /// Render the gated feature
    Children,
    /// Render the caller-provided fallback
    Fallback,
    /// Render nothing (upgrade prompt disabled)
    Hidden,
    /// Neutral "temporarily unavailable" placeholder shown to the platform
    /// owner instead of an upgrade prompt for their own product
    Unavailable,
    /// Access-restricted overlay naming the plan in force and an upgrade
    /// call-to-action
    Upsell { required_plan: &'static str },
}

/// Inputs for one feature gate evaluation
#[derive(Debug, Clone, Copy)]
pub struct FeatureGateInputs<'a> {
    pub snapshot: &'a EntitlementSnapshot,
    pub has_access: bool,
    pub has_fallback: bool,
    pub show_upgrade_prompt: bool,
    pub is_platform_creator: bool,
}

/// Evaluate the feature gate decision table, first match wins.
pub fn evaluate_feature(inputs: FeatureGateInputs<'_>) -> FeatureGateOutcome {
    if inputs.snapshot.is_loading {
        return FeatureGateOutcome::Loading;
    }
    if inputs.has_access {
        return FeatureGateOutcome::Children;
    }
    if inputs.has_fallback {
        return FeatureGateOutcome::Fallback;
    }
    if !inputs.show_upgrade_prompt {
        return FeatureGateOutcome::Hidden;
    }
    if inputs.is_platform_creator {
        return FeatureGateOutcome::Unavailable;
    }
    FeatureGateOutcome::Upsell {
        required_plan: inputs.snapshot.plan_display(),
    }
}
