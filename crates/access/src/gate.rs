//! Route access gating
//!
//! Decides, per evaluation, whether a principal may see a protected surface.
//! The decision is pure over its inputs; callers re-evaluate whenever the
//! principal or the subscription snapshot changes.

use serde::{Deserialize, Serialize};
use supportal_shared::types::{Principal, Role};

use crate::subscription::SubscriptionSnapshot;

/// Outcome of a route access evaluation
///
/// `Allowed` is the only variant that renders protected content; every other
/// variant substitutes a redirect, spinner, or upgrade prompt in its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// No principal; send to the login screen
    RedirectToLogin,
    /// Principal's role is not allowed here; send home
    RedirectToHome,
    /// Subscription state still resolving; show a spinner and re-evaluate
    Loading,
    /// Neither trialing nor on an active plan; show the trial-expired prompt
    /// with its upgrade and sign-out actions
    Blocked,
    /// Render the protected content
    Allowed,
}

impl std::fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessDecision::RedirectToLogin => write!(f, "redirect_to_login"),
            AccessDecision::RedirectToHome => write!(f, "redirect_to_home"),
            AccessDecision::Loading => write!(f, "loading"),
            AccessDecision::Blocked => write!(f, "blocked"),
            AccessDecision::Allowed => write!(f, "allowed"),
        }
    }
}

/// Evaluate route access for a principal against the current subscription
/// snapshot.
///
/// An empty `allowed_roles` slice admits any authenticated role. The role
/// check resolves the raw claim fail-closed, so an absent claim is checked as
/// `Agent`. A missing subscription blocks rather than allows.
pub fn evaluate_access(
    principal: Option<&Principal>,
    allowed_roles: &[Role],
    snapshot: &SubscriptionSnapshot,
) -> AccessDecision {
    let Some(principal) = principal else {
        return AccessDecision::RedirectToLogin;
    };

    if !allowed_roles.is_empty() && !allowed_roles.contains(&principal.role()) {
        return AccessDecision::RedirectToHome;
    }

    if snapshot.is_loading {
        return AccessDecision::Loading;
    }

    if !snapshot.is_trial_active && !snapshot.is_subscription_active() {
        return AccessDecision::Blocked;
    }

    AccessDecision::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use supportal_shared::types::{
        PlanTier, PrincipalId, SubscriptionRecord, SubscriptionStatus,
    };
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    fn principal(role: &str) -> Principal {
        Principal::new(PrincipalId::new(), "user@acme.test", Some(role.to_string()))
    }

    fn snapshot(
        status: Option<SubscriptionStatus>,
        is_trial_active: bool,
        trial_days_remaining: i64,
    ) -> SubscriptionSnapshot {
        let now = OffsetDateTime::now_utc();
        SubscriptionSnapshot {
            subscription: status.map(|status| SubscriptionRecord {
                id: Uuid::new_v4(),
                principal_id: Uuid::new_v4(),
                status,
                plan_type: PlanTier::Starter,
                trial_start: now - Duration::days(3),
                trial_end: now + Duration::days(11),
                subscription_start: None,
                subscription_end: None,
                created_at: now,
                updated_at: now,
            }),
            trial_days_remaining,
            is_trial_active,
            is_loading: false,
        }
    }

    #[test]
    fn test_missing_principal_redirects_to_login() {
        let state = snapshot(Some(SubscriptionStatus::Active), false, 0);
        assert_eq!(
            evaluate_access(None, &[Role::Admin], &state),
            AccessDecision::RedirectToLogin
        );
        assert_eq!(
            evaluate_access(None, &[], &state),
            AccessDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_role_mismatch_redirects_home_regardless_of_subscription() {
        let agent = principal("agent");
        for state in [
            snapshot(Some(SubscriptionStatus::Active), false, 0),
            snapshot(Some(SubscriptionStatus::Trial), true, 11),
            snapshot(None, false, 0),
        ] {
            assert_eq!(
                evaluate_access(Some(&agent), &[Role::Admin], &state),
                AccessDecision::RedirectToHome
            );
        }
    }

    #[test]
    fn test_role_check_precedes_loading() {
        let mut state = snapshot(None, false, 0);
        state.is_loading = true;
        assert_eq!(
            evaluate_access(Some(&principal("agent")), &[Role::Admin], &state),
            AccessDecision::RedirectToHome
        );
    }

    #[test]
    fn test_missing_role_claim_is_least_privileged() {
        // An absent claim resolves to agent, which an admin-only route rejects
        let unclaimed = Principal::new(PrincipalId::new(), "user@acme.test", None);
        let state = snapshot(Some(SubscriptionStatus::Active), false, 0);
        assert_eq!(
            evaluate_access(Some(&unclaimed), &[Role::Admin], &state),
            AccessDecision::RedirectToHome
        );
        assert_eq!(
            evaluate_access(Some(&unclaimed), &[Role::Agent], &state),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_loading_shows_spinner() {
        let mut state = snapshot(None, false, 0);
        state.is_loading = true;
        assert_eq!(
            evaluate_access(Some(&principal("admin")), &[Role::Admin], &state),
            AccessDecision::Loading
        );
    }

    #[test]
    fn test_missing_subscription_blocks() {
        // Role matches and data is loaded, but there is no subscription row
        let state = snapshot(None, false, 0);
        assert_eq!(
            evaluate_access(Some(&principal("admin")), &[Role::Admin], &state),
            AccessDecision::Blocked
        );
    }

    #[test]
    fn test_active_trial_allows() {
        let state = snapshot(Some(SubscriptionStatus::Trial), true, 11);
        assert_eq!(
            evaluate_access(Some(&principal("admin")), &[Role::Admin], &state),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_expired_trial_blocks() {
        let state = snapshot(Some(SubscriptionStatus::Trial), false, 0);
        assert_eq!(
            evaluate_access(Some(&principal("admin")), &[Role::Admin], &state),
            AccessDecision::Blocked
        );
    }

    #[test]
    fn test_active_subscription_allows_without_trial() {
        let state = snapshot(Some(SubscriptionStatus::Active), false, 0);
        assert_eq!(
            evaluate_access(Some(&principal("supervisor")), &[], &state),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn test_cancelled_subscription_blocks() {
        for status in [SubscriptionStatus::Cancelled, SubscriptionStatus::Expired] {
            let state = snapshot(Some(status), false, 0);
            assert_eq!(
                evaluate_access(Some(&principal("admin")), &[], &state),
                AccessDecision::Blocked
            );
        }
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(AccessDecision::Allowed.to_string(), "allowed");
        assert_eq!(
            AccessDecision::RedirectToLogin.to_string(),
            "redirect_to_login"
        );
        assert_eq!(AccessDecision::Blocked.to_string(), "blocked");
    }
}
