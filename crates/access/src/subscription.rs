//! Subscription state derivation
//!
//! Derives trial activity and days remaining from a principal's subscription
//! row. The backend evaluates the same rules in its own functions; the local
//! implementations here are the contract, not an optimization.

use serde::{Deserialize, Serialize};
use supportal_shared::types::{SubscriptionRecord, SubscriptionStatus};
use time::OffsetDateTime;

const SECONDS_PER_DAY: i64 = 86_400;

/// Point-in-time view of a principal's subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub subscription: Option<SubscriptionRecord>,
    pub trial_days_remaining: i64,
    pub is_trial_active: bool,
    pub is_loading: bool,
}

impl SubscriptionSnapshot {
    /// Empty snapshot for a signed-out session
    pub fn signed_out() -> Self {
        Self {
            subscription: None,
            trial_days_remaining: 0,
            is_trial_active: false,
            is_loading: false,
        }
    }

    /// Initial snapshot while the first fetch is in flight
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::signed_out()
        }
    }

    /// Check if the subscription is on an active paid plan
    pub fn is_subscription_active(&self) -> bool {
        self.subscription
            .as_ref()
            .map(|s| s.status == SubscriptionStatus::Active)
            .unwrap_or(false)
    }
}

/// Trial-active predicate: status is trial and `now` falls inside the trial
/// window, inclusive on both ends.
pub fn trial_active(record: &SubscriptionRecord, now: OffsetDateTime) -> bool {
    record.status == SubscriptionStatus::Trial
        && now >= record.trial_start
        && now <= record.trial_end
}

/// Whole days remaining until `trial_end`, rounded up and floored at zero.
///
/// Independent of subscription status; callers combine it with the trial
/// predicate themselves.
pub fn days_remaining(trial_end: OffsetDateTime, now: OffsetDateTime) -> i64 {
    if trial_end <= now {
        return 0;
    }
    let remaining = (trial_end - now).whole_seconds();
    // Any positive remainder counts as a day, including sub-second slivers
    ((remaining + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
}
