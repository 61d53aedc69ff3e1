//! Session-scoped access context
//!
//! One `AccessSession` per authenticated UI session. It owns the cached
//! subscription and entitlement state for the current principal and applies
//! the gate decisions over that state. The session is constructed explicitly
//! and passed through request scope; there is no process-wide singleton.
//!
//! Caching is per session: entitlement decisions and plan details live until
//! the next refresh or principal change, so a backend-side plan change is not
//! observed until then.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use supportal_shared::types::{PlanDetails, Principal, Role};

use crate::config::AccessConfig;
use crate::entitlement::{functionality_percent, EntitlementSnapshot};
use crate::error::AccessError;
use crate::feature_gate::{evaluate_feature, FeatureGateInputs, FeatureGateOutcome};
use crate::gate::{evaluate_access, AccessDecision};
use crate::store::PlanStore;
use crate::subscription::SubscriptionSnapshot;

/// Session-scoped access state for one principal
pub struct AccessSession {
    store: Arc<dyn PlanStore>,
    config: AccessConfig,
    principal: RwLock<Option<Principal>>,
    subscription: RwLock<SubscriptionSnapshot>,
    entitlements: RwLock<EntitlementSnapshot>,
    decision_cache: RwLock<HashMap<String, bool>>,
    // Bumped on every principal change; a refresh that started under an
    // older generation must not commit its results.
    generation: AtomicU64,
}

impl AccessSession {
    pub fn new(store: Arc<dyn PlanStore>, config: AccessConfig) -> Self {
        Self {
            store,
            config,
            principal: RwLock::new(None),
            subscription: RwLock::new(SubscriptionSnapshot::signed_out()),
            entitlements: RwLock::new(EntitlementSnapshot::signed_out()),
            decision_cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the current principal.
    ///
    /// Invalidates all cached state and any in-flight refresh started for
    /// the previous principal.
    pub async fn set_principal(&self, principal: Option<Principal>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let signed_in = principal.is_some();
        *self.principal.write().await = principal;
        *self.subscription.write().await = if signed_in {
            SubscriptionSnapshot::loading()
        } else {
            SubscriptionSnapshot::signed_out()
        };
        *self.entitlements.write().await = if signed_in {
            EntitlementSnapshot::loading()
        } else {
            EntitlementSnapshot::signed_out()
        };
        self.decision_cache.write().await.clear();
    }

    /// Refresh subscription state and plan details for the current principal.
    ///
    /// Fetch failures leave the previous state in place and end the loading
    /// state; no retry is scheduled. Results observed under a stale
    /// generation are discarded rather than committed.
    pub async fn refresh(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let principal = self.principal.read().await.clone();

        let Some(principal) = principal else {
            let mut subscription = self.subscription.write().await;
            let mut entitlements = self.entitlements.write().await;
            if self.generation.load(Ordering::SeqCst) == generation {
                *subscription = SubscriptionSnapshot::signed_out();
                *entitlements = EntitlementSnapshot::signed_out();
            }
            return;
        };

        self.refresh_subscription(&principal, generation).await;
        self.refresh_entitlements(&principal, generation).await;
    }

    async fn refresh_subscription(&self, principal: &Principal, generation: u64) {
        // Outer None marks a failed fetch (keep previous record); the inner
        // option is row presence.
        let mut fetched = None;
        let mut derived_active = None;
        let mut derived_days = None;

        match self.store.fetch_subscription(principal.id).await {
            Ok(record) => {
                if record.is_some() {
                    // Two independent derived checks; each may fail without
                    // blocking the other
                    match self.store.is_trial_active(principal.id).await {
                        Ok(active) => derived_active = Some(active),
                        Err(e) => {
                            warn!(principal = %principal.id, error = %e, "trial-active check failed");
                        }
                    }
                    match self.store.trial_days_remaining(principal.id).await {
                        Ok(days) => derived_days = Some(days.max(0)),
                        Err(e) => {
                            warn!(principal = %principal.id, error = %e, "days-remaining check failed");
                        }
                    }
                }
                fetched = Some(record);
            }
            Err(e) => {
                warn!(principal = %principal.id, error = %e, "subscription fetch failed");
            }
        }

        let mut snapshot = self.subscription.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(principal = %principal.id, "discarding stale subscription refresh");
            return;
        }

        if let Some(record) = fetched {
            let absent = record.is_none();
            snapshot.subscription = record;
            if absent {
                // No row reads as not trialing with nothing remaining
                snapshot.is_trial_active = false;
                snapshot.trial_days_remaining = 0;
            }
        }
        if let Some(active) = derived_active {
            snapshot.is_trial_active = active;
        }
        if let Some(days) = derived_days {
            snapshot.trial_days_remaining = days;
        }
        snapshot.is_loading = false;
    }

    async fn refresh_entitlements(&self, principal: &Principal, generation: u64) {
        let fetched = self.store.fetch_plan_details(principal.id).await;

        let mut snapshot = self.entitlements.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(principal = %principal.id, "discarding stale entitlement refresh");
            return;
        }

        match fetched {
            Ok(details) => snapshot.plan_details = Some(details),
            Err(AccessError::NotFound(_)) => snapshot.plan_details = None,
            Err(e) => {
                // Keep whatever was loaded before
                warn!(principal = %principal.id, error = %e, "plan details fetch failed");
            }
        }
        snapshot.is_loading = false;
    }

    /// Explicit allow/deny decision for one feature key, cached per session.
    ///
    /// The platform owner bypasses the check entirely. A principal or plan
    /// details that have not loaded deny. Store errors deny and are not
    /// cached, so a recovered backend is consulted again.
    pub async fn has_feature_access(&self, feature_key: &str) -> bool {
        let principal = self.principal.read().await.clone();
        let Some(principal) = principal else {
            return false;
        };

        if self.config.is_platform_owner(&principal.email) {
            return true;
        }

        if self.entitlements.read().await.plan_details.is_none() {
            return false;
        }

        if let Some(&cached) = self.decision_cache.read().await.get(feature_key) {
            debug!(feature = feature_key, "entitlement cache hit");
            return cached;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        match self.store.check_feature_access(principal.id, feature_key).await {
            Ok(allowed) => {
                // Don't cache a decision observed across a principal change
                if self.generation.load(Ordering::SeqCst) == generation {
                    self.decision_cache
                        .write()
                        .await
                        .insert(feature_key.to_string(), allowed);
                }
                allowed
            }
            Err(e) => {
                warn!(feature = feature_key, error = %e, "feature access check failed; denying");
                false
            }
        }
    }

    /// Check whether the current principal is the platform owner
    pub async fn is_platform_creator(&self) -> bool {
        match self.principal.read().await.as_ref() {
            Some(p) => self.config.is_platform_owner(&p.email),
            None => false,
        }
    }

    /// Share of platform functionality available to this session, 0-100
    pub async fn functionality_percent(&self) -> u8 {
        let creator = self.is_platform_creator().await;
        let snapshot = self.entitlements.read().await;
        functionality_percent(snapshot.plan_details.as_ref(), creator)
    }

    /// Current subscription snapshot
    pub async fn subscription(&self) -> SubscriptionSnapshot {
        self.subscription.read().await.clone()
    }

    /// Current plan details, if loaded
    pub async fn plan_details(&self) -> Option<PlanDetails> {
        self.entitlements.read().await.plan_details.clone()
    }

    /// Evaluate route access for the current principal
    pub async fn evaluate_access(&self, allowed_roles: &[Role]) -> AccessDecision {
        let principal = self.principal.read().await.clone();
        let snapshot = self.subscription.read().await.clone();
        evaluate_access(principal.as_ref(), allowed_roles, &snapshot)
    }

    /// Evaluate a feature gate for the current principal
    pub async fn evaluate_feature(
        &self,
        feature_key: &str,
        has_fallback: bool,
        show_upgrade_prompt: bool,
    ) -> FeatureGateOutcome {
        let snapshot = self.entitlements.read().await.clone();
        // No point consulting the store while the snapshot is resolving
        let has_access = if snapshot.is_loading {
            false
        } else {
            self.has_feature_access(feature_key).await
        };
        let is_platform_creator = self.is_platform_creator().await;

        evaluate_feature(FeatureGateInputs {
            snapshot: &snapshot,
            has_access,
            has_fallback,
            show_upgrade_prompt,
            is_platform_creator,
        })
    }
}
