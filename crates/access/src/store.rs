//! Plan store interface and Postgres implementation
//!
//! The backend owns the subscription rows and the entitlement table, and the
//! derived checks live in database functions so every surface applies the
//! same rules. This module reads that state; it never writes.

use async_trait::async_trait;
use sqlx::PgPool;

use supportal_shared::types::{PlanDetails, PrincipalId, SubscriptionRecord};

use crate::error::{AccessError, AccessResult};

/// Read-side interface over the subscription/plan backend
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Fetch the subscription row for a principal (`None` when absent)
    async fn fetch_subscription(
        &self,
        principal: PrincipalId,
    ) -> AccessResult<Option<SubscriptionRecord>>;

    /// Trial-active predicate evaluated by the backend
    async fn is_trial_active(&self, principal: PrincipalId) -> AccessResult<bool>;

    /// Whole days left in the trial window, floored at zero
    async fn trial_days_remaining(&self, principal: PrincipalId) -> AccessResult<i64>;

    /// Plan details projection for a principal
    async fn fetch_plan_details(&self, principal: PrincipalId) -> AccessResult<PlanDetails>;

    /// Explicit allow/deny decision for one feature key.
    ///
    /// A missing entitlement row denies; implementations must not default to
    /// allow.
    async fn check_feature_access(
        &self,
        principal: PrincipalId,
        feature_key: &str,
    ) -> AccessResult<bool>;
}

/// Postgres-backed plan store
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn fetch_subscription(
        &self,
        principal: PrincipalId,
    ) -> AccessResult<Option<SubscriptionRecord>> {
        let record = sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            SELECT id, principal_id, status, plan_type,
                   trial_start, trial_end,
                   subscription_start, subscription_end,
                   created_at, updated_at
            FROM subscriptions
            WHERE principal_id = $1
            "#,
        )
        .bind(principal.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn is_trial_active(&self, principal: PrincipalId) -> AccessResult<bool> {
        // NULL when the principal has no subscription row; that reads as
        // not trialing
        let (active,): (Option<bool>,) = sqlx::query_as("SELECT is_trial_active($1)")
            .bind(principal.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(active.unwrap_or(false))
    }

    async fn trial_days_remaining(&self, principal: PrincipalId) -> AccessResult<i64> {
        let (days,): (Option<i64>,) = sqlx::query_as("SELECT trial_days_remaining($1)")
            .bind(principal.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(days.unwrap_or(0).max(0))
    }

    async fn fetch_plan_details(&self, principal: PrincipalId) -> AccessResult<PlanDetails> {
        // The backend computes the projection in one place and hands it back
        // as a JSONB payload
        let (payload,): (Option<serde_json::Value>,) =
            sqlx::query_as("SELECT get_plan_details($1)")
                .bind(principal.0)
                .fetch_one(&self.pool)
                .await?;

        let payload = payload.ok_or_else(|| {
            AccessError::NotFound(format!("no plan details for principal {}", principal))
        })?;

        serde_json::from_value(payload)
            .map_err(|e| AccessError::Internal(format!("malformed plan details payload: {}", e)))
    }

    async fn check_feature_access(
        &self,
        principal: PrincipalId,
        feature_key: &str,
    ) -> AccessResult<bool> {
        // NULL means no entitlement row for this (role, plan, feature); deny
        let (allowed,): (Option<bool>,) = sqlx::query_as("SELECT check_feature_access($1, $2)")
            .bind(principal.0)
            .bind(feature_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(allowed.unwrap_or(false))
    }
}
