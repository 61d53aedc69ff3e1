//! Supportal Access Core
//!
//! Feature-entitlement and trial-lifecycle gating for the Supportal
//! platform: who may see a protected dashboard, and which feature panels are
//! unlocked on the current plan.
//!
//! The crate derives per-session subscription and entitlement state from the
//! plan backend and applies two pure decision functions over it: the access
//! gate (route level) and the feature gate (panel level). All derivations
//! fail closed: missing or unreachable data denies access.

pub mod config;
pub mod entitlement;
pub mod error;
pub mod feature_gate;
pub mod gate;
pub mod session;
pub mod store;
pub mod subscription;

pub use config::{AccessConfig, ConfigError};
pub use entitlement::{functionality_percent, EntitlementSnapshot};
pub use error::{AccessError, AccessResult};
pub use feature_gate::{evaluate_feature, FeatureGateInputs, FeatureGateOutcome};
pub use gate::{evaluate_access, AccessDecision};
pub use session::AccessSession;
pub use store::{PgPlanStore, PlanStore};
pub use subscription::{days_remaining, trial_active, SubscriptionSnapshot};
