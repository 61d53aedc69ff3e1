//! Common types used across Supportal

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Principal ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PrincipalId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Workspace role carried by the identity provider's role claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    Supervisor,
    Admin,
    PlatformAdmin,
}

impl Default for Role {
    fn default() -> Self {
        Self::Agent
    }
}

impl Role {
    /// Get the permission level for this role (higher = more permissions)
    /// Agent: 0, Supervisor: 1, Admin: 2, PlatformAdmin: 3
    pub fn level(&self) -> u8 {
        match self {
            Self::Agent => 0,
            Self::Supervisor => 1,
            Self::Admin => 2,
            Self::PlatformAdmin => 3,
        }
    }

    /// Check if this role can supervise agents (team queues, reassignment)
    pub fn can_supervise(&self) -> bool {
        self.level() >= 1
    }

    /// Check if this role can administer the workspace
    pub fn can_administer(&self) -> bool {
        self.level() >= 2
    }

    /// Check if this role operates the platform itself
    pub fn is_platform_admin(&self) -> bool {
        matches!(self, Self::PlatformAdmin)
    }

    /// Resolve a raw role claim into a role.
    ///
    /// A missing or unrecognized claim resolves to `Agent`, the least
    /// privileged role. Claims are never widened on ambiguity.
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some(s) => s.parse().unwrap_or(Self::Agent),
            None => Self::Agent,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Supervisor => write!(f, "supervisor"),
            Self::Admin => write!(f, "admin"),
            Self::PlatformAdmin => write!(f, "platform_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agent" => Ok(Self::Agent),
            "supervisor" => Ok(Self::Supervisor),
            "admin" => Ok(Self::Admin),
            "platform_admin" => Ok(Self::PlatformAdmin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Cancelled,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::Trial
    }
}

impl SubscriptionStatus {
    /// Check if this status permits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }

    /// Check whether a transition to `next` is legal.
    ///
    /// Legal transitions: trial -> active/expired/cancelled,
    /// active -> expired/cancelled. Expired and cancelled are terminal.
    pub fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Trial => matches!(next, Self::Active | Self::Expired | Self::Cancelled),
            Self::Active => matches!(next, Self::Expired | Self::Cancelled),
            Self::Expired | Self::Cancelled => false,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trial => write!(f, "trial"),
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trial" => Ok(Self::Trial),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid subscription status: {}", s)),
        }
    }
}

/// Subscription plan tier
///
/// Declaration order is the upgrade order, so comparisons follow the tier
/// hierarchy (Free < Starter < Pro < Enterprise).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Starter,
    Pro,
    Enterprise,
}

impl Default for PlanTier {
    fn default() -> Self {
        Self::Free
    }
}

impl PlanTier {
    /// Human-readable display name (capitalized, as shown in upgrade prompts)
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Starter => "Starter",
            Self::Pro => "Pro",
            Self::Enterprise => "Enterprise",
        }
    }

    /// Check if this is a paid tier
    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Starter => write!(f, "starter"),
            Self::Pro => write!(f, "pro"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(format!("Invalid plan tier: {}", s)),
        }
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Authenticated principal handed over by the identity provider
///
/// The role claim is carried raw; `role()` resolves it fail-closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub role_claim: Option<String>,
}

impl Principal {
    pub fn new(id: PrincipalId, email: impl Into<String>, role_claim: Option<String>) -> Self {
        Self {
            id,
            email: email.into(),
            role_claim,
        }
    }

    /// Resolved workspace role (least privileged when the claim is absent)
    pub fn role(&self) -> Role {
        Role::from_claim(self.role_claim.as_deref())
    }
}

/// Subscription row for a principal's workspace
///
/// Written at signup and by billing events; this core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub status: SubscriptionStatus,
    pub plan_type: PlanTier,
    pub trial_start: OffsetDateTime,
    pub trial_end: OffsetDateTime,
    pub subscription_start: Option<OffsetDateTime>,
    pub subscription_end: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Plan details projection computed by the backend for one principal
///
/// Read-only view over the subscription row plus seat counts; cached per
/// session and refreshed only on explicit refresh or principal change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDetails {
    pub plan_type: PlanTier,
    pub status: SubscriptionStatus,
    pub agent_limit: i64,
    pub current_agent_count: i64,
    pub trial_days_remaining: i64,
}

impl PlanDetails {
    /// Remaining agent seats under the plan limit, floored at zero
    pub fn seats_remaining(&self) -> i64 {
        (self.agent_limit - self.current_agent_count).max(0)
    }

    /// Check if another agent can be added without breaching the seat limit
    pub fn can_add_agent(&self) -> bool {
        self.current_agent_count < self.agent_limit
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Role Tests
    // =========================================================================

    #[test]
    fn test_role_default() {
        assert_eq!(Role::default(), Role::Agent);
    }

    #[test]
    fn test_role_levels() {
        assert_eq!(Role::Agent.level(), 0);
        assert_eq!(Role::Supervisor.level(), 1);
        assert_eq!(Role::Admin.level(), 2);
        assert_eq!(Role::PlatformAdmin.level(), 3);
    }

    #[test]
    fn test_role_permissions() {
        // can_supervise: Supervisor and above
        assert!(!Role::Agent.can_supervise());
        assert!(Role::Supervisor.can_supervise());
        assert!(Role::Admin.can_supervise());

        // can_administer: Admin and above
        assert!(!Role::Agent.can_administer());
        assert!(!Role::Supervisor.can_administer());
        assert!(Role::Admin.can_administer());
        assert!(Role::PlatformAdmin.can_administer());

        // is_platform_admin: only PlatformAdmin
        assert!(!Role::Admin.is_platform_admin());
        assert!(Role::PlatformAdmin.is_platform_admin());
    }

    #[test]
    fn test_role_from_claim_fails_closed() {
        assert_eq!(Role::from_claim(Some("admin")), Role::Admin);
        assert_eq!(Role::from_claim(Some("SUPERVISOR")), Role::Supervisor);
        assert_eq!(
            Role::from_claim(Some("platform_admin")),
            Role::PlatformAdmin
        );
        // Missing and unknown claims resolve to the least privileged role
        assert_eq!(Role::from_claim(None), Role::Agent);
        assert_eq!(Role::from_claim(Some("")), Role::Agent);
        assert_eq!(Role::from_claim(Some("superuser")), Role::Agent);
    }

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(format!("{}", Role::PlatformAdmin), "platform_admin");
        assert_eq!("agent".parse::<Role>().unwrap(), Role::Agent);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("invalid".parse::<Role>().is_err());
    }

    // =========================================================================
    // SubscriptionStatus Tests
    // =========================================================================

    #[test]
    fn test_subscription_status_default() {
        assert_eq!(SubscriptionStatus::default(), SubscriptionStatus::Trial);
    }

    #[test]
    fn test_subscription_status_transitions() {
        use SubscriptionStatus::*;

        assert!(Trial.can_transition_to(Active));
        assert!(Trial.can_transition_to(Expired));
        assert!(Trial.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Active.can_transition_to(Expired));

        // No transition back into trial
        assert!(!Active.can_transition_to(Trial));
        assert!(!Expired.can_transition_to(Trial));
        assert!(!Cancelled.can_transition_to(Trial));

        // Terminal states admit nothing
        assert!(!Expired.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Active));
        assert!(Expired.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Trial.is_terminal());
    }

    #[test]
    fn test_subscription_status_display_and_parse() {
        assert_eq!(format!("{}", SubscriptionStatus::Trial), "trial");
        assert_eq!(format!("{}", SubscriptionStatus::Cancelled), "cancelled");
        assert_eq!(
            "active".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Active
        );
        // Both spellings appear in billing payloads
        assert_eq!(
            "canceled".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Cancelled
        );
        assert!("paused".parse::<SubscriptionStatus>().is_err());
    }

    // =========================================================================
    // PlanTier Tests
    // =========================================================================

    #[test]
    fn test_plan_tier_default() {
        assert_eq!(PlanTier::default(), PlanTier::Free);
    }

    #[test]
    fn test_plan_tier_hierarchy() {
        assert!(PlanTier::Starter > PlanTier::Free);
        assert!(PlanTier::Pro > PlanTier::Starter);
        assert!(PlanTier::Enterprise > PlanTier::Pro);
    }

    #[test]
    fn test_plan_tier_display_name() {
        assert_eq!(PlanTier::Free.display_name(), "Free");
        assert_eq!(PlanTier::Pro.display_name(), "Pro");
        assert_eq!(PlanTier::Enterprise.display_name(), "Enterprise");
    }

    #[test]
    fn test_plan_tier_is_paid() {
        assert!(!PlanTier::Free.is_paid());
        assert!(PlanTier::Starter.is_paid());
        assert!(PlanTier::Enterprise.is_paid());
    }

    #[test]
    fn test_plan_tier_parse() {
        assert_eq!("free".parse::<PlanTier>().unwrap(), PlanTier::Free);
        assert_eq!("PRO".parse::<PlanTier>().unwrap(), PlanTier::Pro);
        assert!("platinum".parse::<PlanTier>().is_err());
    }

    // =========================================================================
    // Principal Tests
    // =========================================================================

    #[test]
    fn test_principal_role_resolution() {
        let id = PrincipalId::new();
        let with_claim = Principal::new(id, "a@example.com", Some("supervisor".to_string()));
        assert_eq!(with_claim.role(), Role::Supervisor);

        let without_claim = Principal::new(id, "a@example.com", None);
        assert_eq!(without_claim.role(), Role::Agent);
    }

    // =========================================================================
    // PlanDetails Tests
    // =========================================================================

    #[test]
    fn test_plan_details_seats() {
        let details = PlanDetails {
            plan_type: PlanTier::Starter,
            status: SubscriptionStatus::Active,
            agent_limit: 5,
            current_agent_count: 3,
            trial_days_remaining: 0,
        };
        assert_eq!(details.seats_remaining(), 2);
        assert!(details.can_add_agent());

        let full = PlanDetails {
            current_agent_count: 5,
            ..details.clone()
        };
        assert_eq!(full.seats_remaining(), 0);
        assert!(!full.can_add_agent());

        // Over-provisioned after a downgrade still floors at zero
        let over = PlanDetails {
            current_agent_count: 9,
            ..details
        };
        assert_eq!(over.seats_remaining(), 0);
        assert!(!over.can_add_agent());
    }

    #[test]
    fn test_principal_id_new() {
        let id1 = PrincipalId::new();
        let id2 = PrincipalId::new();
        assert_ne!(id1, id2); // Each new ID should be unique
    }
}
