//! Single-entity and type-level permission evaluation.
//!
//! # Algorithm
//!
//! ```text
//! actor absent ─────────────────────────────► deny  unauthenticated
//! actor is admin ───────────────────────────► allow
//! caps = capabilities(actor.role)
//! entity absent ─► scope named? caps ∋ scope : caps ≠ ∅
//! entity present ─► resolve scope (explicit | inferred | global override)
//!                   caps ∋ scope ─────────────► allow
//!                   otherwise ────────────────► deny with reason
//! ```
//!
//! Every call is pure: same inputs, same verdict, no shared mutable state
//! beyond the capability cache (which never changes an answer).
//!
//! # Elevation
//!
//! A denial sets `requires_elevation` only when some strictly higher role
//! would be granted the same `(type, action, scope)`. Ownership denials
//! never do: no role upgrade changes who created an entity.

use crate::cache::CapabilityCache;
use crate::capability::{Capabilities, Scopes};
use crate::policy::PolicyTable;
use crate::resolver::{self, Resolution, ScopeOrigin};
use armory_types::{Action, Actor, EntityRef, EntityType, Role, Scope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Why a check was denied. Closed vocabulary for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No actor.
    Unauthenticated,
    /// The actor's role lacks the grant.
    InsufficientRole,
    /// The grant covers own content and the actor did not create this entity.
    NotOwner,
    /// The entity is global and the role holds only `own` on it.
    GlobalContentRequiresElevatedRole,
    /// No role can do this on this entity type in this scope.
    UnsupportedActionForType,
}

impl DenyReason {
    /// Every reason.
    pub const ALL: [Self; 5] = [
        Self::Unauthenticated,
        Self::InsufficientRole,
        Self::NotOwner,
        Self::GlobalContentRequiresElevatedRole,
        Self::UnsupportedActionForType,
    ];

    /// Snake-case reason code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InsufficientRole => "insufficient_role",
            Self::NotOwner => "not_owner",
            Self::GlobalContentRequiresElevatedRole => "global_content_requires_elevated_role",
            Self::UnsupportedActionForType => "unsupported_action_for_type",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of a single check.
///
/// Invariants: `allowed` implies `reason == None` and
/// `requires_elevation == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionCheckResult {
    /// Whether the action may proceed.
    pub allowed: bool,
    /// Why not, when denied.
    pub reason: Option<DenyReason>,
    /// A higher role would have been allowed.
    pub requires_elevation: bool,
}

impl PermissionCheckResult {
    /// An allow verdict.
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            requires_elevation: false,
        }
    }

    /// A deny verdict.
    #[must_use]
    pub const fn deny(reason: DenyReason, requires_elevation: bool) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            requires_elevation,
        }
    }

    /// Returns `true` if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Status label for logs: "allowed" or the reason code.
    #[must_use]
    pub fn status_str(&self) -> &'static str {
        match self.reason {
            Some(reason) if !self.allowed => reason.as_str(),
            _ => "allowed",
        }
    }
}

/// Inputs of one check.
///
/// Without an entity the check is type-level: "can this role ever do this
/// to this kind of entity", used before a concrete entity exists.
///
/// # Example
///
/// ```
/// use armory_auth::PermissionContext;
/// use armory_types::{Action, Actor, EntityRef, EntityType, Role, Scope};
///
/// let actor = Actor::new("u1", Role::Member);
/// let item = EntityRef::owned("i1", "u1");
///
/// let ctx = PermissionContext::new(Some(&actor), EntityType::Item, Action::Update)
///     .on(&item)
///     .with_scope(Scope::Own);
/// assert_eq!(ctx.scope, Some(Scope::Own));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PermissionContext<'a> {
    /// The acting identity; `None` when unauthenticated.
    pub actor: Option<&'a Actor>,
    /// Kind of entity acted on.
    pub entity_type: EntityType,
    /// The concrete entity, if one exists yet.
    pub entity: Option<&'a EntityRef>,
    /// Requested action.
    pub action: Action,
    /// Scope the caller claims; inferred from ownership when `None`.
    pub scope: Option<Scope>,
}

impl<'a> PermissionContext<'a> {
    /// Type-level context with no entity and no explicit scope.
    #[must_use]
    pub fn new(actor: Option<&'a Actor>, entity_type: EntityType, action: Action) -> Self {
        Self {
            actor,
            entity_type,
            entity: None,
            action,
            scope: None,
        }
    }

    /// Targets a concrete entity.
    #[must_use]
    pub fn on(mut self, entity: &'a EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Names the scope explicitly.
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets or clears the explicit scope.
    #[must_use]
    pub fn with_optional_scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }
}

/// The permission evaluator.
///
/// Cheap to clone; clones share the capability cache. `Evaluator::default()`
/// uses the builtin policy.
///
/// # Example
///
/// ```
/// use armory_auth::{DenyReason, Evaluator, PermissionContext};
/// use armory_types::{Action, Actor, EntityRef, EntityType, Role};
///
/// let evaluator = Evaluator::default();
/// let actor = Actor::new("u1", Role::Member);
///
/// let own = EntityRef::owned("i1", "u1");
/// let ctx = PermissionContext::new(Some(&actor), EntityType::Item, Action::Update).on(&own);
/// assert!(evaluator.evaluate(&ctx).allowed);
///
/// let theirs = EntityRef::owned("i2", "u2");
/// let ctx = PermissionContext::new(Some(&actor), EntityType::Item, Action::Delete).on(&theirs);
/// let result = evaluator.evaluate(&ctx);
/// assert!(!result.allowed);
/// assert_eq!(result.reason, Some(DenyReason::NotOwner));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    cache: Arc<CapabilityCache>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            cache: CapabilityCache::builtin(),
        }
    }
}

impl Evaluator {
    /// Evaluator over a custom policy table.
    #[must_use]
    pub fn new(table: PolicyTable) -> Self {
        Self {
            cache: Arc::new(CapabilityCache::new(table)),
        }
    }

    /// Evaluator over an existing cache.
    #[must_use]
    pub fn with_cache(cache: Arc<CapabilityCache>) -> Self {
        Self { cache }
    }

    /// The policy in force.
    #[must_use]
    pub fn policy(&self) -> &PolicyTable {
        self.cache.table()
    }

    /// Capability matrix for `role`.
    #[must_use]
    pub fn capabilities_for(&self, role: Role) -> Arc<Capabilities> {
        self.cache.get(role)
    }

    /// Decides one check.
    #[must_use]
    pub fn evaluate(&self, ctx: &PermissionContext<'_>) -> PermissionCheckResult {
        let result = self.decide(ctx);
        log_decision(ctx, &result);
        result
    }

    fn decide(&self, ctx: &PermissionContext<'_>) -> PermissionCheckResult {
        let Some(actor) = ctx.actor else {
            return PermissionCheckResult::deny(DenyReason::Unauthenticated, false);
        };

        // Admin holds every cell in `any`; ownership and scope never apply.
        if actor.role == Role::Admin {
            return PermissionCheckResult::allow();
        }

        let caps = self.cache.get(actor.role);
        let granted = caps.scopes(ctx.entity_type, ctx.action);
        let ownable = self.policy().entity(ctx.entity_type).is_ownable();

        let Some(entity) = ctx.entity else {
            return self.decide_type_level(actor.role, ctx, granted, ownable);
        };

        let (scope, origin) = match resolver::resolve(Some(actor), entity, ctx.scope, ownable) {
            Resolution::Scope { scope, origin } => (scope, origin),
            Resolution::NotOwner => {
                return PermissionCheckResult::deny(DenyReason::NotOwner, false);
            }
            Resolution::OwnUnsupported => {
                return PermissionCheckResult::deny(DenyReason::UnsupportedActionForType, false);
            }
        };

        if granted.has(scope) {
            return PermissionCheckResult::allow();
        }

        if !self.any_role_allows(ctx.entity_type, ctx.action, scope) {
            return PermissionCheckResult::deny(DenyReason::UnsupportedActionForType, false);
        }

        let elevation = self.higher_role_allows(actor.role, ctx.entity_type, ctx.action, scope);

        // Only the global flag stands between the role's `own` grant and the entity.
        if entity.is_global() && granted.has(Scope::Own) {
            return PermissionCheckResult::deny(
                DenyReason::GlobalContentRequiresElevatedRole,
                elevation,
            );
        }

        // The role covers its own content and this is someone else's.
        if origin == ScopeOrigin::Inferred && scope == Scope::Any && granted.has(Scope::Own) {
            return PermissionCheckResult::deny(DenyReason::NotOwner, false);
        }

        PermissionCheckResult::deny(DenyReason::InsufficientRole, elevation)
    }

    fn decide_type_level(
        &self,
        role: Role,
        ctx: &PermissionContext<'_>,
        granted: Scopes,
        ownable: bool,
    ) -> PermissionCheckResult {
        if ctx.scope == Some(Scope::Own) && !ownable {
            return PermissionCheckResult::deny(DenyReason::UnsupportedActionForType, false);
        }

        let satisfies = |scopes: Scopes| match ctx.scope {
            Some(scope) => scopes.has(scope),
            None => !scopes.is_empty(),
        };

        if satisfies(granted) {
            return PermissionCheckResult::allow();
        }

        let elevation = role
            .above()
            .any(|r| satisfies(self.cache.get(r).scopes(ctx.entity_type, ctx.action)));
        if elevation {
            PermissionCheckResult::deny(DenyReason::InsufficientRole, true)
        } else {
            PermissionCheckResult::deny(DenyReason::UnsupportedActionForType, false)
        }
    }

    fn higher_role_allows(
        &self,
        role: Role,
        entity_type: EntityType,
        action: Action,
        scope: Scope,
    ) -> bool {
        role.above()
            .any(|r| self.cache.get(r).allows(entity_type, action, scope))
    }

    fn any_role_allows(&self, entity_type: EntityType, action: Action, scope: Scope) -> bool {
        Role::ALL
            .into_iter()
            .any(|r| self.cache.get(r).allows(entity_type, action, scope))
    }
}

/// Decides one check under the builtin policy.
#[must_use]
pub fn evaluate(ctx: &PermissionContext<'_>) -> PermissionCheckResult {
    Evaluator::default().evaluate(ctx)
}

fn log_decision(ctx: &PermissionContext<'_>, result: &PermissionCheckResult) {
    let actor = ctx.actor.map(|a| a.id.as_str());
    let role = ctx.actor.map(|a| a.role.as_str());
    let entity = ctx.entity.map(|e| e.id().as_str());

    if result.allowed {
        tracing::debug!(
            actor = ?actor,
            role = ?role,
            entity_type = %ctx.entity_type,
            entity = ?entity,
            action = %ctx.action,
            scope = ?ctx.scope,
            "permission allowed"
        );
    } else {
        tracing::debug!(
            actor = ?actor,
            role = ?role,
            entity_type = %ctx.entity_type,
            entity = ?entity,
            action = %ctx.action,
            scope = ?ctx.scope,
            reason = result.status_str(),
            requires_elevation = result.requires_elevation,
            "permission denied"
        );
    }
}
