//! Ownership and scope resolution.
//!
//! # Rules
//!
//! | Entity | Actor is creator | Inferred scope |
//! |--------|------------------|----------------|
//! | non-global | yes | `own` |
//! | non-global | no | `any` |
//! | global | either | `any` |
//!
//! The global flag is authoritative: content flagged global is never owned
//! by anyone for mutation purposes, even if a creator id is recorded.

use armory_types::{Actor, EntityRef, Scope};

/// Returns `true` if `actor` owns `entity`.
///
/// Plain creator comparison: an unauthenticated caller owns nothing, and
/// an unowned entity has no owner. This does **not** consult the global
/// flag; use [`owns_for_mutation`] for scope decisions.
///
/// # Example
///
/// ```
/// use armory_auth::resolver::is_owner;
/// use armory_types::{Actor, EntityRef, Role};
///
/// let actor = Actor::new("u1", Role::Member);
/// assert!(is_owner(Some(&actor), &EntityRef::owned("i1", "u1")));
/// assert!(!is_owner(Some(&actor), &EntityRef::owned("i2", "u2")));
/// assert!(!is_owner(None, &EntityRef::owned("i1", "u1")));
/// ```
#[must_use]
pub fn is_owner(actor: Option<&Actor>, entity: &EntityRef) -> bool {
    match (actor, entity.owner()) {
        (Some(actor), Some(owner)) => actor.is(owner),
        _ => false,
    }
}

/// Returns `true` if `actor` owns `entity` and the entity is not global.
#[must_use]
pub fn owns_for_mutation(actor: Option<&Actor>, entity: &EntityRef) -> bool {
    !entity.is_global() && is_owner(actor, entity)
}

/// Scope an action on `entity` requires when the caller names none.
///
/// # Example
///
/// ```
/// use armory_auth::resolver::required_scope;
/// use armory_types::{Actor, EntityRef, Role, Scope};
///
/// let actor = Actor::new("u1", Role::Member);
/// assert_eq!(required_scope(Some(&actor), &EntityRef::owned("i1", "u1")), Scope::Own);
/// assert_eq!(required_scope(Some(&actor), &EntityRef::owned("i2", "u2")), Scope::Any);
/// // Flagged global: the creator id does not matter.
/// assert_eq!(
///     required_scope(Some(&actor), &EntityRef::global_with_creator("c1", "u1")),
///     Scope::Any
/// );
/// ```
#[must_use]
pub fn required_scope(actor: Option<&Actor>, entity: &EntityRef) -> Scope {
    if owns_for_mutation(actor, entity) {
        Scope::Own
    } else {
        Scope::Any
    }
}

/// Where the effective scope of a check came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOrigin {
    /// The caller named the scope.
    Explicit,
    /// Derived from ownership.
    Inferred,
    /// The caller asked for `own` on global content; raised to `any`.
    GlobalOverride,
}

/// Outcome of resolving the scope for one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Check the role's grants for this scope.
    Scope {
        /// Scope to look up.
        scope: Scope,
        /// How it was chosen.
        origin: ScopeOrigin,
    },
    /// The caller asked for `own` on a non-global entity the actor did not create.
    NotOwner,
    /// The caller asked for `own` on a type without per-user ownership.
    OwnUnsupported,
}

/// Resolves the effective scope for `actor` acting on `entity`.
///
/// `ownable` is the entity type's ownership flag from the policy table.
/// On non-ownable types the inferred scope is always `any`.
#[must_use]
pub fn resolve(
    actor: Option<&Actor>,
    entity: &EntityRef,
    requested: Option<Scope>,
    ownable: bool,
) -> Resolution {
    match requested {
        Some(Scope::Own) if !ownable => Resolution::OwnUnsupported,
        Some(Scope::Own) if entity.is_global() => Resolution::Scope {
            scope: Scope::Any,
            origin: ScopeOrigin::GlobalOverride,
        },
        Some(Scope::Own) if !is_owner(actor, entity) => Resolution::NotOwner,
        Some(scope) => Resolution::Scope {
            scope,
            origin: ScopeOrigin::Explicit,
        },
        None => Resolution::Scope {
            scope: if ownable {
                required_scope(actor, entity)
            } else {
                Scope::Any
            },
            origin: ScopeOrigin::Inferred,
        },
    }
}
