//! Property-based tests for the evaluator's invariants.

use armory_auth::{
    capabilities_for, DenyReason, EntityPolicy, Evaluator, PermissionCheckResult,
    PermissionContext, PolicyTable, Scopes,
};
use armory_types::{Action, Actor, EntityRef, EntityType, Role, Scope, TryNew};
use proptest::prelude::*;
use proptest::sample::select;

// ─── Strategies ───────────────────────────────────────────────

fn role() -> impl Strategy<Value = Role> {
    select(Role::ALL.to_vec())
}

fn entity_type() -> impl Strategy<Value = EntityType> {
    select(EntityType::ALL.to_vec())
}

fn action() -> impl Strategy<Value = Action> {
    select(Action::ALL.to_vec())
}

fn scope() -> impl Strategy<Value = Option<Scope>> {
    proptest::option::of(select(Scope::ALL.to_vec()))
}

fn identity() -> impl Strategy<Value = String> {
    "u[1-3]"
}

fn actor() -> impl Strategy<Value = Actor> {
    (identity(), role()).prop_map(|(id, role)| Actor::new(id, role))
}

/// Well-formed entity: owned, global, or global with a recorded creator.
fn entity() -> impl Strategy<Value = EntityRef> {
    ("[a-z]{1,6}", proptest::option::of(identity()), any::<bool>()).prop_map(
        |(id, owner, global)| match (owner, global) {
            (Some(owner), false) => EntityRef::owned(id, owner),
            (Some(owner), true) => EntityRef::global_with_creator(id, owner),
            (None, _) => EntityRef::global(id),
        },
    )
}

/// Arbitrary valid table: random deltas per (type, role, action).
fn policy_table() -> impl Strategy<Value = PolicyTable> {
    let cells = EntityType::ALL.len() * Role::ALL.len() * Action::CONCRETE.len();
    (
        proptest::collection::vec(0u8..4, cells),
        proptest::collection::vec(any::<bool>(), EntityType::ALL.len()),
    )
        .prop_map(|(bits, ownable)| {
            let mut bits = bits.into_iter();
            let entries = EntityType::ALL
                .into_iter()
                .zip(ownable)
                .map(|(entity_type, ownable)| {
                    let mut policy = if ownable {
                        EntityPolicy::ownable()
                    } else {
                        EntityPolicy::unowned()
                    };
                    for role in Role::ALL {
                        for action in Action::CONCRETE {
                            let mut scopes = Scopes::from_bits_truncate(bits.next().unwrap_or(0));
                            if !ownable {
                                scopes.remove(Scopes::OWN);
                            }
                            policy = policy.grant(role, action, scopes);
                        }
                    }
                    (entity_type, policy)
                })
                .collect();
            PolicyTable::try_new(entries).expect("generated table is valid")
        })
}

fn check(
    evaluator: &Evaluator,
    actor: Option<&Actor>,
    entity_type: EntityType,
    entity: &EntityRef,
    action: Action,
    scope: Option<Scope>,
) -> PermissionCheckResult {
    let ctx = PermissionContext::new(actor, entity_type, action)
        .on(entity)
        .with_optional_scope(scope);
    evaluator.evaluate(&ctx)
}

// ─── Exhaustive Checks ────────────────────────────────────────

#[test]
fn builtin_roles_are_monotonic() {
    for (i, low) in Role::ALL.into_iter().enumerate() {
        for high in Role::ALL.into_iter().skip(i) {
            assert!(
                capabilities_for(low).is_subset_of(&capabilities_for(high)),
                "{low} must not exceed {high}"
            );
        }
    }
}

// ─── Property-Based Tests ─────────────────────────────────────

proptest! {
    /// Monotonicity holds for any table, not just the builtin one
    #[test]
    fn any_table_is_monotonic(table in policy_table()) {
        for (i, low) in Role::ALL.into_iter().enumerate() {
            for high in Role::ALL.into_iter().skip(i) {
                prop_assert!(table.capabilities(low).is_subset_of(&table.capabilities(high)));
            }
        }
    }

    /// Admin may do everything, whatever scope is named
    #[test]
    fn admin_is_total(
        table in policy_table(),
        id in identity(),
        entity_type in entity_type(),
        entity in entity(),
        action in action(),
        scope in scope(),
    ) {
        let evaluator = Evaluator::new(table);
        let admin = Actor::new(id, Role::Admin);
        let result = check(&evaluator, Some(&admin), entity_type, &entity, action, scope);
        prop_assert_eq!(result, PermissionCheckResult::allow());

        let type_level = PermissionContext::new(Some(&admin), entity_type, action)
            .with_optional_scope(scope);
        prop_assert_eq!(evaluator.evaluate(&type_level), PermissionCheckResult::allow());
    }

    /// Anonymous callers are always denied with the same reason
    #[test]
    fn unauthenticated_always_denied(
        entity_type in entity_type(),
        entity in entity(),
        action in action(),
        scope in scope(),
    ) {
        let result = check(&Evaluator::default(), None, entity_type, &entity, action, scope);
        prop_assert_eq!(result, PermissionCheckResult::deny(DenyReason::Unauthenticated, false));
    }

    /// Global content is satisfied only by an `any` grant
    #[test]
    fn global_never_satisfied_by_own(
        actor in actor(),
        entity_type in entity_type(),
        owner in proptest::option::of(identity()),
        action in action(),
    ) {
        let evaluator = Evaluator::default();
        let entity = match owner {
            Some(owner) => EntityRef::global_with_creator("g", owner),
            None => EntityRef::global("g"),
        };
        let holds_any = evaluator
            .capabilities_for(actor.role)
            .allows(entity_type, action, Scope::Any);

        for scope in [None, Some(Scope::Own), Some(Scope::Any)] {
            let result = check(&evaluator, Some(&actor), entity_type, &entity, action, scope);
            let own_on_unowned = scope == Some(Scope::Own)
                && actor.role != Role::Admin
                && !evaluator.policy().entity(entity_type).is_ownable();
            prop_assert_eq!(result.allowed, holds_any && !own_on_unowned);
        }
    }

    /// Denials never carry an elevation hint that no higher role would honor
    #[test]
    fn elevation_implies_higher_role_allowed(
        actor in actor(),
        entity_type in entity_type(),
        entity in entity(),
        action in action(),
        scope in scope(),
    ) {
        let evaluator = Evaluator::default();
        let result = check(&evaluator, Some(&actor), entity_type, &entity, action, scope);
        if result.requires_elevation {
            prop_assert!(!result.allowed);
            let upgraded = actor.role.above().any(|role| {
                let higher = Actor::new(actor.id.clone(), role);
                check(&evaluator, Some(&higher), entity_type, &entity, action, scope).allowed
            });
            prop_assert!(upgraded);
        }
        if result.allowed {
            prop_assert_eq!(result, PermissionCheckResult::allow());
        }
        if result.reason == Some(DenyReason::GlobalContentRequiresElevatedRole) {
            prop_assert!(entity.is_global());
            prop_assert!(evaluator
                .capabilities_for(actor.role)
                .allows(entity_type, action, Scope::Own));
        }
    }

    /// Bulk results partition the input and preserve its order
    #[test]
    fn bulk_partitions_in_order(
        actor in proptest::option::of(actor()),
        entities in proptest::collection::vec(entity(), 0..24),
        entity_type in entity_type(),
        action in action(),
        scope in scope(),
    ) {
        let evaluator = Evaluator::default();
        let result = evaluator
            .evaluate_bulk(actor.as_ref(), &entities, entity_type, action, scope)
            .expect("well-formed entities");

        prop_assert_eq!(result.len(), entities.len());

        let (expected_allowed, expected_denied): (Vec<&EntityRef>, Vec<&EntityRef>) = entities
            .iter()
            .partition(|e| check(&evaluator, actor.as_ref(), entity_type, e, action, scope).allowed);

        prop_assert!(result
            .allowed
            .iter()
            .zip(&expected_allowed)
            .all(|(a, b)| std::ptr::eq(*a, *b)));
        prop_assert!(result
            .denied
            .iter()
            .zip(&expected_denied)
            .all(|(a, b)| std::ptr::eq(*a, *b)));
        prop_assert_eq!(result.allowed_count(), expected_allowed.len());
        prop_assert_eq!(result.denied_count(), expected_denied.len());

        let any = evaluator
            .can_perform_action_on_any(actor.as_ref(), &entities, entity_type, action, scope)
            .expect("well-formed entities");
        prop_assert_eq!(any, !expected_allowed.is_empty());
    }
}
