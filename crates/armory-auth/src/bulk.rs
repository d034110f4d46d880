//! Permission checks over collections.
//!
//! Each entity is checked independently with [`Evaluator::evaluate`]; the
//! bulk result is just the stable partition of the input. `allowed` and
//! `denied` keep the input's relative order so callers can map verdicts
//! back to display rows.
//!
//! Entities are anything [`Ownable`]. An implementor that reports no owner
//! while claiming not to be global breaks the owner/global invariant; the
//! bulk operations surface that as [`EntityError`] instead of guessing.

use crate::evaluator::{Evaluator, PermissionCheckResult, PermissionContext};
use armory_types::{Action, Actor, EntityError, EntityRef, EntityType, Ownable, Scope};

/// Stable partition of a collection by verdict.
#[derive(Debug)]
pub struct BulkResult<'a, T> {
    /// Entities the action is allowed on, in input order.
    pub allowed: Vec<&'a T>,
    /// Entities the action is denied on, in input order.
    pub denied: Vec<&'a T>,
}

impl<'a, T> BulkResult<'a, T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            allowed: Vec::with_capacity(capacity),
            denied: Vec::with_capacity(capacity),
        }
    }

    /// Number of allowed entities.
    #[must_use]
    pub fn allowed_count(&self) -> usize {
        self.allowed.len()
    }

    /// Number of denied entities.
    #[must_use]
    pub fn denied_count(&self) -> usize {
        self.denied.len()
    }

    /// Total entities checked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.len() + self.denied.len()
    }

    /// Returns `true` if the input was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if every entity was allowed.
    #[must_use]
    pub fn all_allowed(&self) -> bool {
        self.denied.is_empty()
    }
}

impl Evaluator {
    /// Checks `action` on every entity and partitions the input.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError`] if any entity breaks the owner/global
    /// invariant.
    ///
    /// # Example
    ///
    /// ```
    /// use armory_auth::Evaluator;
    /// use armory_types::{Action, Actor, EntityRef, EntityType, Role, Scope};
    ///
    /// let actor = Actor::new("u1", Role::Member);
    /// let items = vec![
    ///     EntityRef::owned("a", "u1"),
    ///     EntityRef::owned("b", "u2"),
    ///     EntityRef::owned("c", "u1"),
    /// ];
    ///
    /// let result = Evaluator::default()
    ///     .evaluate_bulk(Some(&actor), &items, EntityType::Item, Action::Update, Some(Scope::Own))
    ///     .expect("valid entities");
    /// assert_eq!(result.allowed_count(), 2);
    /// assert_eq!(result.denied[0].id().as_str(), "b");
    /// ```
    pub fn evaluate_bulk<'a, T: Ownable>(
        &self,
        actor: Option<&Actor>,
        entities: &'a [T],
        entity_type: EntityType,
        action: Action,
        scope: Option<Scope>,
    ) -> Result<BulkResult<'a, T>, EntityError> {
        let mut result = BulkResult::with_capacity(entities.len());
        for entity in entities {
            if self.check_one(actor, entity, entity_type, action, scope)?.allowed {
                result.allowed.push(entity);
            } else {
                result.denied.push(entity);
            }
        }

        tracing::debug!(
            actor = ?actor.map(|a| a.id.as_str()),
            entity_type = %entity_type,
            action = %action,
            allowed = result.allowed_count(),
            denied = result.denied_count(),
            "bulk permission check"
        );
        Ok(result)
    }

    /// The allowed subset of `entities`, in input order.
    ///
    /// An unauthenticated caller gets an empty list without any entity
    /// being inspected.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError`] if any entity breaks the owner/global
    /// invariant.
    pub fn filter_entities_by_permission<'a, T: Ownable>(
        &self,
        actor: Option<&Actor>,
        entities: &'a [T],
        entity_type: EntityType,
        action: Action,
        scope: Option<Scope>,
    ) -> Result<Vec<&'a T>, EntityError> {
        if actor.is_none() {
            return Ok(Vec::new());
        }
        Ok(self
            .evaluate_bulk(actor, entities, entity_type, action, scope)?
            .allowed)
    }

    /// Returns `true` if `action` is allowed on at least one entity.
    ///
    /// Stops at the first allowed entity; later entities are not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError`] if an entity inspected before the first
    /// allowed one breaks the owner/global invariant.
    pub fn can_perform_action_on_any<T: Ownable>(
        &self,
        actor: Option<&Actor>,
        entities: &[T],
        entity_type: EntityType,
        action: Action,
        scope: Option<Scope>,
    ) -> Result<bool, EntityError> {
        for entity in entities {
            if self.check_one(actor, entity, entity_type, action, scope)?.allowed {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn check_one<T: Ownable>(
        &self,
        actor: Option<&Actor>,
        entity: &T,
        entity_type: EntityType,
        action: Action,
        scope: Option<Scope>,
    ) -> Result<PermissionCheckResult, EntityError> {
        let entity = EntityRef::from_ownable(entity)?;
        let ctx = PermissionContext::new(actor, entity_type, action)
            .on(&entity)
            .with_optional_scope(scope);
        Ok(self.evaluate(&ctx))
    }
}
