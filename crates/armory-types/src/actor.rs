//! The acting identity.

use crate::{Identity, Role};
use serde::{Deserialize, Serialize};

/// An authenticated identity together with its role.
///
/// Actors are snapshots taken from the identity source per request. An
/// unauthenticated caller is represented by `Option<&Actor>::None`, not by
/// a special actor value.
///
/// # Why No Default?
///
/// There is no sensible default identity, so `Actor` deliberately does not
/// implement `Default`.
///
/// # Example
///
/// ```
/// use armory_types::{Actor, Identity, Role};
///
/// let actor = Actor::new("u1", Role::Member);
/// assert_eq!(actor.id, Identity::new("u1"));
/// assert!(actor.is(&Identity::new("u1")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Account identifier.
    pub id: Identity,
    /// Current role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor snapshot.
    #[must_use]
    pub fn new(id: impl Into<Identity>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Returns `true` if `identity` is this actor.
    #[must_use]
    pub fn is(&self, identity: &Identity) -> bool {
        &self.id == identity
    }
}
