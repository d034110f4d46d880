//! Per-role capability cache.
//!
//! Building a [`Capabilities`] matrix is cheap but not free, and the same
//! few roles are asked about on every render. [`CapabilityCache`] builds each
//! role's matrix once and hands out shared `Arc`s.
//!
//! # Concurrency
//!
//! Two threads that miss on the same role at the same moment both build
//! the matrix; the first insert wins and the other copy is dropped.
//! Building is deterministic, so this is wasted work, never a different
//! answer.
//!
//! # Redefinition
//!
//! A cache is bound to one [`PolicyTable`] for its whole life. To change
//! policy, build a new cache (or a new [`Evaluator`](crate::Evaluator)).
//! Matrices are never patched in place.

use crate::capability::Capabilities;
use crate::policy::PolicyTable;
use armory_types::Role;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static BUILTIN: LazyLock<Arc<CapabilityCache>> =
    LazyLock::new(|| Arc::new(CapabilityCache::new(PolicyTable::builtin())));

/// Lazily built capability matrices keyed by [`Role`].
#[derive(Debug)]
pub struct CapabilityCache {
    table: Arc<PolicyTable>,
    built: RwLock<HashMap<Role, Arc<Capabilities>>>,
}

impl CapabilityCache {
    /// Creates an empty cache over `table`.
    #[must_use]
    pub fn new(table: PolicyTable) -> Self {
        Self {
            table: Arc::new(table),
            built: RwLock::new(HashMap::with_capacity(Role::ALL.len())),
        }
    }

    /// Process-wide cache over [`PolicyTable::builtin`].
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// The policy this cache was built from.
    #[must_use]
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Matrix for `role`, building it on first use.
    #[must_use]
    pub fn get(&self, role: Role) -> Arc<Capabilities> {
        if let Some(caps) = self.built.read().get(&role) {
            return Arc::clone(caps);
        }

        let caps = Arc::new(self.table.capabilities(role));
        tracing::debug!(role = %role, "capability matrix built");

        let mut built = self.built.write();
        Arc::clone(built.entry(role).or_insert(caps))
    }

    /// Builds every role's matrix up front.
    pub fn warm(&self) {
        for role in Role::ALL {
            let _ = self.get(role);
        }
    }

    /// Number of roles with a built matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.built.read().len()
    }

    /// Returns `true` if no matrix has been built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.built.read().is_empty()
    }
}

/// Capability matrix for `role` under the builtin policy.
///
/// # Example
///
/// ```
/// use armory_auth::capabilities_for;
/// use armory_types::{Action, EntityType, Role};
///
/// // Show the "Add item" button?
/// assert!(capabilities_for(Role::Member).permits_any_scope(EntityType::Item, Action::Create));
/// assert!(!capabilities_for(Role::Pending).permits_any_scope(EntityType::Item, Action::Create));
/// ```
#[must_use]
pub fn capabilities_for(role: Role) -> Arc<Capabilities> {
    BUILTIN.get(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_builds_once_and_shares() {
        let cache = CapabilityCache::new(PolicyTable::builtin());
        assert!(cache.is_empty());

        let a = cache.get(Role::Member);
        let b = cache.get(Role::Member);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn warm_builds_every_role() {
        let cache = CapabilityCache::new(PolicyTable::builtin());
        cache.warm();
        assert_eq!(cache.len(), Role::ALL.len());
        for role in Role::ALL {
            assert_eq!(cache.get(role).role(), role);
        }
    }

    #[test]
    fn cached_matches_fresh_build() {
        let table = PolicyTable::builtin();
        let cache = CapabilityCache::new(table.clone());
        for role in Role::ALL {
            assert_eq!(*cache.get(role), table.capabilities(role));
        }
    }

    #[test]
    fn builtin_cache_is_shared() {
        assert!(Arc::ptr_eq(
            &CapabilityCache::builtin(),
            &CapabilityCache::builtin()
        ));
        assert_eq!(capabilities_for(Role::Editor).role(), Role::Editor);
    }

    #[test]
    fn concurrent_misses_converge() {
        let cache = Arc::new(CapabilityCache::new(PolicyTable::builtin()));
        let results: Vec<Arc<Capabilities>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let cache = Arc::clone(&cache);
                    s.spawn(move || cache.get(Role::Admin))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread should not panic"))
                .collect()
        });

        assert_eq!(cache.len(), 1);
        let first = cache.get(Role::Admin);
        for caps in results {
            assert_eq!(*caps, *first);
        }
    }
}
