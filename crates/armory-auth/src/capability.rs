//! Capability matrix.
//!
//! A [`Capabilities`] value answers "which scopes does this role hold for
//! `(entity type, action)`" for every pair in the catalog:
//!
//! ```text
//!                 read      create    update    delete
//! tier            {any,own} {}        {own}     {own}
//! category        {any,own} {any,own} {own}     {own}
//! ...
//! ```
//!
//! The matrix is dense: every `(EntityType, concrete Action)` cell exists,
//! so a lookup can never miss. `Manage` is answered as the intersection of
//! the four concrete columns.
//!
//! Matrices are built by [`PolicyTable::capabilities`](crate::PolicyTable::capabilities)
//! and are immutable afterwards; share them behind `Arc`.
//!
//! # Example
//!
//! ```
//! use armory_auth::{capabilities_for, Scopes};
//! use armory_types::{Action, EntityType, Role, Scope};
//!
//! let member = capabilities_for(Role::Member);
//! assert!(member.allows(EntityType::Item, Action::Update, Scope::Own));
//! assert!(!member.allows(EntityType::Item, Action::Update, Scope::Any));
//! assert_eq!(member.scopes(EntityType::FieldDefinition, Action::Update), Scopes::empty());
//! ```

use armory_types::{Action, EntityType, Role, Scope};
use bitflags::bitflags;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

bitflags! {
    /// Set of granted [`Scope`]s for one `(entity type, action)` cell.
    ///
    /// | Flag | Scope |
    /// |------|-------|
    /// | [`OWN`](Self::OWN) | [`Scope::Own`] |
    /// | [`ANY`](Self::ANY) | [`Scope::Any`] |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Scopes: u8 {
        /// Entities owned by the actor.
        const OWN = 0b01;
        /// Any entity of the type.
        const ANY = 0b10;
    }
}

impl Scopes {
    /// Flag for a single scope.
    #[must_use]
    pub const fn of(scope: Scope) -> Self {
        match scope {
            Scope::Own => Self::OWN,
            Scope::Any => Self::ANY,
        }
    }

    /// Returns `true` if `scope` is in the set.
    #[must_use]
    pub fn has(self, scope: Scope) -> bool {
        self.contains(Self::of(scope))
    }

    /// Scopes in the set, `Own` first.
    #[must_use]
    pub fn to_vec(self) -> Vec<Scope> {
        Scope::ALL.into_iter().filter(|s| self.has(*s)).collect()
    }
}

impl std::fmt::Display for Scopes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.to_vec().into_iter().map(Scope::as_str).collect();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

/// Number of concrete action columns.
pub(crate) const COLUMNS: usize = Action::CONCRETE.len();

/// Number of entity type rows.
pub(crate) const ROWS: usize = EntityType::ALL.len();

/// One row of a matrix: scopes per concrete action.
pub(crate) type Row = [Scopes; COLUMNS];

/// Read-only capability matrix for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    role: Role,
    cells: [Row; ROWS],
}

impl Capabilities {
    pub(crate) fn from_rows(role: Role, cells: [Row; ROWS]) -> Self {
        Self { role, cells }
    }

    /// Role this matrix was built for.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Granted scopes for `(entity_type, action)`.
    ///
    /// For [`Action::Manage`] this is the intersection of the four concrete
    /// actions: a scope is granted for `manage` only if it is granted for
    /// read, create, update and delete.
    #[must_use]
    pub fn scopes(&self, entity_type: EntityType, action: Action) -> Scopes {
        let row = &self.cells[entity_type.row()];
        match action.column() {
            Some(col) => row[col],
            None => row.iter().fold(Scopes::all(), |acc, s| acc & *s),
        }
    }

    /// Returns `true` if `scope` is granted for `(entity_type, action)`.
    #[must_use]
    pub fn allows(&self, entity_type: EntityType, action: Action, scope: Scope) -> bool {
        self.scopes(entity_type, action).has(scope)
    }

    /// Returns `true` if any scope at all is granted for `(entity_type, action)`.
    ///
    /// This is the type-level question "can this role ever do this".
    #[must_use]
    pub fn permits_any_scope(&self, entity_type: EntityType, action: Action) -> bool {
        !self.scopes(entity_type, action).is_empty()
    }

    /// Returns `true` if every grant in `self` is also in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.cells
            .iter()
            .flatten()
            .zip(other.cells.iter().flatten())
            .all(|(mine, theirs)| theirs.contains(*mine))
    }

    /// Iterates over every concrete cell.
    pub fn iter(&self) -> impl Iterator<Item = (EntityType, Action, Scopes)> + '_ {
        EntityType::ALL.into_iter().flat_map(move |t| {
            Action::CONCRETE
                .into_iter()
                .map(move |a| (t, a, self.scopes(t, a)))
        })
    }
}

/// Serializes as `{ "item": { "read": ["own", "any"], ... }, ... }`.
impl Serialize for Capabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct RowView<'a>(&'a Row);

        impl Serialize for RowView<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(COLUMNS))?;
                for action in Action::CONCRETE {
                    if let Some(col) = action.column() {
                        map.serialize_entry(action.as_str(), &self.0[col].to_vec())?;
                    }
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(ROWS))?;
        for entity_type in EntityType::ALL {
            map.serialize_entry(entity_type.as_str(), &RowView(&self.cells[entity_type.row()]))?;
        }
        map.end()
    }
}
