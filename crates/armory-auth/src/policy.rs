//! Policy tables: per-role grant deltas for every entity type.
//!
//! # Structure
//!
//! ```text
//! PolicyTable
//! └── EntityPolicy (one per EntityType)
//!     ├── ownable: bool
//!     └── RoleDelta per role: Action → Scopes
//! ```
//!
//! # Building a Role's Matrix
//!
//! A role's grants are the union of the deltas of every role up to and
//! including it:
//!
//! ```text
//! grants(pending) = delta(pending)
//! grants(member)  = grants(pending) ∪ delta(member)
//! grants(editor)  = grants(member)  ∪ delta(editor)
//! grants(admin)   = grants(editor)  ∪ delta(admin) ∪ FULL
//! ```
//!
//! so a higher role can never hold less than a lower one. On top of the
//! fold:
//!
//! - `manage` entries are expanded to read/create/update/delete when the
//!   delta is written.
//! - On ownable types, `any` implies `own`.
//! - Admin receives `any` (and `own` where ownable) on every cell,
//!   whatever the table says.

use crate::capability::{Capabilities, Row, Scopes, COLUMNS, ROWS};
use armory_types::{Action, EntityType, ErrorCode, Role, TryNew};
use thiserror::Error;

/// Defects in a policy table definition.
///
/// These are configuration bugs, never access decisions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A loaded table does not define one of the entity types.
    #[error("policy table has no entry for entity type '{0}'")]
    MissingEntityType(EntityType),

    /// An entity type is defined twice.
    #[error("entity type '{0}' is defined more than once")]
    DuplicateEntityType(EntityType),

    /// `own` was granted on a type without per-user ownership.
    #[error("'own' scope granted to {role} on {entity_type}.{action}, but {entity_type} is not ownable")]
    OwnScopeOnUnownedType {
        /// Type marked `ownable = false`.
        entity_type: EntityType,
        /// Role whose delta holds the grant.
        role: Role,
        /// Concrete action carrying the grant.
        action: Action,
    },

    /// Unrecognized role name.
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    /// Unrecognized entity type name.
    #[error("unknown entity type '{0}'")]
    UnknownEntityType(String),

    /// Unrecognized action name.
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    /// Unrecognized scope name.
    #[error("unknown scope '{0}'")]
    UnknownScope(String),
}

impl ErrorCode for PolicyError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingEntityType(_) => "POLICY_MISSING_ENTITY_TYPE",
            Self::DuplicateEntityType(_) => "POLICY_DUPLICATE_ENTITY_TYPE",
            Self::OwnScopeOnUnownedType { .. } => "POLICY_OWN_SCOPE_ON_UNOWNED_TYPE",
            Self::UnknownRole(_) => "POLICY_UNKNOWN_ROLE",
            Self::UnknownEntityType(_) => "POLICY_UNKNOWN_ENTITY_TYPE",
            Self::UnknownAction(_) => "POLICY_UNKNOWN_ACTION",
            Self::UnknownScope(_) => "POLICY_UNKNOWN_SCOPE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Grants one role adds on top of the role below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleDelta {
    row: Row,
}

impl RoleDelta {
    /// An empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `scopes` for `action`. `Manage` adds them to every concrete action.
    #[must_use]
    pub fn grant(mut self, action: Action, scopes: Scopes) -> Self {
        self.add(action, scopes);
        self
    }

    pub(crate) fn add(&mut self, action: Action, scopes: Scopes) {
        for concrete in action.expand() {
            if let Some(col) = concrete.column() {
                self.row[col] |= scopes;
            }
        }
    }

    /// Scopes added for a concrete action. `Manage` yields the intersection.
    #[must_use]
    pub fn scopes(&self, action: Action) -> Scopes {
        match action.column() {
            Some(col) => self.row[col],
            None => self.row.iter().fold(Scopes::all(), |acc, s| acc & *s),
        }
    }

    /// Returns `true` if the delta grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row.iter().all(|s| s.is_empty())
    }
}

/// Policy for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPolicy {
    ownable: bool,
    deltas: [RoleDelta; Role::ALL.len()],
}

impl EntityPolicy {
    /// Policy for a type with per-user ownership. No grants yet.
    #[must_use]
    pub fn ownable() -> Self {
        Self {
            ownable: true,
            deltas: [RoleDelta::new(); Role::ALL.len()],
        }
    }

    /// Policy for a type without per-user ownership (only `any` is meaningful).
    #[must_use]
    pub fn unowned() -> Self {
        Self {
            ownable: false,
            ..Self::ownable()
        }
    }

    /// Adds `scopes` for `action` to `role`'s delta.
    #[must_use]
    pub fn grant(mut self, role: Role, action: Action, scopes: Scopes) -> Self {
        self.deltas[usize::from(role.rank())].add(action, scopes);
        self
    }

    /// Replaces `role`'s delta.
    #[must_use]
    pub fn with_delta(mut self, role: Role, delta: RoleDelta) -> Self {
        self.deltas[usize::from(role.rank())] = delta;
        self
    }

    /// Whether the `own` scope is meaningful for this type.
    #[must_use]
    pub fn is_ownable(&self) -> bool {
        self.ownable
    }

    /// Delta declared for `role`.
    #[must_use]
    pub fn delta(&self, role: Role) -> &RoleDelta {
        &self.deltas[usize::from(role.rank())]
    }

    fn validate(&self, entity_type: EntityType) -> Result<(), PolicyError> {
        if self.ownable {
            return Ok(());
        }
        for role in Role::ALL {
            for action in Action::CONCRETE {
                if self.delta(role).scopes(action).contains(Scopes::OWN) {
                    return Err(PolicyError::OwnScopeOnUnownedType {
                        entity_type,
                        role,
                        action,
                    });
                }
            }
        }
        Ok(())
    }

    /// Folds deltas up to `role` and applies the implied grants.
    fn resolve(&self, role: Role) -> Row {
        let mut row = [Scopes::empty(); COLUMNS];
        for r in role.up_to() {
            for (cell, added) in row.iter_mut().zip(self.delta(r).row) {
                *cell |= added;
            }
        }

        if role == Role::Admin {
            for cell in &mut row {
                *cell |= Scopes::ANY;
            }
        }

        if self.ownable {
            for cell in &mut row {
                if cell.contains(Scopes::ANY) {
                    *cell |= Scopes::OWN;
                }
            }
        }
        row
    }
}

/// Complete policy: one [`EntityPolicy`] per [`EntityType`].
///
/// Construct with [`PolicyTable::builtin`], [`TryNew::try_new`], or the
/// TOML loader in [`crate::config`].
///
/// # Example
///
/// ```
/// use armory_auth::{EntityPolicy, PolicyTable, Scopes};
/// use armory_types::{Action, EntityType, Role, Scope, TryNew};
///
/// let entries = EntityType::ALL
///     .into_iter()
///     .map(|t| (t, EntityPolicy::ownable().grant(Role::Member, Action::Read, Scopes::ANY)))
///     .collect::<Vec<_>>();
/// let table = PolicyTable::try_new(entries).expect("every type defined");
///
/// let member = table.capabilities(Role::Member);
/// assert!(member.allows(EntityType::Item, Action::Read, Scope::Any));
/// assert!(!member.allows(EntityType::Item, Action::Update, Scope::Own));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    entities: [EntityPolicy; ROWS],
}

impl PolicyTable {
    /// The deployment's default policy.
    ///
    /// | Type | member | editor | admin |
    /// |------|--------|--------|-------|
    /// | tier | read | update/delete own | everything |
    /// | category, type, subtype | read | create; update/delete own | everything |
    /// | field_definition, dropdown_group | read | read | everything |
    /// | item, schematic | read; create; update/delete own | update/delete any | everything |
    ///
    /// Pending accounts hold nothing.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entities: EntityType::ALL.map(builtin_entity_policy),
        }
    }

    /// Policy for `entity_type`.
    #[must_use]
    pub fn entity(&self, entity_type: EntityType) -> &EntityPolicy {
        &self.entities[entity_type.row()]
    }

    /// Builds the capability matrix for `role`.
    #[must_use]
    pub fn capabilities(&self, role: Role) -> Capabilities {
        let cells = EntityType::ALL.map(|t| self.entity(t).resolve(role));
        Capabilities::from_rows(role, cells)
    }

    /// Checks every entity policy for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] found.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for entity_type in EntityType::ALL {
            self.entity(entity_type).validate(entity_type)?;
        }
        Ok(())
    }
}

impl TryNew for PolicyTable {
    type Error = PolicyError;
    type Args = Vec<(EntityType, EntityPolicy)>;

    fn try_new(entries: Self::Args) -> Result<Self, Self::Error> {
        let mut slots: [Option<EntityPolicy>; ROWS] = Default::default();
        for (entity_type, policy) in entries {
            let slot = &mut slots[entity_type.row()];
            if slot.is_some() {
                return Err(PolicyError::DuplicateEntityType(entity_type));
            }
            policy.validate(entity_type)?;
            *slot = Some(policy);
        }

        let mut entities = Vec::with_capacity(ROWS);
        for (entity_type, slot) in EntityType::ALL.into_iter().zip(slots) {
            entities.push(slot.ok_or(PolicyError::MissingEntityType(entity_type))?);
        }
        let entities: [EntityPolicy; ROWS] = entities
            .try_into()
            .map_err(|_| PolicyError::MissingEntityType(EntityType::Tier))?;
        Ok(Self { entities })
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_entity_policy(entity_type: EntityType) -> EntityPolicy {
    use Action::{Create, Delete, Read, Update};
    use Role::{Editor, Member};

    match entity_type {
        EntityType::Tier => EntityPolicy::ownable()
            .grant(Member, Read, Scopes::ANY)
            .grant(Editor, Update, Scopes::OWN)
            .grant(Editor, Delete, Scopes::OWN),
        EntityType::Category | EntityType::Type | EntityType::Subtype => EntityPolicy::ownable()
            .grant(Member, Read, Scopes::ANY)
            .grant(Editor, Create, Scopes::ANY)
            .grant(Editor, Update, Scopes::OWN)
            .grant(Editor, Delete, Scopes::OWN),
        EntityType::FieldDefinition | EntityType::DropdownGroup => {
            EntityPolicy::unowned().grant(Member, Read, Scopes::ANY)
        }
        EntityType::Item | EntityType::Schematic => EntityPolicy::ownable()
            .grant(Member, Read, Scopes::ANY)
            .grant(Member, Create, Scopes::ANY)
            .grant(Member, Update, Scopes::OWN)
            .grant(Member, Delete, Scopes::OWN)
            .grant(Editor, Update, Scopes::ANY)
            .grant(Editor, Delete, Scopes::ANY),
    }
}
