//! Catalog entity types and ownership references.
//!
//! Every record type in the catalog exposes the same three facts to the
//! permission layer through [`Ownable`]: its id, its owner, and whether it
//! is global content. [`EntityRef`] is the validated snapshot of those
//! facts that evaluators consume.
//!
//! # Owner / Global Invariant
//!
//! | `owner` | `is_global` | Meaning |
//! |---------|-------------|---------|
//! | `None` | `true` | Seeded or system content |
//! | `Some(id)` | `false` | Owned by `id` |
//! | `Some(id)` | `true` | Created by `id` but flagged global; the flag wins |
//! | `None` | `false` | **Invalid**, rejected with [`EntityError`] |

use crate::{EntityId, ErrorCode, Identity, TryNew};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of catalog record, from the top of the hierarchy down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Tier,
    Category,
    Type,
    Subtype,
    FieldDefinition,
    DropdownGroup,
    Item,
    Schematic,
}

impl EntityType {
    /// Every entity type, in matrix row order.
    pub const ALL: [Self; 8] = [
        Self::Tier,
        Self::Category,
        Self::Type,
        Self::Subtype,
        Self::FieldDefinition,
        Self::DropdownGroup,
        Self::Item,
        Self::Schematic,
    ];

    /// Row index in a capability matrix.
    #[must_use]
    pub const fn row(self) -> usize {
        match self {
            Self::Tier => 0,
            Self::Category => 1,
            Self::Type => 2,
            Self::Subtype => 3,
            Self::FieldDefinition => 4,
            Self::DropdownGroup => 5,
            Self::Item => 6,
            Self::Schematic => 7,
        }
    }

    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tier => "tier",
            Self::Category => "category",
            Self::Type => "type",
            Self::Subtype => "subtype",
            Self::FieldDefinition => "field_definition",
            Self::DropdownGroup => "dropdown_group",
            Self::Item => "item",
            Self::Schematic => "schematic",
        }
    }

    /// Parses a type name (case-insensitive, `-` accepted for `_`).
    ///
    /// ```
    /// use armory_types::EntityType;
    ///
    /// assert_eq!(EntityType::parse("field-definition"), Some(EntityType::FieldDefinition));
    /// assert_eq!(EntityType::parse("Schematic"), Some(EntityType::Schematic));
    /// assert_eq!(EntityType::parse("recipe"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == normalized)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership facts a record exposes to the permission layer.
///
/// Implement this for each concrete record type (items, schematics, ...)
/// so evaluators depend on one abstraction instead of per-type shapes.
///
/// # Example
///
/// ```
/// use armory_types::{EntityId, Identity, Ownable};
///
/// struct Item {
///     id: EntityId,
///     created_by: Option<Identity>,
///     is_global: bool,
/// }
///
/// impl Ownable for Item {
///     fn entity_id(&self) -> &EntityId { &self.id }
///     fn owner(&self) -> Option<&Identity> { self.created_by.as_ref() }
///     fn is_global(&self) -> bool { self.is_global }
/// }
/// ```
pub trait Ownable {
    /// Record id.
    fn entity_id(&self) -> &EntityId;

    /// Creator of the record, if any.
    fn owner(&self) -> Option<&Identity>;

    /// Whether the record is global content.
    ///
    /// Defaults to "has no owner". Override when the store keeps an
    /// explicit flag.
    fn is_global(&self) -> bool {
        self.owner().is_none()
    }
}

/// Error for entity references that break the owner/global invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// `owner` is absent but the record is not flagged global.
    #[error("{id} has no owner but is not flagged global")]
    UnownedNotGlobal {
        /// Offending record.
        id: EntityId,
    },
}

impl ErrorCode for EntityError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnownedNotGlobal { .. } => "ENTITY_UNOWNED_NOT_GLOBAL",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Validated ownership snapshot of a single record.
///
/// Fields are private so an `EntityRef` always satisfies the owner/global
/// invariant. Construct with [`global`](Self::global),
/// [`owned`](Self::owned), [`TryNew::try_new`], or
/// [`from_ownable`](Self::from_ownable).
///
/// # Example
///
/// ```
/// use armory_types::{EntityRef, Identity, TryNew};
///
/// let seeded = EntityRef::global("tier-1");
/// assert!(seeded.is_global());
///
/// let mine = EntityRef::owned("item-1", "u1");
/// assert_eq!(mine.owner(), Some(&Identity::new("u1")));
///
/// let invalid = EntityRef::try_new(("item-2".into(), None, false));
/// assert!(invalid.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityRef {
    id: EntityId,
    owner: Option<Identity>,
    is_global: bool,
}

impl EntityRef {
    /// Global content with no owner.
    #[must_use]
    pub fn global(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            owner: None,
            is_global: true,
        }
    }

    /// Non-global content owned by `owner`.
    #[must_use]
    pub fn owned(id: impl Into<EntityId>, owner: impl Into<Identity>) -> Self {
        Self {
            id: id.into(),
            owner: Some(owner.into()),
            is_global: false,
        }
    }

    /// Content created by `owner` but flagged global by policy.
    #[must_use]
    pub fn global_with_creator(id: impl Into<EntityId>, owner: impl Into<Identity>) -> Self {
        Self {
            id: id.into(),
            owner: Some(owner.into()),
            is_global: true,
        }
    }

    /// Snapshots any [`Ownable`] record.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::UnownedNotGlobal`] if the record reports no
    /// owner and `is_global() == false`.
    pub fn from_ownable<T: Ownable + ?Sized>(entity: &T) -> Result<Self, EntityError> {
        Self::try_new((
            entity.entity_id().clone(),
            entity.owner().cloned(),
            entity.is_global(),
        ))
    }

    /// Record id.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Creator, if any. Present does not imply owned: check
    /// [`is_global`](Self::is_global) first.
    #[must_use]
    pub fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    /// Authoritative global flag.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.is_global
    }
}

impl TryNew for EntityRef {
    type Error = EntityError;
    type Args = (EntityId, Option<Identity>, bool);

    fn try_new((id, owner, is_global): Self::Args) -> Result<Self, Self::Error> {
        if owner.is_none() && !is_global {
            return Err(EntityError::UnownedNotGlobal { id });
        }
        Ok(Self {
            id,
            owner,
            is_global,
        })
    }
}

impl Ownable for EntityRef {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    fn is_global(&self) -> bool {
        self.is_global
    }
}

impl<'de> Deserialize<'de> for EntityRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            id: EntityId,
            #[serde(default)]
            owner: Option<Identity>,
            is_global: Option<bool>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let is_global = raw.is_global.unwrap_or(raw.owner.is_none());
        Self::try_new((raw.id, raw.owner, is_global)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_error_code;

    struct Record {
        id: EntityId,
        created_by: Option<Identity>,
    }

    impl Ownable for Record {
        fn entity_id(&self) -> &EntityId {
            &self.id
        }
        fn owner(&self) -> Option<&Identity> {
            self.created_by.as_ref()
        }
    }

    struct BrokenRecord {
        id: EntityId,
    }

    impl Ownable for BrokenRecord {
        fn entity_id(&self) -> &EntityId {
            &self.id
        }
        fn owner(&self) -> Option<&Identity> {
            None
        }
        fn is_global(&self) -> bool {
            false
        }
    }

    #[test]
    fn rows_are_dense() {
        for (i, t) in EntityType::ALL.iter().enumerate() {
            assert_eq!(t.row(), i);
            assert_eq!(EntityType::parse(t.as_str()), Some(*t));
        }
    }

    #[test]
    fn unowned_must_be_global() {
        let err = EntityRef::try_new((EntityId::new("x"), None, false))
            .expect_err("unowned non-global should be rejected");
        assert_eq!(
            err,
            EntityError::UnownedNotGlobal {
                id: EntityId::new("x")
            }
        );
        assert_error_code(&err, "ENTITY_");
    }

    #[test]
    fn owner_may_coexist_with_global_flag() {
        let e = EntityRef::try_new((EntityId::new("x"), Some(Identity::new("u1")), true))
            .expect("creator on global content is allowed");
        assert!(e.is_global());
        assert_eq!(e.owner(), Some(&Identity::new("u1")));
        assert_eq!(e, EntityRef::global_with_creator("x", "u1"));
    }

    #[test]
    fn default_is_global_derives_from_owner() {
        let seeded = Record {
            id: EntityId::new("a"),
            created_by: None,
        };
        let owned = Record {
            id: EntityId::new("b"),
            created_by: Some(Identity::new("u1")),
        };

        assert!(EntityRef::from_ownable(&seeded).expect("valid").is_global());
        assert!(!EntityRef::from_ownable(&owned).expect("valid").is_global());
    }

    #[test]
    fn from_ownable_rejects_broken_implementor() {
        let broken = BrokenRecord {
            id: EntityId::new("z"),
        };
        assert!(EntityRef::from_ownable(&broken).is_err());
    }

    #[test]
    fn deserialize_validates_invariant() {
        let ok: EntityRef =
            serde_json::from_str(r#"{"id":"t1","owner":null}"#).expect("global when unowned");
        assert!(ok.is_global());

        let owned: EntityRef =
            serde_json::from_str(r#"{"id":"i1","owner":"u1"}"#).expect("owned");
        assert!(!owned.is_global());

        let bad = serde_json::from_str::<EntityRef>(r#"{"id":"i2","is_global":false}"#);
        assert!(bad.is_err());
    }
}
