//! UI affordances derived from capability matrices.
//!
//! The presentation layer decides which tabs and buttons to show before any
//! entity exists. Every flag here is read off a [`Capabilities`] matrix,
//! never off the role name, so a policy change moves the UI with it.

use crate::capability::Capabilities;
use crate::evaluator::{Evaluator, PermissionContext};
use armory_types::{Action, Actor, EntityRef, EntityType, Scope};
use serde::Serialize;

/// Capability flags for navigation and toolbars.
///
/// "Manage" flags mean the role can read, create, update and delete the
/// type at least on its own content. Global-content flags require `any`
/// on every entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Affordances {
    /// Full CRUD on tiers.
    pub can_manage_tiers: bool,
    /// Full CRUD on categories, at least on own content.
    pub can_manage_categories: bool,
    /// Full CRUD on types, at least on own content.
    pub can_manage_types: bool,
    /// Full CRUD on subtypes, at least on own content.
    pub can_manage_subtypes: bool,
    /// Full CRUD on field definitions.
    pub can_manage_field_definitions: bool,
    /// Full CRUD on dropdown groups.
    pub can_manage_dropdown_groups: bool,

    /// May create items.
    pub can_create_items: bool,
    /// May update items the actor created.
    pub can_edit_own_items: bool,
    /// May update any item.
    pub can_edit_all_items: bool,
    /// May delete items the actor created.
    pub can_delete_own_items: bool,
    /// May delete any item.
    pub can_delete_all_items: bool,

    /// May create schematics.
    pub can_create_schematics: bool,
    /// May update schematics the actor created.
    pub can_edit_own_schematics: bool,
    /// May update any schematic.
    pub can_edit_all_schematics: bool,
    /// May delete schematics the actor created.
    pub can_delete_own_schematics: bool,
    /// May delete any schematic.
    pub can_delete_all_schematics: bool,

    /// May create every entity type in `any` scope.
    pub can_create_global_content: bool,
    /// May update and delete every entity type in `any` scope.
    pub can_manage_global_content: bool,

    /// Can shape the catalog hierarchy (categories, types, subtypes).
    pub is_system_builder: bool,
    /// Holds `any` on every cell.
    pub is_administrator: bool,
}

impl Affordances {
    /// Everything off. Used for unauthenticated callers.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Reads the flags off `caps`.
    #[must_use]
    pub fn from_capabilities(caps: &Capabilities) -> Self {
        let manages = |t: EntityType| caps.permits_any_scope(t, Action::Manage);
        let all_types = |action: Action| {
            EntityType::ALL
                .into_iter()
                .all(|t| caps.allows(t, action, Scope::Any))
        };

        let can_manage_categories = manages(EntityType::Category);
        let can_manage_types = manages(EntityType::Type);
        let can_manage_subtypes = manages(EntityType::Subtype);

        Self {
            can_manage_tiers: manages(EntityType::Tier),
            can_manage_categories,
            can_manage_types,
            can_manage_subtypes,
            can_manage_field_definitions: manages(EntityType::FieldDefinition),
            can_manage_dropdown_groups: manages(EntityType::DropdownGroup),

            can_create_items: caps.permits_any_scope(EntityType::Item, Action::Create),
            can_edit_own_items: caps.allows(EntityType::Item, Action::Update, Scope::Own),
            can_edit_all_items: caps.allows(EntityType::Item, Action::Update, Scope::Any),
            can_delete_own_items: caps.allows(EntityType::Item, Action::Delete, Scope::Own),
            can_delete_all_items: caps.allows(EntityType::Item, Action::Delete, Scope::Any),

            can_create_schematics: caps.permits_any_scope(EntityType::Schematic, Action::Create),
            can_edit_own_schematics: caps.allows(EntityType::Schematic, Action::Update, Scope::Own),
            can_edit_all_schematics: caps.allows(EntityType::Schematic, Action::Update, Scope::Any),
            can_delete_own_schematics: caps.allows(EntityType::Schematic, Action::Delete, Scope::Own),
            can_delete_all_schematics: caps.allows(EntityType::Schematic, Action::Delete, Scope::Any),

            can_create_global_content: all_types(Action::Create),
            can_manage_global_content: all_types(Action::Update) && all_types(Action::Delete),

            is_system_builder: can_manage_categories || can_manage_types || can_manage_subtypes,
            is_administrator: caps
                .iter()
                .all(|(_, _, scopes)| scopes.has(Scope::Any)),
        }
    }

    /// Show the items tab.
    #[must_use]
    pub fn show_items_tab(&self) -> bool {
        self.can_create_items || self.can_edit_own_items
    }

    /// Show the schematics tab.
    #[must_use]
    pub fn show_schematics_tab(&self) -> bool {
        self.can_create_schematics || self.can_edit_own_schematics
    }

    /// Show the create-item button.
    #[must_use]
    pub fn show_create_item_button(&self) -> bool {
        self.can_create_items
    }

    /// Show the create-schematic button.
    #[must_use]
    pub fn show_create_schematic_button(&self) -> bool {
        self.can_create_schematics
    }

    /// Show hierarchy management buttons.
    #[must_use]
    pub fn show_management_buttons(&self) -> bool {
        self.is_system_builder
    }

    /// Field definitions and dropdown groups are editable.
    #[must_use]
    pub fn can_access_system_configuration(&self) -> bool {
        self.can_manage_field_definitions && self.can_manage_dropdown_groups
    }

    /// Contributor without moderation rights.
    #[must_use]
    pub fn has_limited_access(&self) -> bool {
        self.can_create_items && !self.is_system_builder
    }

    /// Hierarchy management needs a role upgrade.
    #[must_use]
    pub fn requires_elevation(&self) -> bool {
        !self.is_system_builder
    }
}

/// Per-action verdicts for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityPermissions {
    /// Read verdict.
    pub can_read: bool,
    /// Create verdict.
    pub can_create: bool,
    /// Update verdict.
    pub can_update: bool,
    /// Delete verdict.
    pub can_delete: bool,
    /// Manage verdict (all four concrete actions).
    pub can_manage: bool,
}

impl Evaluator {
    /// Affordances for `actor`; all off when unauthenticated.
    ///
    /// # Example
    ///
    /// ```
    /// use armory_auth::Evaluator;
    /// use armory_types::{Actor, Role};
    ///
    /// let evaluator = Evaluator::default();
    /// let member = evaluator.affordances(Some(&Actor::new("u1", Role::Member)));
    /// assert!(member.can_create_items);
    /// assert!(!member.is_system_builder);
    /// assert!(!evaluator.affordances(None).show_items_tab());
    /// ```
    #[must_use]
    pub fn affordances(&self, actor: Option<&Actor>) -> Affordances {
        match actor {
            Some(actor) => Affordances::from_capabilities(&self.capabilities_for(actor.role)),
            None => Affordances::none(),
        }
    }

    /// Checks all five actions against `entity`.
    #[must_use]
    pub fn entity_permissions(
        &self,
        actor: Option<&Actor>,
        entity_type: EntityType,
        entity: &EntityRef,
    ) -> EntityPermissions {
        let allowed = |action: Action| {
            let ctx = PermissionContext::new(actor, entity_type, action).on(entity);
            self.evaluate(&ctx).allowed
        };

        EntityPermissions {
            can_read: allowed(Action::Read),
            can_create: allowed(Action::Create),
            can_update: allowed(Action::Update),
            can_delete: allowed(Action::Delete),
            can_manage: allowed(Action::Manage),
        }
    }
}
