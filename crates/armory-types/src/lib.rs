//! Core types for the armory catalog access layer.
//!
//! This crate holds the vocabulary shared by the permission evaluator and
//! its callers. It has no decision logic.
//!
//! # Crate Architecture
//!
//! ```text
//! armory-types  (Identity, Role, EntityType, Action, Scope, EntityRef)  ◄── HERE
//!     ↑
//! armory-auth   (PolicyTable, Capabilities, Evaluator, advisor)
//!     ↑
//! presentation layer / API handlers (callers)
//! ```
//!
//! # Closed Vocabularies
//!
//! Roles, entity types, actions, and scopes are closed enums. Adding a
//! variant forces every exhaustive `match` over it, including the builtin
//! policy table, to be revisited at compile time.
//!
//! # Example
//!
//! ```
//! use armory_types::{Action, Actor, EntityRef, EntityType, Role, Scope};
//!
//! let actor = Actor::new("u1", Role::Member);
//! let item = EntityRef::owned("item-7", "u1");
//!
//! assert!(actor.role.at_least(Role::Member));
//! assert_eq!(item.owner(), Some(&actor.id));
//! assert_eq!(EntityType::parse("item"), Some(EntityType::Item));
//! assert_eq!(Action::Manage.expand().len(), 4);
//! assert_eq!(Scope::parse("own"), Some(Scope::Own));
//! ```

mod action;
mod actor;
mod construct;
mod entity;
mod error;
mod id;
mod role;

pub use action::{Action, Scope};
pub use actor::Actor;
pub use construct::TryNew;
pub use entity::{EntityError, EntityRef, EntityType, Ownable};
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{EntityId, Identity};
pub use role::Role;
