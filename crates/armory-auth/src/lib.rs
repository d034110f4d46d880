//! Role and ownership based access control for the armory catalog.
//!
//! Answers one question, "may this actor perform this action on this kind
//! of entity (or this specific entity)?", and explains denials with a
//! closed set of reasons plus an elevation hint.
//!
//! # Decision Model
//!
//! ```text
//! Verdict = Capabilities(role)[type][action] ∋ Scope(actor, entity)
//! ```
//!
//! | Layer | Type | Controls |
//! |-------|------|----------|
//! | [`PolicyTable`] | Per-type role deltas | What each role adds over the role below |
//! | [`Capabilities`] | Bitflag matrix | Scopes a role holds per (type, action) |
//! | [`resolver`] | Functions | Which scope a check needs (`own` or `any`) |
//! | [`Evaluator`] | Struct | Verdict, reason and elevation hint |
//!
//! # Crate Architecture
//!
//! ```text
//! armory-types  (Identity, Role, EntityType, Action, Scope, EntityRef)
//!     ↑
//! armory-auth  ◄── THIS CRATE
//!     policy ─► cache ─► evaluator ─► bulk / affordance
//!                  ▲          │
//!               config     advisor (messages)
//! ```
//!
//! # Invariants
//!
//! - A higher role never holds fewer grants than a lower one.
//! - Admin holds every action on every type in `any` scope.
//! - Unauthenticated callers are denied everything.
//! - Global content is never satisfied by an `own` grant.
//!
//! # Example
//!
//! ```
//! use armory_auth::{DenyReason, Evaluator, PermissionContext};
//! use armory_types::{Action, Actor, EntityRef, EntityType, Role};
//!
//! let evaluator = Evaluator::default();
//! let editor = Actor::new("u1", Role::Editor);
//! let category = EntityRef::global("weapons");
//!
//! let ctx = PermissionContext::new(Some(&editor), EntityType::Category, Action::Update)
//!     .on(&category);
//! let result = evaluator.evaluate(&ctx);
//! assert_eq!(result.reason, Some(DenyReason::GlobalContentRequiresElevatedRole));
//! assert!(result.requires_elevation);
//! ```

pub mod advisor;
pub mod affordance;
mod bulk;
pub mod cache;
pub mod capability;
pub mod config;
pub mod evaluator;
pub mod policy;
pub mod resolver;

// Re-export core types
pub use advisor::{message_for, should_prompt_elevation};
pub use affordance::{Affordances, EntityPermissions};
pub use bulk::BulkResult;
pub use cache::{capabilities_for, CapabilityCache};
pub use capability::{Capabilities, Scopes};
pub use config::{ConfigError, PolicyLoader, POLICY_PATH_ENV};
pub use evaluator::{evaluate, DenyReason, Evaluator, PermissionCheckResult, PermissionContext};
pub use policy::{EntityPolicy, PolicyError, PolicyTable, RoleDelta};
