//! Actions and ownership scopes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation requested on a catalog entity.
///
/// [`Manage`](Self::Manage) is an alias for the four concrete actions.
/// Policy tables expand it when they are built, and a `Manage` request is
/// granted exactly when every concrete action is granted.
///
/// # Example
///
/// ```
/// use armory_types::Action;
///
/// assert_eq!(Action::Update.expand(), &[Action::Update]);
/// assert_eq!(Action::Manage.expand(), &Action::CONCRETE);
/// assert!(!Action::Manage.is_concrete());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View an entity.
    Read,
    /// Create a new entity.
    Create,
    /// Modify an existing entity.
    Update,
    /// Remove an entity.
    Delete,
    /// Shorthand for read + create + update + delete.
    Manage,
}

impl Action {
    /// Every action, including the `Manage` alias.
    pub const ALL: [Self; 5] = [
        Self::Read,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Manage,
    ];

    /// The four concrete actions, in matrix column order.
    pub const CONCRETE: [Self; 4] = [Self::Read, Self::Create, Self::Update, Self::Delete];

    /// Returns `true` for every action except `Manage`.
    #[must_use]
    pub const fn is_concrete(self) -> bool {
        !matches!(self, Self::Manage)
    }

    /// The concrete actions this action stands for.
    #[must_use]
    pub fn expand(self) -> &'static [Self] {
        match self {
            Self::Read => &[Self::Read],
            Self::Create => &[Self::Create],
            Self::Update => &[Self::Update],
            Self::Delete => &[Self::Delete],
            Self::Manage => &Self::CONCRETE,
        }
    }

    /// Column index in a capability matrix, `None` for `Manage`.
    #[must_use]
    pub const fn column(self) -> Option<usize> {
        match self {
            Self::Read => Some(0),
            Self::Create => Some(1),
            Self::Update => Some(2),
            Self::Delete => Some(3),
            Self::Manage => None,
        }
    }

    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    /// Parses an action name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "read" => Some(Self::Read),
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "manage" => Some(Self::Manage),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which entities a grant covers.
///
/// | Scope | Covers |
/// |-------|--------|
/// | `Own` | Entities whose owner is the acting identity (never global content) |
/// | `Any` | Every entity of the type, regardless of owner |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Only entities owned by the actor.
    Own,
    /// Any entity of the type.
    Any,
}

impl Scope {
    /// Both scopes.
    pub const ALL: [Self; 2] = [Self::Own, Self::Any];

    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Any => "any",
        }
    }

    /// Parses a scope name (case-insensitive). `all` is accepted for `Any`.
    ///
    /// ```
    /// use armory_types::Scope;
    ///
    /// assert_eq!(Scope::parse("own"), Some(Scope::Own));
    /// assert_eq!(Scope::parse("ALL"), Some(Scope::Any));
    /// assert_eq!(Scope::parse("team"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "own" => Some(Self::Own),
            "any" | "all" => Some(Self::Any),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_columns_are_dense() {
        for (i, action) in Action::CONCRETE.iter().enumerate() {
            assert_eq!(action.column(), Some(i));
            assert!(action.is_concrete());
        }
        assert_eq!(Action::Manage.column(), None);
    }

    #[test]
    fn concrete_actions_expand_to_themselves() {
        for action in Action::CONCRETE {
            assert_eq!(action.expand(), &[action]);
        }
    }

    #[test]
    fn parse_accepts_every_name() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
        assert_eq!(Action::parse("Delete"), Some(Action::Delete));
        assert_eq!(Action::parse("publish"), None);
    }

    #[test]
    fn scope_parse_and_display() {
        for scope in Scope::ALL {
            assert_eq!(Scope::parse(scope.as_str()), Some(scope));
        }
        assert_eq!(Scope::Any.to_string(), "any");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Action::Manage).expect("serialize");
        assert_eq!(json, "\"manage\"");
        let scope: Scope = serde_json::from_str("\"own\"").expect("deserialize");
        assert_eq!(scope, Scope::Own);
    }
}
