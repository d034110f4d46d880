//! Account roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an account, totally ordered from least to most privileged.
///
/// ```text
/// Pending < Member < Editor < Admin
/// ```
///
/// Every "at least this role" question is answered by the derived
/// [`Ord`] through [`at_least`](Self::at_least); there are no per-role
/// boolean helpers.
///
/// Roles are assigned at account provisioning and changed only by an
/// administrator outside this crate.
///
/// # Example
///
/// ```
/// use armory_types::Role;
///
/// assert!(Role::Admin > Role::Editor);
/// assert!(Role::Editor.at_least(Role::Member));
/// assert!(!Role::Pending.at_least(Role::Member));
/// assert_eq!(Role::Member.above().collect::<Vec<_>>(), vec![Role::Editor, Role::Admin]);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Account awaiting approval. Holds no baseline grants.
    Pending,
    /// Regular contributor.
    Member,
    /// Content moderator and system builder.
    Editor,
    /// Full access. Always the maximal role.
    Admin,
}

impl Role {
    /// All roles in ascending order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Member, Self::Editor, Self::Admin];

    /// Numeric rank (`Pending = 0` .. `Admin = 3`).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Member => 1,
            Self::Editor => 2,
            Self::Admin => 3,
        }
    }

    /// Returns `true` if this role is `min` or higher.
    #[must_use]
    pub fn at_least(self, min: Self) -> bool {
        self >= min
    }

    /// Roles strictly above this one, lowest first.
    pub fn above(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |r| *r > self)
    }

    /// Roles up to and including this one, lowest first.
    pub fn up_to(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |r| *r <= self)
    }

    /// Snake-case name used in configuration and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Member => "member",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }

    /// Parses a role name (case-insensitive).
    ///
    /// ```
    /// use armory_types::Role;
    ///
    /// assert_eq!(Role::parse("Editor"), Some(Role::Editor));
    /// assert_eq!(Role::parse("owner"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "member" => Some(Self::Member),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_follows_ord() {
        for pair in Role::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn admin_is_maximal() {
        for role in Role::ALL {
            assert!(Role::Admin.at_least(role));
        }
        assert_eq!(Role::Admin.above().count(), 0);
    }

    #[test]
    fn above_is_strict() {
        let above: Vec<_> = Role::Editor.above().collect();
        assert_eq!(above, vec![Role::Admin]);
        assert_eq!(Role::Pending.above().count(), 3);
    }

    #[test]
    fn up_to_includes_self() {
        let roles: Vec<_> = Role::Member.up_to().collect();
        assert_eq!(roles, vec![Role::Pending, Role::Member]);
    }

    #[test]
    fn parse_roundtrips_as_str() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("  ADMIN "), Some(Role::Admin));
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::Editor).expect("serialize");
        assert_eq!(json, "\"editor\"");
        let parsed: Role = serde_json::from_str("\"pending\"").expect("deserialize");
        assert_eq!(parsed, Role::Pending);
    }
}
