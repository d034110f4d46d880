//! Policy tables from TOML.
//!
//! # Load Order
//!
//! 1. Explicit path ([`PolicyLoader::with_path`])
//! 2. `ARMORY_POLICY_PATH` environment variable
//! 3. [`PolicyTable::builtin`]
//!
//! The first source present wins; tables are never merged. A path that is
//! named but cannot be read is an error, not a fallback to the builtin.
//!
//! # File Format
//!
//! ```toml
//! [entity.item]
//! ownable = true
//!
//! [entity.item.member]
//! read = ["any"]
//! create = ["any"]
//! update = ["own"]
//!
//! [entity.item.editor]
//! manage = ["any"]
//! ```
//!
//! Every entity type must appear. `ownable` defaults to `true`. Role tables
//! are deltas over the role below, exactly as in [`EntityPolicy::grant`].

use crate::capability::Scopes;
use crate::policy::{EntityPolicy, PolicyError, PolicyTable};
use armory_types::{Action, EntityType, ErrorCode, Role, Scope, TryNew};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming a policy file.
pub const POLICY_PATH_ENV: &str = "ARMORY_POLICY_PATH";

const INLINE_SOURCE: &str = "<inline>";

/// Policy loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the policy file.
    #[error("failed to read policy file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse policy file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file parsed but does not describe a valid table.
    #[error("invalid policy in '{path}': {source}")]
    InvalidPolicy {
        path: PathBuf,
        #[source]
        source: PolicyError,
    },
}

impl ConfigError {
    /// Creates a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse TOML error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid policy error.
    pub fn invalid_policy(path: impl Into<PathBuf>, source: PolicyError) -> Self {
        Self::InvalidPolicy {
            path: path.into(),
            source,
        }
    }

    /// The file the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::ReadFile { path, .. }
            | Self::ParseToml { path, .. }
            | Self::InvalidPolicy { path, .. } => path,
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ_FILE",
            Self::ParseToml { .. } => "CONFIG_PARSE_TOML",
            Self::InvalidPolicy { .. } => "CONFIG_INVALID_POLICY",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReadFile { .. })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    #[serde(default)]
    entity: BTreeMap<String, EntityFile>,
}

#[derive(Debug, Deserialize)]
struct EntityFile {
    #[serde(default = "default_ownable")]
    ownable: bool,
    /// role name → action name → scope names
    #[serde(flatten)]
    roles: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

fn default_ownable() -> bool {
    true
}

impl PolicyFile {
    fn into_table(self) -> Result<PolicyTable, PolicyError> {
        let mut entries = Vec::with_capacity(self.entity.len());
        for (type_name, entity) in self.entity {
            let Some(entity_type) = EntityType::parse(&type_name) else {
                return Err(PolicyError::UnknownEntityType(type_name));
            };
            entries.push((entity_type, entity.into_policy()?));
        }
        PolicyTable::try_new(entries)
    }
}

impl EntityFile {
    fn into_policy(self) -> Result<EntityPolicy, PolicyError> {
        let mut policy = if self.ownable {
            EntityPolicy::ownable()
        } else {
            EntityPolicy::unowned()
        };

        for (role_name, grants) in self.roles {
            let Some(role) = Role::parse(&role_name) else {
                return Err(PolicyError::UnknownRole(role_name));
            };
            for (action_name, scope_names) in grants {
                let Some(action) = Action::parse(&action_name) else {
                    return Err(PolicyError::UnknownAction(action_name));
                };
                policy = policy.grant(role, action, parse_scopes(scope_names)?);
            }
        }
        Ok(policy)
    }
}

fn parse_scopes(names: Vec<String>) -> Result<Scopes, PolicyError> {
    let mut scopes = Scopes::empty();
    for name in names {
        match Scope::parse(&name) {
            Some(scope) => scopes |= Scopes::of(scope),
            None => return Err(PolicyError::UnknownScope(name)),
        }
    }
    Ok(scopes)
}

fn parse_policy(content: &str, path: &Path) -> Result<PolicyTable, ConfigError> {
    let file: PolicyFile =
        toml::from_str(content).map_err(|e| ConfigError::parse_toml(path, e))?;
    file.into_table()
        .map_err(|e| ConfigError::invalid_policy(path, e))
}

impl PolicyTable {
    /// Parses a table from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ParseToml`] for malformed TOML,
    /// [`ConfigError::InvalidPolicy`] for unknown names, missing entity
    /// types or `own` on a non-ownable type.
    ///
    /// # Example
    ///
    /// ```
    /// use armory_auth::PolicyTable;
    /// use armory_types::{Action, EntityType, Role, Scope};
    ///
    /// let mut text = String::new();
    /// for t in EntityType::ALL {
    ///     text.push_str(&format!("[entity.{t}.member]\nread = [\"any\"]\n"));
    /// }
    /// let table = PolicyTable::from_toml_str(&text).expect("valid policy");
    /// let member = table.capabilities(Role::Member);
    /// assert!(member.allows(EntityType::Tier, Action::Read, Scope::Any));
    /// assert!(!member.allows(EntityType::Tier, Action::Create, Scope::Any));
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        parse_policy(content, Path::new(INLINE_SOURCE))
    }

    /// Reads and parses a policy file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ReadFile`] if the file cannot be read, otherwise as
    /// [`PolicyTable::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        parse_policy(&content, path)
    }
}

/// Policy loader with builder pattern.
///
/// # Example
///
/// ```
/// use armory_auth::{PolicyLoader, PolicyTable};
///
/// let table = PolicyLoader::new()
///     .skip_env_vars() // deterministic in tests
///     .load()
///     .expect("builtin never fails");
/// assert_eq!(table, PolicyTable::builtin());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyLoader {
    /// Explicit policy file.
    path: Option<PathBuf>,

    /// Skip environment variable lookup.
    skip_env: bool,
}

impl PolicyLoader {
    /// Creates a loader that falls back to the builtin table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads from `path`, ignoring the environment.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Skips environment variable lookup.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// The file that [`load`](Self::load) would read, if any.
    #[must_use]
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }
        if self.skip_env {
            return None;
        }
        std::env::var_os(POLICY_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// Loads the first available policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a named file cannot be read, parsed, or
    /// validated. The builtin fallback never fails.
    pub fn load(&self) -> Result<PolicyTable, ConfigError> {
        match self.resolve_path() {
            Some(path) => {
                let table = PolicyTable::from_file(&path)?;
                info!(path = %path.display(), "loaded policy file");
                Ok(table)
            }
            None => {
                debug!("no policy file configured, using builtin policy");
                Ok(PolicyTable::builtin())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_types::assert_error_codes;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Builtin policy written out as TOML.
    const BUILTIN_TOML: &str = r#"
[entity.tier.member]
read = ["any"]
[entity.tier.editor]
update = ["own"]
delete = ["own"]

[entity.category.member]
read = ["any"]
[entity.category.editor]
create = ["any"]
update = ["own"]
delete = ["own"]

[entity.type.member]
read = ["any"]
[entity.type.editor]
create = ["any"]
update = ["own"]
delete = ["own"]

[entity.subtype.member]
read = ["any"]
[entity.subtype.editor]
create = ["any"]
update = ["own"]
delete = ["own"]

[entity.field_definition]
ownable = false
[entity.field_definition.member]
read = ["any"]

[entity.dropdown-group]
ownable = false
[entity.dropdown-group.member]
read = ["any"]

[entity.item.member]
read = ["any"]
create = ["any"]
update = ["own"]
delete = ["own"]
[entity.item.editor]
update = ["any"]
delete = ["any"]

[entity.schematic.member]
read = ["any"]
create = ["any"]
update = ["own"]
delete = ["own"]
[entity.schematic.editor]
update = ["any"]
delete = ["any"]
"#;

    fn write_policy(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write policy");
        file
    }

    fn invalid_policy(content: &str) -> PolicyError {
        match PolicyTable::from_toml_str(content) {
            Err(ConfigError::InvalidPolicy { source, .. }) => source,
            other => panic!("expected InvalidPolicy, got {other:?}"),
        }
    }

    #[test]
    fn builtin_round_trips_through_toml() {
        let table = PolicyTable::from_toml_str(BUILTIN_TOML).expect("valid policy");
        assert_eq!(table, PolicyTable::builtin());
    }

    #[test]
    fn manage_expands_to_concrete_actions() {
        let text = BUILTIN_TOML.replace(
            "[entity.tier.editor]\nupdate = [\"own\"]\ndelete = [\"own\"]",
            "[entity.tier.editor]\nmanage = [\"any\"]",
        );
        let table = PolicyTable::from_toml_str(&text).expect("valid policy");
        let editor = table.capabilities(Role::Editor);
        for action in Action::CONCRETE {
            assert!(editor.allows(EntityType::Tier, action, Scope::Any));
        }
    }

    #[test]
    fn missing_entity_type_is_rejected() {
        let text = "[entity.item.member]\nread = [\"any\"]\n";
        assert_eq!(
            invalid_policy(text),
            PolicyError::MissingEntityType(EntityType::Tier)
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        let weapon = format!("[entity.weapon]\n{BUILTIN_TOML}");
        assert_eq!(
            invalid_policy(&weapon),
            PolicyError::UnknownEntityType("weapon".into())
        );

        let cases = [
            ("[entity.tier.member]", "[entity.tier.owner]", PolicyError::UnknownRole("owner".into())),
            ("read = [\"any\"]", "publish = [\"any\"]", PolicyError::UnknownAction("publish".into())),
            ("read = [\"any\"]", "read = [\"everyone\"]", PolicyError::UnknownScope("everyone".into())),
        ];
        for (from, to, expected) in cases {
            let text = BUILTIN_TOML.replacen(from, to, 1);
            assert_eq!(invalid_policy(&text), expected, "replacing {from}");
        }
    }

    #[test]
    fn duplicate_spellings_are_rejected() {
        let text = format!("{BUILTIN_TOML}\n[entity.dropdown_group]\nownable = false\n");
        assert_eq!(
            invalid_policy(&text),
            PolicyError::DuplicateEntityType(EntityType::DropdownGroup)
        );
    }

    #[test]
    fn own_on_unowned_type_is_rejected() {
        let text = BUILTIN_TOML.replacen(
            "[entity.field_definition.member]\nread = [\"any\"]",
            "[entity.field_definition.member]\nread = [\"any\"]\nupdate = [\"own\"]",
            1,
        );
        assert_eq!(
            invalid_policy(&text),
            PolicyError::OwnScopeOnUnownedType {
                entity_type: EntityType::FieldDefinition,
                role: Role::Member,
                action: Action::Update,
            }
        );
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = PolicyTable::from_toml_str("[entity.item\n").expect_err("malformed");
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert_eq!(err.path(), Path::new(INLINE_SOURCE));

        let err = PolicyTable::from_toml_str("[policy]\n").expect_err("unknown section");
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn loader_reads_explicit_path() {
        let file = write_policy(BUILTIN_TOML);
        let table = PolicyLoader::new()
            .with_path(file.path())
            .load()
            .expect("load policy");
        assert_eq!(table, PolicyTable::builtin());
    }

    #[test]
    fn loader_reports_path_on_error() {
        let file = write_policy("[entity.item.member]\nread = [\"any\"]\n");
        let err = PolicyLoader::new()
            .with_path(file.path())
            .load()
            .expect_err("incomplete policy");
        assert_eq!(err.path(), file.path());
        assert!(err.to_string().contains("tier"));
    }

    #[test]
    fn loader_missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("policy.toml");
        let err = PolicyLoader::new()
            .with_path(&missing)
            .load()
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::ReadFile { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn loader_defaults_to_builtin() {
        let loader = PolicyLoader::new().skip_env_vars();
        assert_eq!(loader.resolve_path(), None);
        assert_eq!(loader.load().expect("builtin"), PolicyTable::builtin());
    }

    #[test]
    fn loader_reads_env_var() {
        let text = BUILTIN_TOML.replace(
            "[entity.tier.member]\nread = [\"any\"]",
            "[entity.tier.member]\nread = [\"any\"]\ncreate = [\"any\"]",
        );
        let file = write_policy(&text);

        std::env::set_var(POLICY_PATH_ENV, file.path());
        let from_env = PolicyLoader::new().load();
        let skipped = PolicyLoader::new().skip_env_vars().load();
        std::env::remove_var(POLICY_PATH_ENV);

        let table = from_env.expect("load from env");
        assert!(table
            .capabilities(Role::Member)
            .allows(EntityType::Tier, Action::Create, Scope::Any));
        assert_eq!(skipped.expect("builtin"), PolicyTable::builtin());
    }

    #[test]
    fn error_codes() {
        let io = || std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let parse = toml::from_str::<PolicyFile>("=").expect_err("malformed");
        assert_error_codes(
            &[
                ConfigError::read_file("p", io()),
                ConfigError::parse_toml("p", parse),
                ConfigError::invalid_policy("p", PolicyError::UnknownRole("x".into())),
            ],
            "CONFIG_",
        );
    }
}
