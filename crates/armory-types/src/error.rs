//! Machine-readable error codes.
//!
//! Every error type in the workspace implements [`ErrorCode`], so callers
//! can log or map failures without matching on concrete enums.
//!
//! Access denials are not errors and have no codes here: they are
//! ordinary results carrying a reason. Errors in this workspace mean a
//! configuration or programming defect.

/// Stable, machine-readable identification of an error.
///
/// # Code Format
///
/// - UPPER_SNAKE_CASE
/// - Prefixed by domain: `ENTITY_`, `POLICY_`, `CONFIG_`
/// - Never changed once published
///
/// # Example
///
/// ```
/// use armory_types::ErrorCode;
///
/// enum LoadError {
///     Missing,
///     Corrupt,
/// }
///
/// impl ErrorCode for LoadError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::Missing => "LOAD_MISSING",
///             Self::Corrupt => "LOAD_CORRUPT",
///         }
///     }
///
///     fn is_recoverable(&self) -> bool {
///         matches!(self, Self::Missing)
///     }
/// }
///
/// assert_eq!(LoadError::Corrupt.code(), "LOAD_CORRUPT");
/// ```
pub trait ErrorCode {
    /// Machine-readable code.
    fn code(&self) -> &'static str;

    /// Whether the caller can fix the condition without a code change
    /// (for example by correcting a file path).
    fn is_recoverable(&self) -> bool;
}

/// Asserts that `err.code()` is non-empty UPPER_SNAKE_CASE starting with
/// `expected_prefix`.
///
/// # Panics
///
/// Panics with a descriptive message when any check fails. Intended for
/// tests.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();
    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// [`assert_error_code`] over a slice of variants.
///
/// # Panics
///
/// Panics on the first variant that fails.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
