//! Fallible construction.
//!
//! | Pattern | Use When |
//! |---------|----------|
//! | `new()` | Construction always succeeds |
//! | [`TryNew`] | Construction validates an invariant and may fail |
//! | `TryFrom<T>` | Converting from another type |
//!
//! Types implementing `TryNew` do not also offer a plain `new()` that
//! performs the same validation; the `try_` prefix keeps fallibility
//! visible at the call site.

/// Constructor that validates its arguments.
///
/// Keep validation pure: `try_new` must not log or touch external state.
///
/// # Example
///
/// ```
/// use armory_types::TryNew;
///
/// struct Percent(u8);
///
/// #[derive(Debug)]
/// struct OutOfRange;
///
/// impl TryNew for Percent {
///     type Error = OutOfRange;
///     type Args = u8;
///
///     fn try_new(value: u8) -> Result<Self, Self::Error> {
///         if value > 100 {
///             return Err(OutOfRange);
///         }
///         Ok(Percent(value))
///     }
/// }
///
/// assert!(Percent::try_new(50).is_ok());
/// assert!(Percent::try_new(101).is_err());
/// ```
pub trait TryNew: Sized {
    /// Returned when validation fails.
    type Error;

    /// Construction arguments; use a tuple for several.
    type Args;

    /// Validates `args` and builds the value.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when `args` violate the type's invariant.
    fn try_new(args: Self::Args) -> Result<Self, Self::Error>;
}
