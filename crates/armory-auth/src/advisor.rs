//! User-facing wording for verdicts.
//!
//! Pure presentation over the closed [`DenyReason`] vocabulary: one fixed
//! sentence per reason, no interpolation of entity or role details.

use crate::evaluator::{DenyReason, PermissionCheckResult};

/// Sentence shown for an allowed verdict.
pub const ALLOWED_MESSAGE: &str = "Action allowed.";

/// Fixed sentence for a denial reason.
#[must_use]
pub const fn reason_message(reason: DenyReason) -> &'static str {
    match reason {
        DenyReason::Unauthenticated => "Sign in to continue.",
        DenyReason::InsufficientRole => "Your role does not permit this action.",
        DenyReason::NotOwner => "You can only change content you created.",
        DenyReason::GlobalContentRequiresElevatedRole => {
            "Shared content can only be changed by a higher role."
        }
        DenyReason::UnsupportedActionForType => "This action is not available for this content.",
    }
}

/// Message for a verdict.
///
/// # Example
///
/// ```
/// use armory_auth::advisor::{message_for, ALLOWED_MESSAGE};
/// use armory_auth::{DenyReason, PermissionCheckResult};
///
/// assert_eq!(message_for(&PermissionCheckResult::allow()), ALLOWED_MESSAGE);
/// assert_eq!(
///     message_for(&PermissionCheckResult::deny(DenyReason::NotOwner, false)),
///     "You can only change content you created."
/// );
/// ```
#[must_use]
pub fn message_for(result: &PermissionCheckResult) -> &'static str {
    match result.reason {
        Some(reason) if !result.allowed => reason_message(reason),
        _ => ALLOWED_MESSAGE,
    }
}

/// Whether to offer a role-upgrade request for this verdict.
#[must_use]
pub fn should_prompt_elevation(result: &PermissionCheckResult) -> bool {
    !result.allowed && result.requires_elevation
}
