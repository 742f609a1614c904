//! Checks shared by the team, competition and submission lifecycles.

use super::{Actor, LifecycleError, UserId};
use crate::role::Role;

/// Fails with `RoleViolation` unless the actor holds one of `allowed`.
pub fn require_role(actor: &Actor, allowed: &[Role], action: &str) -> Result<(), LifecycleError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    let names = allowed
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(LifecycleError::RoleViolation(format!(
        "Only {names} users can {action}"
    )))
}

/// Fails with `CapacityExceeded` when `current` has already reached `max`.
pub fn ensure_capacity(current: usize, max: u32, what: &str) -> Result<(), LifecycleError> {
    if current >= max as usize {
        return Err(LifecycleError::CapacityExceeded(format!(
            "{what} is full ({max} maximum)"
        )));
    }
    Ok(())
}

/// Fails with `err` when `id` is already in `set`.
pub fn ensure_absent(set: &[UserId], id: UserId, err: LifecycleError) -> Result<(), LifecycleError> {
    if set.contains(&id) {
        return Err(err);
    }
    Ok(())
}

/// Fails with `InvalidPayload` when a name or title is blank.
pub(crate) fn require_text(value: &str, field: &str) -> Result<(), LifecycleError> {
    if value.trim().is_empty() {
        return Err(LifecycleError::InvalidPayload(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}
