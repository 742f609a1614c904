//! Account status management.

use super::guard::require_role;
use super::{Actor, LifecycleError, UserId};
use crate::role::Role;
use crate::status::UserStatus;

/// The parts of a user account the engine reasons about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub role: Role,
    pub status: UserStatus,
}

/// Set a user's account status. Admin only.
pub fn set_user_status(
    user: &UserAccount,
    new_status: &str,
    actor: &Actor,
) -> Result<UserAccount, LifecycleError> {
    require_role(actor, &[Role::Admin], "change user status")?;
    let status: UserStatus = new_status.parse()?;
    Ok(UserAccount { status, ..*user })
}
