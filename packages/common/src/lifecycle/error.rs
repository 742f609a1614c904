use thiserror::Error;

use crate::status::ParseStatusError;

/// Why the engine refused an operation.
///
/// None of these are retryable: the condition behind them (role, deadline,
/// capacity, membership) does not change by asking again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The actor's role is not allowed to perform the action.
    #[error("{0}")]
    RoleViolation(String),

    #[error(transparent)]
    InvalidStatus(#[from] ParseStatusError),

    /// The entity has not been approved yet.
    #[error("{0}")]
    NotApproved(String),

    #[error("Registration deadline has passed")]
    DeadlinePassed,

    #[error("{0}")]
    CapacityExceeded(String),

    #[error("Already a member of this team")]
    AlreadyMember,

    #[error("Already registered for this competition")]
    AlreadyRegistered,

    #[error("Not registered for this competition")]
    NotRegistered,

    #[error("Not a member of this team")]
    NotTeamMember,

    #[error("The team leader cannot leave the team")]
    LeaderCannotLeave,

    /// The action payload breaks an entity invariant (dates, sizes, names).
    #[error("{0}")]
    InvalidPayload(String),
}

impl LifecycleError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoleViolation(_) => "PERMISSION_DENIED",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::NotApproved(_) => "NOT_APPROVED",
            Self::DeadlinePassed => "DEADLINE_PASSED",
            Self::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::NotRegistered => "NOT_REGISTERED",
            Self::NotTeamMember => "NOT_TEAM_MEMBER",
            Self::LeaderCannotLeave => "LEADER_CANNOT_LEAVE",
            Self::InvalidPayload(_) => "VALIDATION_ERROR",
        }
    }
}
