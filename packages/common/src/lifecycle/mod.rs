//! Status lifecycle engine.
//!
//! Pure decision logic for teams, competitions, submissions and user
//! accounts. Every operation takes the current snapshot, the acting user and
//! an action payload, and returns either the next snapshot or a
//! [`LifecycleError`]. Nothing here touches storage: callers load the
//! snapshot, call the engine, and persist what comes back.
//!
//! Checks inside an operation run in a fixed order and the first failure
//! wins, so a given invalid request always produces the same error.

pub mod competition;
pub mod error;
pub mod guard;
pub mod submission;
pub mod team;
pub mod user;

use serde::{Deserialize, Serialize};

use crate::role::Role;

pub use competition::{Competition, CompetitionChanges, CompetitionDraft};
pub use error::LifecycleError;
pub use submission::{Submission, SubmissionDraft, SubmissionFile, SubmissionReview};
pub use team::{MembershipRecord, Team, TeamChanges, TeamDraft, TeamStatusChange};
pub use user::UserAccount;

pub type UserId = i32;
pub type TeamId = i32;
pub type CompetitionId = i32;
pub type SubmissionId = i32;

/// The authenticated user attempting an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
