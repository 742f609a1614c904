pub mod lifecycle;
pub mod role;
pub mod status;

pub use lifecycle::{Actor, LifecycleError};
pub use role::{Profile, Role, TeamRole};
pub use status::{CompetitionStatus, ParseStatusError, SubmissionStatus, TeamStatus, UserStatus};
