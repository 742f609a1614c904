//! Submission lifecycle: creation by a team member and review.

use serde::{Deserialize, Serialize};

use super::guard::require_role;
use super::{Actor, CompetitionId, Competition, LifecycleError, SubmissionId, Team, TeamId, UserId};
use crate::role::Role;
use crate::status::SubmissionStatus;

/// Highest score a reviewer may award.
pub const MAX_SCORE: u8 = 100;

/// Reference to an uploaded file. Upload storage lives outside the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmissionFile {
    #[schema(example = "demo.mp4")]
    pub filename: String,
    #[schema(example = "https://files.example.com/demo.mp4")]
    pub url: String,
}

/// In-memory snapshot of a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// `None` until the store has assigned an id.
    pub id: Option<SubmissionId>,
    pub team: TeamId,
    pub competition: CompetitionId,
    pub files: Vec<SubmissionFile>,
    pub description: String,
    pub submitted_by: UserId,
    pub status: SubmissionStatus,
    pub feedback: Option<String>,
    pub score: Option<u8>,
}

/// Payload for [`create_submission`].
#[derive(Clone, Debug, Default)]
pub struct SubmissionDraft {
    pub files: Vec<SubmissionFile>,
    pub description: String,
}

/// Reviewer output attached alongside a status change.
#[derive(Clone, Debug, Default)]
pub struct SubmissionReview {
    pub feedback: Option<String>,
    pub score: Option<u8>,
}

/// Create a pending submission on behalf of a member of `team`.
pub fn create_submission(
    team: &Team,
    competition: &Competition,
    submitter: &Actor,
    draft: SubmissionDraft,
) -> Result<Submission, LifecycleError> {
    if !team.is_member(submitter.id) {
        return Err(LifecycleError::NotTeamMember);
    }
    let (Some(team_id), Some(competition_id)) = (team.id, competition.id) else {
        return Err(LifecycleError::InvalidPayload(
            "Team and competition must exist before submitting".into(),
        ));
    };

    Ok(Submission {
        id: None,
        team: team_id,
        competition: competition_id,
        files: draft.files,
        description: draft.description,
        submitted_by: submitter.id,
        status: SubmissionStatus::Pending,
        feedback: None,
        score: None,
    })
}

/// Set the submission's status if the actor holds one of `allowed_roles`.
///
/// Organizers review through the general status endpoint; admins use the
/// full update. Both paths share this check.
pub fn set_submission_status(
    submission: &Submission,
    new_status: &str,
    actor: &Actor,
    allowed_roles: &[Role],
) -> Result<Submission, LifecycleError> {
    require_role(actor, allowed_roles, "change submission status")?;
    let status: SubmissionStatus = new_status.parse()?;

    let mut next = submission.clone();
    next.status = status;
    Ok(next)
}

/// [`set_submission_status`] plus feedback and score.
///
/// Fields left `None` in the review keep their previous value.
pub fn review_submission(
    submission: &Submission,
    new_status: &str,
    review: SubmissionReview,
    actor: &Actor,
    allowed_roles: &[Role],
) -> Result<Submission, LifecycleError> {
    let mut next = set_submission_status(submission, new_status, actor, allowed_roles)?;
    if let Some(score) = review.score {
        if score > MAX_SCORE {
            return Err(LifecycleError::InvalidPayload(format!(
                "score must be between 0 and {MAX_SCORE}"
            )));
        }
        next.score = Some(score);
    }
    if let Some(feedback) = review.feedback {
        next.feedback = Some(feedback);
    }
    Ok(next)
}
