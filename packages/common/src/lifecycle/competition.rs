//! Competition lifecycle: creation, revision, registration, approval.

use chrono::{DateTime, Utc};

use super::guard::{ensure_absent, ensure_capacity, require_role, require_text};
use super::{Actor, CompetitionId, LifecycleError, UserId};
use crate::role::Role;
use crate::status::CompetitionStatus;

/// In-memory snapshot of a competition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Competition {
    /// `None` until the store has assigned an id.
    pub id: Option<CompetitionId>,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_participants: u32,
    pub organizer: UserId,
    pub participants: Vec<UserId>,
    pub status: CompetitionStatus,
}

impl Competition {
    /// Derived from the participant set; never stored.
    pub fn current_participants(&self) -> usize {
        self.participants.len()
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.participants.contains(&user)
    }

    pub fn is_managed_by(&self, actor: &Actor) -> bool {
        actor.role == Role::Admin || actor.id == self.organizer
    }
}

/// Payload for [`create_competition`].
#[derive(Clone, Debug)]
pub struct CompetitionDraft {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_participants: u32,
}

/// Partial update for [`revise_competition`]. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default)]
pub struct CompetitionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<u32>,
}

fn validate_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    deadline: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if start >= end {
        return Err(LifecycleError::InvalidPayload(
            "end_date must be after start_date".into(),
        ));
    }
    if deadline >= start {
        return Err(LifecycleError::InvalidPayload(
            "registration_deadline must be before start_date".into(),
        ));
    }
    Ok(())
}

/// Create a pending competition owned by `actor`.
pub fn create_competition(
    actor: &Actor,
    draft: CompetitionDraft,
) -> Result<Competition, LifecycleError> {
    require_role(actor, &[Role::Organizer, Role::Admin], "create competitions")?;
    require_text(&draft.title, "Title")?;
    validate_schedule(draft.start_date, draft.end_date, draft.registration_deadline)?;
    if draft.max_participants < 1 {
        return Err(LifecycleError::InvalidPayload(
            "max_participants must be at least 1".into(),
        ));
    }

    Ok(Competition {
        id: None,
        title: draft.title.trim().to_string(),
        description: draft.description,
        start_date: draft.start_date,
        end_date: draft.end_date,
        registration_deadline: draft.registration_deadline,
        max_participants: draft.max_participants,
        organizer: actor.id,
        participants: Vec::new(),
        status: CompetitionStatus::Pending,
    })
}

/// Apply a partial update. Only the owning organizer or an admin may edit.
///
/// Date invariants are checked against the merged result, so moving one
/// date can be rejected because of a date that was not part of the update.
pub fn revise_competition(
    competition: &Competition,
    actor: &Actor,
    changes: CompetitionChanges,
) -> Result<Competition, LifecycleError> {
    if !competition.is_managed_by(actor) {
        return Err(LifecycleError::RoleViolation(
            "Only the organizing user or an admin can edit this competition".into(),
        ));
    }

    let mut next = competition.clone();
    if let Some(title) = changes.title {
        require_text(&title, "Title")?;
        next.title = title.trim().to_string();
    }
    if let Some(description) = changes.description {
        next.description = description;
    }
    next.start_date = changes.start_date.unwrap_or(next.start_date);
    next.end_date = changes.end_date.unwrap_or(next.end_date);
    next.registration_deadline = changes
        .registration_deadline
        .unwrap_or(next.registration_deadline);
    validate_schedule(next.start_date, next.end_date, next.registration_deadline)?;

    if let Some(max) = changes.max_participants {
        if max < 1 {
            return Err(LifecycleError::InvalidPayload(
                "max_participants must be at least 1".into(),
            ));
        }
        if (max as usize) < next.current_participants() {
            return Err(LifecycleError::InvalidPayload(format!(
                "max_participants cannot be below the current participant count ({})",
                next.current_participants()
            )));
        }
        next.max_participants = max;
    }
    Ok(next)
}

/// Register `candidate` for an approved competition before its deadline.
pub fn register_for_competition(
    competition: &Competition,
    candidate: UserId,
    now: DateTime<Utc>,
) -> Result<Competition, LifecycleError> {
    if competition.status != CompetitionStatus::Approved {
        return Err(LifecycleError::NotApproved(
            "Competition is not open for registration".into(),
        ));
    }
    if now > competition.registration_deadline {
        return Err(LifecycleError::DeadlinePassed);
    }
    ensure_capacity(
        competition.current_participants(),
        competition.max_participants,
        "Competition",
    )?;
    ensure_absent(
        &competition.participants,
        candidate,
        LifecycleError::AlreadyRegistered,
    )?;

    let mut next = competition.clone();
    next.participants.push(candidate);
    Ok(next)
}

/// Remove a registered participant.
pub fn withdraw_from_competition(
    competition: &Competition,
    candidate: UserId,
) -> Result<Competition, LifecycleError> {
    if !competition.is_participant(candidate) {
        return Err(LifecycleError::NotRegistered);
    }
    let mut next = competition.clone();
    next.participants.retain(|&p| p != candidate);
    Ok(next)
}

/// Set the competition's status. Admin only; no transition graph applies.
pub fn set_competition_status(
    competition: &Competition,
    new_status: &str,
    actor: &Actor,
) -> Result<Competition, LifecycleError> {
    require_role(actor, &[Role::Admin], "change competition status")?;
    let status: CompetitionStatus = new_status.parse()?;

    let mut next = competition.clone();
    next.status = status;
    Ok(next)
}
