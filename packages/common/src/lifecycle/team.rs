//! Team lifecycle: creation, joining, leaving, approval.

use tracing::debug;

use super::guard::{ensure_absent, ensure_capacity, require_role, require_text};
use super::{Actor, CompetitionId, LifecycleError, TeamId, UserId};
use crate::role::{Role, TeamRole};
use crate::status::TeamStatus;

/// In-memory snapshot of a team.
///
/// `members` is ordered by join time, so the leader is always first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    /// `None` until the store has assigned an id.
    pub id: Option<TeamId>,
    pub name: String,
    pub description: String,
    pub leader: UserId,
    pub members: Vec<UserId>,
    pub max_size: u32,
    pub required_skills: Vec<String>,
    pub status: TeamStatus,
    pub competition: Option<CompetitionId>,
}

impl Team {
    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// The role `user` holds in this team, if any.
    pub fn role_of(&self, user: UserId) -> Option<TeamRole> {
        if user == self.leader {
            Some(TeamRole::Leader)
        } else if self.is_member(user) {
            Some(TeamRole::Member)
        } else {
            None
        }
    }
}

/// Payload for [`create_team`].
#[derive(Clone, Debug, Default)]
pub struct TeamDraft {
    pub name: String,
    pub description: String,
    pub max_size: u32,
    pub required_skills: Vec<String>,
    pub competition: Option<CompetitionId>,
}

/// Partial update for [`revise_team`]. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default)]
pub struct TeamChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_size: Option<u32>,
    pub required_skills: Option<Vec<String>>,
}

/// A team membership to record on a student's profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MembershipRecord {
    pub user: UserId,
    pub role: TeamRole,
}

/// Result of [`set_team_status`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamStatusChange {
    pub team: Team,
    /// One record per member when the new status is `approved`, empty otherwise.
    pub memberships: Vec<MembershipRecord>,
}

/// Create a pending team led by `leader`.
pub fn create_team(leader: &Actor, draft: TeamDraft) -> Result<Team, LifecycleError> {
    require_role(leader, &[Role::Student], "create teams")?;
    require_text(&draft.name, "Team name")?;
    if draft.max_size < 1 {
        return Err(LifecycleError::InvalidPayload(
            "max_size must be at least 1".into(),
        ));
    }

    Ok(Team {
        id: None,
        name: draft.name.trim().to_string(),
        description: draft.description,
        leader: leader.id,
        members: vec![leader.id],
        max_size: draft.max_size,
        required_skills: draft.required_skills,
        status: TeamStatus::Pending,
        competition: draft.competition,
    })
}

/// Add `candidate` to an approved team with room left.
pub fn join_team(team: &Team, candidate: UserId) -> Result<Team, LifecycleError> {
    if team.status != TeamStatus::Approved {
        return Err(LifecycleError::NotApproved(
            "Team is not approved for joining".into(),
        ));
    }
    ensure_absent(&team.members, candidate, LifecycleError::AlreadyMember)?;
    ensure_capacity(team.members.len(), team.max_size, "Team")?;

    let mut next = team.clone();
    next.members.push(candidate);
    debug!(
        team = ?team.id,
        candidate,
        members = next.members.len(),
        "Member joined team"
    );
    Ok(next)
}

/// Remove `candidate` from the team. The leader can never leave.
pub fn leave_team(team: &Team, candidate: UserId) -> Result<Team, LifecycleError> {
    if !team.is_member(candidate) {
        return Err(LifecycleError::NotTeamMember);
    }
    if candidate == team.leader {
        return Err(LifecycleError::LeaderCannotLeave);
    }

    let mut next = team.clone();
    next.members.retain(|&m| m != candidate);
    Ok(next)
}

/// Set the team's status. Admin only.
///
/// Any status may follow any other; approving yields the membership records
/// to write onto each member's profile.
pub fn set_team_status(
    team: &Team,
    new_status: &str,
    actor: &Actor,
) -> Result<TeamStatusChange, LifecycleError> {
    require_role(actor, &[Role::Admin], "change team status")?;
    let status: TeamStatus = new_status.parse()?;

    let mut next = team.clone();
    next.status = status;

    let memberships = if status == TeamStatus::Approved {
        next.members
            .iter()
            .filter_map(|&user| next.role_of(user).map(|role| MembershipRecord { user, role }))
            .collect()
    } else {
        Vec::new()
    };

    Ok(TeamStatusChange {
        team: next,
        memberships,
    })
}

/// Apply a partial update. Only the leader or an admin may edit a team.
pub fn revise_team(team: &Team, actor: &Actor, changes: TeamChanges) -> Result<Team, LifecycleError> {
    if actor.role != Role::Admin && actor.id != team.leader {
        return Err(LifecycleError::RoleViolation(
            "Only the team leader or an admin can edit this team".into(),
        ));
    }

    let mut next = team.clone();
    if let Some(name) = changes.name {
        require_text(&name, "Team name")?;
        next.name = name.trim().to_string();
    }
    if let Some(description) = changes.description {
        next.description = description;
    }
    if let Some(max_size) = changes.max_size {
        if max_size < 1 {
            return Err(LifecycleError::InvalidPayload(
                "max_size must be at least 1".into(),
            ));
        }
        if (max_size as usize) < next.members.len() {
            return Err(LifecycleError::InvalidPayload(format!(
                "max_size cannot be below the current member count ({})",
                next.members.len()
            )));
        }
        next.max_size = max_size;
    }
    if let Some(skills) = changes.required_skills {
        next.required_skills = skills;
    }
    Ok(next)
}
