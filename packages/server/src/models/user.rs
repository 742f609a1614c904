use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use talenthunt_common::{Profile, Role, TeamRole, UserStatus};

use super::shared::{Pagination, validate_tags, validate_text};
use crate::entity::{student_team, user};
use crate::error::AppError;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Filter by role.
    pub role: Option<String>,
    /// Filter by account status.
    pub status: Option<String>,
    /// Case-insensitive substring of name or email.
    pub search: Option<String>,
}

/// One entry of a student's `teams` list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamMembershipView {
    pub team_id: i32,
    pub role: TeamRole,
    pub recorded_at: DateTime<Utc>,
}

impl From<student_team::Model> for TeamMembershipView {
    fn from(m: student_team::Model) -> Self {
        Self {
            team_id: m.team_id,
            role: m.role,
            recorded_at: m.recorded_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i32,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    pub profile: Profile,
    /// Team memberships recorded on approval. Present for students only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<TeamMembershipView>>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Build the response, attaching `teams` when the user is a student.
    pub fn new(model: user::Model, teams: Vec<student_team::Model>) -> Self {
        let profile = stored_profile(&model);
        let teams = (model.role == Role::Student)
            .then(|| teams.into_iter().map(TeamMembershipView::from).collect());
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            status: model.status,
            profile,
            teams,
            created_at: model.created_at,
        }
    }
}

/// Decode the stored profile column, falling back to an empty profile of
/// the account's role if the column cannot be read.
pub fn stored_profile(model: &user::Model) -> Profile {
    match serde_json::from_value::<Profile>(model.profile.clone()) {
        Ok(profile) if profile.role() == model.role => profile,
        _ => {
            tracing::warn!(user_id = model.id, "Unreadable profile column, using empty profile");
            empty_profile(model.role)
        }
    }
}

pub fn empty_profile(role: Role) -> Profile {
    match role {
        Role::Student => Profile::Student(Default::default()),
        Role::Mentor => Profile::Mentor(Default::default()),
        Role::Organizer => Profile::Organizer(Default::default()),
        Role::Admin => Profile::Admin,
    }
}

/// Encode a profile for the `profile` column.
pub fn profile_json(profile: &Profile) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(profile)
        .map_err(|e| AppError::Internal(format!("Profile encode error: {e}")))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

/// Field-level checks on a role profile.
pub fn validate_profile(profile: &Profile) -> Result<(), AppError> {
    match profile {
        Profile::Student(p) => {
            validate_text(&p.institution, "Institution", 200)?;
            validate_text(&p.course, "Course", 200)?;
            validate_text(&p.student_id, "Student ID", 64)?;
            if !(1..=10).contains(&p.year) {
                return Err(AppError::Validation("Year must be between 1 and 10".into()));
            }
            validate_tags(&p.skills, "skills", 50)?;
            validate_tags(&p.interests, "interests", 50)?;
            validate_tags(&p.certifications, "certifications", 50)?;
            validate_tags(&p.projects, "projects", 50)
        }
        Profile::Mentor(p) => {
            validate_text(&p.organization, "Organization", 200)?;
            validate_text(&p.designation, "Designation", 200)?;
            validate_tags(&p.expertise, "expertise", 50)?;
            if p.max_teams < 1 {
                return Err(AppError::Validation("max_teams must be at least 1".into()));
            }
            Ok(())
        }
        Profile::Organizer(p) => {
            validate_text(&p.organization, "Organization", 200)?;
            validate_text(&p.designation, "Designation", 200)?;
            validate_text(&p.contact_number, "Contact number", 32)?;
            validate_tags(&p.previous_events, "previous_events", 100)
        }
        Profile::Admin => Ok(()),
    }
}

/// A replacement profile must be the same variant as the account's role.
pub fn validate_profile_update(role: Role, profile: &Profile) -> Result<(), AppError> {
    if profile.role() != role {
        return Err(AppError::Validation(format!(
            "Profile for role '{}' cannot be stored on a '{}' account",
            profile.role(),
            role
        )));
    }
    validate_profile(profile)
}
