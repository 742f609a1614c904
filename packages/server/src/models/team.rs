use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use talenthunt_common::TeamStatus;
use talenthunt_common::lifecycle::{TeamChanges, TeamDraft};

use super::shared::{Pagination, validate_tags, validate_text};
use crate::entity::team;
use crate::error::AppError;

/// Largest team the API accepts.
pub const MAX_TEAM_SIZE: u32 = 50;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeamRequest {
    #[schema(example = "Alpha")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Maximum number of members, leader included.
    #[schema(example = 4)]
    pub max_size: u32,
    #[serde(default)]
    #[schema(example = json!(["rust", "ml"]))]
    pub required_skills: Vec<String>,
    /// Competition this team is formed for.
    pub competition_id: Option<i32>,
}

impl From<CreateTeamRequest> for TeamDraft {
    fn from(req: CreateTeamRequest) -> Self {
        TeamDraft {
            name: req.name,
            description: req.description,
            max_size: req.max_size,
            required_skills: req.required_skills,
            competition: req.competition_id,
        }
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_size: Option<u32>,
    pub required_skills: Option<Vec<String>>,
}

impl From<UpdateTeamRequest> for TeamChanges {
    fn from(req: UpdateTeamRequest) -> Self {
        TeamChanges {
            name: req.name,
            description: req.description,
            max_size: req.max_size,
            required_skills: req.required_skills,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Filter by status.
    pub status: Option<String>,
    pub competition_id: Option<i32>,
    /// Only teams the caller belongs to.
    pub mine: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub leader_id: i32,
    /// Member ids in join order; the leader comes first.
    pub members: Vec<i32>,
    pub max_size: i32,
    pub required_skills: Vec<String>,
    pub status: TeamStatus,
    pub competition_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamResponse {
    pub fn new(m: team::Model, members: Vec<i32>) -> Self {
        Self {
            required_skills: skills_from_json(&m.required_skills),
            id: m.id,
            name: m.name,
            description: m.description,
            leader_id: m.leader_id,
            members,
            max_size: m.max_size,
            status: m.status,
            competition_id: m.competition_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamListResponse {
    pub data: Vec<TeamResponse>,
    pub pagination: Pagination,
}

/// Read the `required_skills` column. Non-string entries are skipped.
pub fn skills_from_json(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

pub fn validate_create_team(req: &CreateTeamRequest) -> Result<(), AppError> {
    validate_text(&req.name, "Team name", 128)?;
    if req.description.len() > 10_000 {
        return Err(AppError::Validation(
            "Description must be at most 10000 bytes".into(),
        ));
    }
    validate_max_size(req.max_size)?;
    validate_tags(&req.required_skills, "required_skills", 30)
}

pub fn validate_update_team(req: &UpdateTeamRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text(name, "Team name", 128)?;
    }
    if let Some(ref description) = req.description
        && description.len() > 10_000
    {
        return Err(AppError::Validation(
            "Description must be at most 10000 bytes".into(),
        ));
    }
    if let Some(max_size) = req.max_size {
        validate_max_size(max_size)?;
    }
    if let Some(ref skills) = req.required_skills {
        validate_tags(skills, "required_skills", 30)?;
    }
    Ok(())
}

fn validate_max_size(max_size: u32) -> Result<(), AppError> {
    if !(1..=MAX_TEAM_SIZE).contains(&max_size) {
        return Err(AppError::Validation(format!(
            "max_size must be between 1 and {MAX_TEAM_SIZE}"
        )));
    }
    Ok(())
}
