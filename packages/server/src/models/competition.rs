use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use talenthunt_common::CompetitionStatus;
use talenthunt_common::lifecycle::{CompetitionChanges, CompetitionDraft};

use super::shared::{Pagination, validate_text};
use crate::entity::competition;
use crate::error::AppError;

/// Upper bound on `max_participants` accepted by the API.
pub const MAX_PARTICIPANTS: u32 = 100_000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompetitionRequest {
    #[schema(example = "Spring Hackathon")]
    pub title: String,
    /// Markdown.
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Must fall before `start_date`.
    pub registration_deadline: DateTime<Utc>,
    #[schema(example = 100)]
    pub max_participants: u32,
}

impl From<CreateCompetitionRequest> for CompetitionDraft {
    fn from(req: CreateCompetitionRequest) -> Self {
        CompetitionDraft {
            title: req.title,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            registration_deadline: req.registration_deadline,
            max_participants: req.max_participants,
        }
    }
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateCompetitionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_participants: Option<u32>,
}

impl From<UpdateCompetitionRequest> for CompetitionChanges {
    fn from(req: UpdateCompetitionRequest) -> Self {
        CompetitionChanges {
            title: req.title,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            registration_deadline: req.registration_deadline,
            max_participants: req.max_participants,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompetitionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Only competitions organized by the caller.
    pub mine: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_participants: i32,
    /// Number of registered participants, computed on read.
    pub current_participants: u64,
    pub organizer_id: i32,
    pub status: CompetitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompetitionResponse {
    pub fn new(m: competition::Model, current_participants: u64) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            start_date: m.start_date,
            end_date: m.end_date,
            registration_deadline: m.registration_deadline,
            max_participants: m.max_participants,
            current_participants,
            organizer_id: m.organizer_id,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionListResponse {
    pub data: Vec<CompetitionResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantResponse {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

pub fn validate_create_competition(req: &CreateCompetitionRequest) -> Result<(), AppError> {
    validate_text(&req.title, "Title", 256)?;
    validate_description(&req.description)?;
    validate_max_participants(req.max_participants)
}

pub fn validate_update_competition(req: &UpdateCompetitionRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_text(title, "Title", 256)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(max) = req.max_participants {
        validate_max_participants(max)?;
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.len() > 1_000_000 {
        return Err(AppError::Validation(
            "Description must be at most 1MB".into(),
        ));
    }
    Ok(())
}

fn validate_max_participants(max: u32) -> Result<(), AppError> {
    if !(1..=MAX_PARTICIPANTS).contains(&max) {
        return Err(AppError::Validation(format!(
            "max_participants must be between 1 and {MAX_PARTICIPANTS}"
        )));
    }
    Ok(())
}
