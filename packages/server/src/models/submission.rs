use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use talenthunt_common::SubmissionStatus;
use talenthunt_common::lifecycle::SubmissionFile;

use super::shared::Pagination;
use crate::entity::submission;
use crate::error::AppError;

/// Most files one submission may reference.
pub const MAX_FILES: usize = 20;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    pub team_id: i32,
    pub competition_id: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<SubmissionFile>,
}

/// Organizer review: new status plus optional feedback and score.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReviewSubmissionRequest {
    #[schema(example = "reviewed")]
    pub status: String,
    pub feedback: Option<String>,
    /// 0-100.
    #[schema(example = 87)]
    pub score: Option<u8>,
}

/// Admin full update. Replaces description and files.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSubmissionRequest {
    pub status: String,
    pub description: String,
    pub files: Vec<SubmissionFile>,
    pub feedback: Option<String>,
    pub score: Option<u8>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubmissionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub team_id: Option<i32>,
    pub competition_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub team_id: i32,
    pub competition_id: i32,
    pub files: Vec<SubmissionFile>,
    pub description: String,
    pub submitted_by: i32,
    pub status: SubmissionStatus,
    pub feedback: Option<String>,
    pub score: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(m: submission::Model) -> Self {
        Self {
            files: files_from_json(&m.files),
            score: score_from_column(m.score),
            id: m.id,
            team_id: m.team_id,
            competition_id: m.competition_id,
            description: m.description,
            submitted_by: m.submitted_by,
            status: m.status,
            feedback: m.feedback,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListResponse {
    pub data: Vec<SubmissionResponse>,
    pub pagination: Pagination,
}

/// Read the `files` column; an unreadable column yields no files.
pub fn files_from_json(value: &serde_json::Value) -> Vec<SubmissionFile> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

pub fn files_to_json(files: &[SubmissionFile]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(files).map_err(|e| AppError::Internal(format!("Files encode error: {e}")))
}

pub fn score_from_column(score: Option<i32>) -> Option<u8> {
    score.and_then(|s| u8::try_from(s).ok())
}

pub fn validate_files(files: &[SubmissionFile]) -> Result<(), AppError> {
    if files.len() > MAX_FILES {
        return Err(AppError::Validation(format!(
            "Too many files: max {MAX_FILES}"
        )));
    }
    for file in files {
        if file.filename.trim().is_empty() || file.filename.len() > 255 {
            return Err(AppError::Validation(
                "Filename must be 1-255 characters".into(),
            ));
        }
        if file.url.trim().is_empty() || file.url.len() > 2048 {
            return Err(AppError::Validation(format!(
                "File '{}' needs a url of at most 2048 characters",
                file.filename
            )));
        }
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.len() > 100_000 {
        return Err(AppError::Validation(
            "Description must be at most 100000 bytes".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_submission(req: &CreateSubmissionRequest) -> Result<(), AppError> {
    validate_description(&req.description)?;
    validate_files(&req.files)
}

pub fn validate_update_submission(req: &UpdateSubmissionRequest) -> Result<(), AppError> {
    validate_description(&req.description)?;
    validate_files(&req.files)
}
