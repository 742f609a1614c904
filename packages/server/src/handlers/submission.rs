use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{LockType, Query as SeaQuery};
use sea_orm::*;
use talenthunt_common::lifecycle::submission::{create_submission as engine_create_submission, review_submission};
use talenthunt_common::lifecycle::{Submission, SubmissionDraft, SubmissionReview};
use talenthunt_common::{LifecycleError, Role, SubmissionStatus};
use tracing::instrument;

use crate::entity::{submission, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, page_window};
use crate::models::submission::*;
use crate::state::AppState;
use crate::utils::competition::load_competition;
use crate::utils::team::{is_team_member, load_team};
use crate::utils::user::require_account;

/// Roles that see every submission.
const REVIEWER_ROLES: &[Role] = &[Role::Organizer, Role::Admin];

#[utoipa::path(
    post,
    path = "/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit work for a team",
    description = "The caller must be a member of the team. The submission starts `pending`.",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a team member (NOT_TEAM_MEMBER)", body = ErrorBody),
        (status = 404, description = "Team or competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(team_id = payload.team_id, competition_id = payload.competition_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_submission(&payload)?;
    require_account(&state.db, auth_user.user_id).await?;

    let (_, team) = load_team(&state.db, payload.team_id).await?;
    let (_, comp) = load_competition(&state.db, payload.competition_id).await?;
    let draft = SubmissionDraft {
        files: payload.files,
        description: payload.description,
    };
    let sub = engine_create_submission(&team, &comp, &auth_user.actor(), draft)?;

    let now = chrono::Utc::now();
    let model = submission::ActiveModel {
        team_id: Set(sub.team),
        competition_id: Set(sub.competition),
        files: Set(files_to_json(&sub.files)?),
        description: Set(sub.description),
        submitted_by: Set(sub.submitted_by),
        status: Set(sub.status),
        feedback: Set(None),
        score: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(submission_id = model.id, team_id = model.team_id, "Submission created");
    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/submissions",
    tag = "Submissions",
    operation_id = "listSubmissions",
    summary = "List submissions",
    description = "Organizers and admins see every submission; other users see those of teams they belong to.",
    params(SubmissionListQuery),
    responses(
        (status = 200, description = "List of submissions", body = SubmissionListResponse),
        (status = 400, description = "Unknown status filter (INVALID_STATUS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);

    let mut select = submission::Entity::find();
    if !REVIEWER_ROLES.contains(&auth_user.role) {
        select = select.filter(
            submission::Column::TeamId.in_subquery(
                SeaQuery::select()
                    .column(team_member::Column::TeamId)
                    .from(team_member::Entity)
                    .and_where(team_member::Column::UserId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(team_id) = query.team_id {
        select = select.filter(submission::Column::TeamId.eq(team_id));
    }
    if let Some(competition_id) = query.competition_id {
        select = select.filter(submission::Column::CompetitionId.eq(competition_id));
    }
    if let Some(ref status) = query.status {
        let status: SubmissionStatus = status.parse().map_err(LifecycleError::from)?;
        select = select.filter(submission::Column::Status.eq(status));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(submission::Column::CreatedAt)
        .order_by_desc(submission::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();

    Ok(Json(SubmissionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/submissions/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission by ID",
    description = "Visible to organizers, admins, and members of the submitting team.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let model = submission::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;

    if !REVIEWER_ROLES.contains(&auth_user.role)
        && !is_team_member(&state.db, model.team_id, auth_user.user_id).await?
    {
        return Err(AppError::PermissionDenied(
            "Only team members and reviewers can view this submission".into(),
        ));
    }
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/submissions/{id}/status",
    tag = "Submissions",
    operation_id = "reviewSubmission",
    summary = "Review a submission",
    description = "Organizers only. Sets status (`pending`, `reviewed`, `approved`, `rejected`) and optionally feedback and a 0-100 score.",
    params(("id" = i32, Path, description = "Submission ID")),
    request_body = ReviewSubmissionRequest,
    responses(
        (status = 200, description = "Submission reviewed", body = SubmissionResponse),
        (status = 400, description = "Bad status or score (INVALID_STATUS, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, status = %payload.status))]
pub async fn review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReviewSubmissionRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (existing, sub) = find_submission_for_update(&txn, id).await?;
    let review = SubmissionReview {
        feedback: payload.feedback,
        score: payload.score,
    };
    let next = review_submission(
        &sub,
        &payload.status,
        review,
        &auth_user.actor(),
        &[Role::Organizer],
    )?;

    let mut active: submission::ActiveModel = existing.into();
    active.status = Set(next.status);
    active.feedback = Set(next.feedback.clone());
    active.score = Set(next.score.map(i32::from));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(submission_id = id, status = %next.status, "Submission reviewed");
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/submissions/{id}",
    tag = "Submissions",
    operation_id = "updateSubmission",
    summary = "Replace a submission",
    description = "Admins only. Replaces status, description and files; feedback and score are updated when present.",
    params(("id" = i32, Path, description = "Submission ID")),
    request_body = UpdateSubmissionRequest,
    responses(
        (status = 200, description = "Submission updated", body = SubmissionResponse),
        (status = 400, description = "Bad status or payload (INVALID_STATUS, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, status = %payload.status))]
pub async fn update_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSubmissionRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    validate_update_submission(&payload)?;

    let txn = state.db.begin().await?;
    let (existing, sub) = find_submission_for_update(&txn, id).await?;
    let review = SubmissionReview {
        feedback: payload.feedback,
        score: payload.score,
    };
    let next = review_submission(
        &sub,
        &payload.status,
        review,
        &auth_user.actor(),
        &[Role::Admin],
    )?;

    let mut active: submission::ActiveModel = existing.into();
    active.status = Set(next.status);
    active.description = Set(payload.description);
    active.files = Set(files_to_json(&payload.files)?);
    active.feedback = Set(next.feedback.clone());
    active.score = Set(next.score.map(i32::from));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(submission_id = id, status = %next.status, "Submission updated");
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/submissions/{id}",
    tag = "Submissions",
    operation_id = "deleteSubmission",
    summary = "Delete a submission",
    description = "Admins only.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 204, description = "Submission deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(&[Role::Admin])?;

    let result = submission::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Submission not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_submission_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<(submission::Model, Submission), AppError> {
    let model = submission::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;

    let snapshot = Submission {
        id: Some(model.id),
        team: model.team_id,
        competition: model.competition_id,
        files: files_from_json(&model.files),
        description: model.description.clone(),
        submitted_by: model.submitted_by,
        status: model.status,
        feedback: model.feedback.clone(),
        score: score_from_column(model.score),
    };
    Ok((model, snapshot))
}
