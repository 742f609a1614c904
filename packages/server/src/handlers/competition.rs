use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use talenthunt_common::lifecycle::CompetitionDraft;
use talenthunt_common::lifecycle::competition::{
    create_competition as engine_create_competition, register_for_competition,
    revise_competition, set_competition_status, withdraw_from_competition,
};
use talenthunt_common::{CompetitionStatus, LifecycleError};
use tracing::instrument;

use crate::entity::{competition, competition_participant, team, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::competition::*;
use crate::models::shared::{Pagination, StatusUpdateRequest, escape_like, page_window};
use crate::state::AppState;
use crate::utils::competition::{
    find_competition, load_competition, load_competition_for_update, participant_counts,
};
use crate::utils::user::require_account;

#[utoipa::path(
    post,
    path = "/competitions",
    tag = "Competitions",
    operation_id = "createCompetition",
    summary = "Create a competition",
    description = "Organizers and admins. The caller becomes the organizer; the competition starts `pending`. Requires `registration_deadline < start_date < end_date`.",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompetitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_competition(&payload)?;
    let comp = engine_create_competition(&auth_user.actor(), CompetitionDraft::from(payload))?;

    let now = chrono::Utc::now();
    let model = competition::ActiveModel {
        title: Set(comp.title),
        description: Set(comp.description),
        start_date: Set(comp.start_date),
        end_date: Set(comp.end_date),
        registration_deadline: Set(comp.registration_deadline),
        max_participants: Set(comp.max_participants as i32),
        organizer_id: Set(comp.organizer),
        status: Set(comp.status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(competition_id = model.id, organizer = model.organizer_id, "Competition created");
    Ok((
        StatusCode::CREATED,
        Json(CompetitionResponse::new(model, 0)),
    ))
}

#[utoipa::path(
    get,
    path = "/competitions",
    tag = "Competitions",
    operation_id = "listCompetitions",
    summary = "List competitions",
    description = "Paginated list, newest start date first. Filter by status, title search, or `mine` for competitions the caller organizes.",
    params(CompetitionListQuery),
    responses(
        (status = 200, description = "List of competitions", body = CompetitionListResponse),
        (status = 400, description = "Unknown status filter (INVALID_STATUS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_competitions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CompetitionListQuery>,
) -> Result<Json<CompetitionListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);

    let mut select = competition::Entity::find();
    if let Some(ref status) = query.status {
        let status: CompetitionStatus = status.parse().map_err(LifecycleError::from)?;
        select = select.filter(competition::Column::Status.eq(status));
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(competition::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if query.mine.unwrap_or(false) {
        select = select.filter(competition::Column::OrganizerId.eq(auth_user.user_id));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let competitions = select
        .order_by_desc(competition::Column::StartDate)
        .order_by_desc(competition::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids = competitions.iter().map(|c| c.id).collect();
    let counts: HashMap<i32, i64> = participant_counts(&state.db, ids)
        .await?
        .into_iter()
        .collect();

    let data = competitions
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or(0);
            CompetitionResponse::new(c, u64::try_from(count).unwrap_or(0))
        })
        .collect();

    Ok(Json(CompetitionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/competitions/{id}",
    tag = "Competitions",
    operation_id = "getCompetition",
    summary = "Get a competition by ID",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Competition details", body = CompetitionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_competition(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CompetitionResponse>, AppError> {
    let (model, comp) = load_competition(&state.db, id).await?;
    Ok(Json(CompetitionResponse::new(
        model,
        comp.current_participants() as u64,
    )))
}

#[utoipa::path(
    patch,
    path = "/competitions/{id}",
    tag = "Competitions",
    operation_id = "updateCompetition",
    summary = "Update a competition",
    description = "Owning organizer or admin. Date rules are checked against the merged result; `max_participants` cannot drop below the current participant count.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = UpdateCompetitionRequest,
    responses(
        (status = 200, description = "Competition updated", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the organizer (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCompetitionRequest>,
) -> Result<Json<CompetitionResponse>, AppError> {
    validate_update_competition(&payload)?;

    let txn = state.db.begin().await?;
    let (existing, comp) = load_competition_for_update(&txn, id).await?;
    let next = revise_competition(&comp, &auth_user.actor(), payload.into())?;

    let mut active: competition::ActiveModel = existing.into();
    active.title = Set(next.title.clone());
    active.description = Set(next.description.clone());
    active.start_date = Set(next.start_date);
    active.end_date = Set(next.end_date);
    active.registration_deadline = Set(next.registration_deadline);
    active.max_participants = Set(next.max_participants as i32);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    txn.commit().await?;
    Ok(Json(CompetitionResponse::new(
        model,
        next.current_participants() as u64,
    )))
}

#[utoipa::path(
    delete,
    path = "/competitions/{id}",
    tag = "Competitions",
    operation_id = "deleteCompetition",
    summary = "Delete a competition",
    description = "Owning organizer or admin. Removes registrations and detaches teams formed for it. Submissions are kept.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the organizer (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let (_, comp) = load_competition_for_update(&txn, id).await?;
    if !comp.is_managed_by(&auth_user.actor()) {
        return Err(AppError::PermissionDenied(
            "Only the organizing user or an admin can delete this competition".into(),
        ));
    }

    competition_participant::Entity::delete_many()
        .filter(competition_participant::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    team::Entity::update_many()
        .col_expr(team::Column::CompetitionId, Expr::value(Option::<i32>::None))
        .filter(team::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    competition::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(competition_id = id, "Competition deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/competitions/{id}/register",
    tag = "Competitions",
    operation_id = "registerForCompetition",
    summary = "Register for a competition",
    description = "Registers the caller. Checked in order: the competition is approved, the deadline has not passed, a seat is free, the caller is not already registered.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 201, description = "Registered", body = CompetitionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Rejected (NOT_APPROVED, DEADLINE_PASSED, CAPACITY_EXCEEDED, ALREADY_REGISTERED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn register(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let (model, comp) = load_competition_for_update(&txn, id).await?;
    require_account(&txn, auth_user.user_id).await?;
    let next = register_for_competition(&comp, auth_user.user_id, now)?;

    let inserted = competition_participant::ActiveModel {
        competition_id: Set(id),
        user_id: Set(auth_user.user_id),
        registered_at: Set(now),
    }
    .insert(&txn)
    .await;
    match inserted {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(LifecycleError::AlreadyRegistered.into());
        }
        Err(e) => return Err(e.into()),
    }

    txn.commit().await?;

    tracing::info!(
        competition_id = id,
        user_id = auth_user.user_id,
        participants = next.current_participants(),
        "Registered for competition"
    );
    Ok((
        StatusCode::CREATED,
        Json(CompetitionResponse::new(
            model,
            next.current_participants() as u64,
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/competitions/{id}/register",
    tag = "Competitions",
    operation_id = "withdrawFromCompetition",
    summary = "Withdraw from a competition",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 204, description = "Withdrawn"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found or not registered (NOT_FOUND, NOT_REGISTERED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn withdraw(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let (_, comp) = load_competition_for_update(&txn, id).await?;
    withdraw_from_competition(&comp, auth_user.user_id)?;

    competition_participant::Entity::delete_by_id((id, auth_user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    tracing::info!(competition_id = id, user_id = auth_user.user_id, "Withdrew from competition");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/competitions/{id}/participants",
    tag = "Competitions",
    operation_id = "listParticipants",
    summary = "List registered participants",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Participants in registration order", body = Vec<ParticipantResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn list_participants(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ParticipantResponse>>, AppError> {
    find_competition(&state.db, id).await?;

    let rows = competition_participant::Entity::find()
        .filter(competition_participant::Column::CompetitionId.eq(id))
        .order_by_asc(competition_participant::Column::RegisteredAt)
        .order_by_asc(competition_participant::Column::UserId)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = rows.iter().map(|r| r.user_id).collect();
    let users: HashMap<i32, user::Model> = if ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    let data = rows
        .into_iter()
        .filter_map(|r| {
            users.get(&r.user_id).map(|u| ParticipantResponse {
                user_id: r.user_id,
                name: u.name.clone(),
                email: u.email.clone(),
                registered_at: r.registered_at,
            })
        })
        .collect();

    Ok(Json(data))
}

#[utoipa::path(
    patch,
    path = "/competitions/{id}/status",
    tag = "Competitions",
    operation_id = "updateCompetitionStatus",
    summary = "Set a competition's status",
    description = "Admin only. Accepts `pending`, `approved`, `rejected`, `active` or `completed` from any prior status.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = CompetitionResponse),
        (status = 400, description = "Unknown status (INVALID_STATUS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, status = %payload.status))]
pub async fn update_competition_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<StatusUpdateRequest>,
) -> Result<Json<CompetitionResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (existing, comp) = load_competition_for_update(&txn, id).await?;
    let next = set_competition_status(&comp, &payload.status, &auth_user.actor())?;

    let mut active: competition::ActiveModel = existing.into();
    active.status = Set(next.status);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(competition_id = id, status = %next.status, "Competition status changed");
    Ok(Json(CompetitionResponse::new(
        model,
        next.current_participants() as u64,
    )))
}
