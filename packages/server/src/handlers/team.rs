use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::{OnConflict, Query as SeaQuery};
use sea_orm::*;
use talenthunt_common::lifecycle::team::{
    create_team as engine_create_team, join_team as engine_join_team,
    leave_team as engine_leave_team, revise_team, set_team_status,
};
use talenthunt_common::lifecycle::{MembershipRecord, TeamDraft};
use talenthunt_common::{LifecycleError, Role, TeamRole, TeamStatus};
use tracing::instrument;

use crate::entity::{student_team, team, team_member, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, StatusUpdateRequest, page_window};
use crate::models::team::*;
use crate::state::AppState;
use crate::utils::competition::find_competition;
use crate::utils::team::{find_team_for_update, load_team, load_team_for_update};
use crate::utils::user::require_account;

#[utoipa::path(
    post,
    path = "/teams",
    tag = "Teams",
    operation_id = "createTeam",
    summary = "Create a team",
    description = "Students only. The caller becomes the leader and first member; the team starts `pending`.",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller is not a student (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_team(&payload)?;
    let team = engine_create_team(&auth_user.actor(), TeamDraft::from(payload))?;

    let txn = state.db.begin().await?;
    require_account(&txn, auth_user.user_id).await?;
    if let Some(competition_id) = team.competition {
        find_competition(&txn, competition_id).await?;
    }

    let now = chrono::Utc::now();
    let model = team::ActiveModel {
        name: Set(team.name.clone()),
        description: Set(team.description.clone()),
        leader_id: Set(team.leader),
        max_size: Set(team.max_size as i32),
        required_skills: Set(serde_json::Value::from(team.required_skills.clone())),
        status: Set(team.status),
        competition_id: Set(team.competition),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    team_member::ActiveModel {
        team_id: Set(model.id),
        user_id: Set(team.leader),
        joined_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(team_id = model.id, leader = team.leader, "Team created");
    Ok((
        StatusCode::CREATED,
        Json(TeamResponse::new(model, team.members)),
    ))
}

#[utoipa::path(
    get,
    path = "/teams",
    tag = "Teams",
    operation_id = "listTeams",
    summary = "List teams",
    description = "Paginated list of teams, filterable by status, competition, and the caller's own memberships.",
    params(TeamListQuery),
    responses(
        (status = 200, description = "List of teams", body = TeamListResponse),
        (status = 400, description = "Unknown status filter (INVALID_STATUS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_teams(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TeamListQuery>,
) -> Result<Json<TeamListResponse>, AppError> {
    let (page, per_page) = page_window(query.page, query.per_page);

    let mut select = team::Entity::find();
    if let Some(ref status) = query.status {
        let status: TeamStatus = status.parse().map_err(LifecycleError::from)?;
        select = select.filter(team::Column::Status.eq(status));
    }
    if let Some(competition_id) = query.competition_id {
        select = select.filter(team::Column::CompetitionId.eq(competition_id));
    }
    if query.mine.unwrap_or(false) {
        select = select.filter(
            team::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(team_member::Column::TeamId)
                    .from(team_member::Entity)
                    .and_where(team_member::Column::UserId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        );
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let teams = select
        .order_by_desc(team::Column::CreatedAt)
        .order_by_desc(team::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = teams.iter().map(|t| t.id).collect();
    let mut members: HashMap<i32, Vec<i32>> = HashMap::new();
    if !ids.is_empty() {
        let rows: Vec<(i32, i32)> = team_member::Entity::find()
            .filter(team_member::Column::TeamId.is_in(ids))
            .order_by_asc(team_member::Column::JoinedAt)
            .order_by_asc(team_member::Column::UserId)
            .select_only()
            .column(team_member::Column::TeamId)
            .column(team_member::Column::UserId)
            .into_tuple()
            .all(&state.db)
            .await?;
        for (team_id, user_id) in rows {
            members.entry(team_id).or_default().push(user_id);
        }
    }

    let data = teams
        .into_iter()
        .map(|t| {
            let team_members = members.remove(&t.id).unwrap_or_default();
            TeamResponse::new(t, team_members)
        })
        .collect();

    Ok(Json(TeamListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "Teams",
    operation_id = "getTeam",
    summary = "Get a team by ID",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_team(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let (model, team) = load_team(&state.db, id).await?;
    Ok(Json(TeamResponse::new(model, team.members)))
}

#[utoipa::path(
    patch,
    path = "/teams/{id}",
    tag = "Teams",
    operation_id = "updateTeam",
    summary = "Update a team",
    description = "Leader or admin. Partial update; `max_size` cannot drop below the current member count. The leader never changes.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the leader (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    validate_update_team(&payload)?;

    let txn = state.db.begin().await?;
    let (existing, team) = load_team_for_update(&txn, id).await?;
    let next = revise_team(&team, &auth_user.actor(), payload.into())?;

    let mut active: team::ActiveModel = existing.into();
    active.name = Set(next.name.clone());
    active.description = Set(next.description.clone());
    active.max_size = Set(next.max_size as i32);
    active.required_skills = Set(serde_json::Value::from(next.required_skills.clone()));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    txn.commit().await?;
    Ok(Json(TeamResponse::new(model, next.members)))
}

#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "Teams",
    operation_id = "deleteTeam",
    summary = "Delete a team",
    description = "Leader or admin. Removes the team's memberships and profile records. Submissions are kept.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the leader (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_team_for_update(&txn, id).await?;
    if existing.leader_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only the team leader or an admin can delete this team".into(),
        ));
    }

    team_member::Entity::delete_many()
        .filter(team_member::Column::TeamId.eq(id))
        .exec(&txn)
        .await?;
    student_team::Entity::delete_many()
        .filter(student_team::Column::TeamId.eq(id))
        .exec(&txn)
        .await?;
    team::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(team_id = id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/teams/{id}/join",
    tag = "Teams",
    operation_id = "joinTeam",
    summary = "Join a team",
    description = "Adds the caller to an approved team that still has room. Students also get a `member` record on their profile.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Joined", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Rejected (NOT_APPROVED, ALREADY_MEMBER, CAPACITY_EXCEEDED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn join_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (model, team) = load_team_for_update(&txn, id).await?;
    require_account(&txn, auth_user.user_id).await?;
    let next = engine_join_team(&team, auth_user.user_id)?;

    let now = chrono::Utc::now();
    let inserted = team_member::ActiveModel {
        team_id: Set(id),
        user_id: Set(auth_user.user_id),
        joined_at: Set(now),
    }
    .insert(&txn)
    .await;
    match inserted {
        Ok(_) => {}
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(LifecycleError::AlreadyMember.into());
        }
        Err(e) => return Err(e.into()),
    }

    if auth_user.role == Role::Student {
        let record = MembershipRecord {
            user: auth_user.user_id,
            role: TeamRole::Member,
        };
        record_memberships(&txn, id, &[record]).await?;
    }
    let model = touch_team(&txn, model, now).await?;

    txn.commit().await?;

    tracing::info!(
        team_id = id,
        user_id = auth_user.user_id,
        members = next.members.len(),
        "Joined team"
    );
    Ok(Json(TeamResponse::new(model, next.members)))
}

#[utoipa::path(
    post,
    path = "/teams/{id}/leave",
    tag = "Teams",
    operation_id = "leaveTeam",
    summary = "Leave a team",
    description = "Removes the caller from the team and drops the matching profile record. The leader cannot leave.",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Left", body = TeamResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a member (NOT_TEAM_MEMBER)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Leader cannot leave (LEADER_CANNOT_LEAVE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn leave_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (model, team) = load_team_for_update(&txn, id).await?;
    let next = engine_leave_team(&team, auth_user.user_id)?;

    team_member::Entity::delete_by_id((id, auth_user.user_id))
        .exec(&txn)
        .await?;
    student_team::Entity::delete_by_id((auth_user.user_id, id))
        .exec(&txn)
        .await?;
    let model = touch_team(&txn, model, chrono::Utc::now()).await?;

    txn.commit().await?;
    tracing::info!(team_id = id, user_id = auth_user.user_id, "Left team");
    Ok(Json(TeamResponse::new(model, next.members)))
}

#[utoipa::path(
    patch,
    path = "/teams/{id}/status",
    tag = "Teams",
    operation_id = "updateTeamStatus",
    summary = "Set a team's status",
    description = "Admin only. Accepts `pending`, `approved` or `rejected` from any prior status. Approving records a `leader`/`member` entry on every student member's profile in the same transaction.",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = TeamResponse),
        (status = 400, description = "Unknown status (INVALID_STATUS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, status = %payload.status))]
pub async fn update_team_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<StatusUpdateRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (existing, team) = load_team_for_update(&txn, id).await?;
    let change = set_team_status(&team, &payload.status, &auth_user.actor())?;

    let mut active: team::ActiveModel = existing.into();
    active.status = Set(change.team.status);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;

    if !change.memberships.is_empty() {
        let ids: Vec<i32> = change.memberships.iter().map(|m| m.user).collect();
        let students: Vec<i32> = user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .filter(user::Column::Role.eq(Role::Student))
            .select_only()
            .column(user::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;
        let records: Vec<MembershipRecord> = change
            .memberships
            .into_iter()
            .filter(|m| students.contains(&m.user))
            .collect();
        record_memberships(&txn, id, &records).await?;
    }

    txn.commit().await?;

    tracing::info!(team_id = id, status = %model.status, "Team status changed");
    Ok(Json(TeamResponse::new(model, change.team.members)))
}

/// Bump `updated_at` after a membership change.
async fn touch_team(
    txn: &DatabaseTransaction,
    model: team::Model,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<team::Model, DbErr> {
    let mut active: team::ActiveModel = model.into();
    active.updated_at = Set(now);
    active.update(txn).await
}

/// Write profile membership records, skipping ones that already exist.
async fn record_memberships(
    txn: &DatabaseTransaction,
    team_id: i32,
    records: &[MembershipRecord],
) -> Result<(), AppError> {
    let now = chrono::Utc::now();
    let mut inserted = 0u64;
    for record in records {
        let model = student_team::ActiveModel {
            user_id: Set(record.user),
            team_id: Set(team_id),
            role: Set(record.role),
            recorded_at: Set(now),
        };

        let result = student_team::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([student_team::Column::UserId, student_team::Column::TeamId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await;

        match result {
            Ok(n) => inserted += n,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if inserted > 0 {
        tracing::debug!(team_id, inserted, "Recorded team memberships");
    }
    Ok(())
}
