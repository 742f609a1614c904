use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use talenthunt_common::lifecycle::user::{UserAccount, set_user_status};
use talenthunt_common::{LifecycleError, Profile, Role, UserStatus};
use tracing::instrument;

use crate::entity::{competition_participant, student_team, team, team_member, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, StatusUpdateRequest, escape_like, page_window};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::user::{find_user, student_teams};

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Admin only. Paginated, optionally filtered by role, status, and a name/email search term.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 400, description = "Bad filter (VALIDATION_ERROR, INVALID_STATUS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_role(&[Role::Admin])?;
    let (page, per_page) = page_window(query.page, query.per_page);

    let mut select = user::Entity::find();

    if let Some(ref role) = query.role {
        let role = role
            .parse::<Role>()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        select = select.filter(user::Column::Role.eq(role));
    }
    if let Some(ref status) = query.status {
        let status: UserStatus = status.parse().map_err(LifecycleError::from)?;
        select = select.filter(user::Column::Status.eq(status));
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let users = select
        .order_by_asc(user::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let student_ids: Vec<i32> = users
        .iter()
        .filter(|u| u.role == Role::Student)
        .map(|u| u.id)
        .collect();
    let mut records: HashMap<i32, Vec<student_team::Model>> = HashMap::new();
    if !student_ids.is_empty() {
        let rows = student_team::Entity::find()
            .filter(student_team::Column::UserId.is_in(student_ids))
            .order_by_asc(student_team::Column::RecordedAt)
            .order_by_asc(student_team::Column::TeamId)
            .all(&state.db)
            .await?;
        for row in rows {
            records.entry(row.user_id).or_default().push(row);
        }
    }

    let data = users
        .into_iter()
        .map(|u| {
            let teams = records.remove(&u.id).unwrap_or_default();
            UserResponse::new(u, teams)
        })
        .collect();

    Ok(Json(UserListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    description = "Users can read their own account; admins can read any.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    if auth_user.user_id != id && !auth_user.is_admin() {
        return Err(AppError::PermissionDenied(
            "You can only view your own account".into(),
        ));
    }
    let user = find_user(&state.db, id).await?;
    let teams = student_teams(&state.db, id).await?;
    Ok(Json(UserResponse::new(user, teams)))
}

#[utoipa::path(
    put,
    path = "/users/me/profile",
    tag = "Users",
    operation_id = "updateMyProfile",
    summary = "Replace the caller's profile",
    description = "The profile's `role` tag must match the account's role; roles never change.",
    request_body = Profile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_my_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<Profile>,
) -> Result<Json<UserResponse>, AppError> {
    let existing = find_user(&state.db, auth_user.user_id).await?;
    validate_profile_update(existing.role, &payload)?;

    let mut active: user::ActiveModel = existing.into();
    active.profile = Set(profile_json(&payload)?);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    let teams = student_teams(&state.db, model.id).await?;
    Ok(Json(UserResponse::new(model, teams)))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/status",
    tag = "Users",
    operation_id = "updateUserStatus",
    summary = "Set a user's account status",
    description = "Admin only. Accepts `pending`, `approved` or `rejected`. Status is informational and does not gate login.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = UserResponse),
        (status = 400, description = "Unknown status (INVALID_STATUS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, status = %payload.status))]
pub async fn update_user_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<StatusUpdateRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let txn = state.db.begin().await?;
    let existing = user::Entity::find_by_id(id)
        .lock(sea_orm::sea_query::LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let account = UserAccount {
        id: existing.id,
        role: existing.role,
        status: existing.status,
    };
    let next = set_user_status(&account, &payload.status, &auth_user.actor())?;

    let mut active: user::ActiveModel = existing.into();
    active.status = Set(next.status);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    let teams = student_teams(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(user_id = id, status = %next.status, "User status changed");
    Ok(Json(UserResponse::new(model, teams)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    description = "Admin only. Removes the account and its memberships and registrations. Teams the user leads stay in place with the leader's membership intact.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(&[Role::Admin])?;

    let txn = state.db.begin().await?;
    find_user(&txn, id).await?;

    team_member::Entity::delete_many()
        .filter(team_member::Column::UserId.eq(id))
        .filter(
            team_member::Column::TeamId.not_in_subquery(
                SeaQuery::select()
                    .column(team::Column::Id)
                    .from(team::Entity)
                    .and_where(team::Column::LeaderId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;
    student_team::Entity::delete_many()
        .filter(student_team::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    competition_participant::Entity::delete_many()
        .filter(competition_participant::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
