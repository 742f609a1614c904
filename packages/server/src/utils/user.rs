use sea_orm::*;

use crate::entity::{student_team, user};
use crate::error::AppError;

/// Look up a user by ID, returning 404 if not found.
pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// The caller's account, which must still exist.
///
/// Tokens outlive deleted accounts; membership writes check this inside
/// their transaction so a stale token cannot take a seat.
pub async fn require_account<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::TokenInvalid)
}

/// Membership records on a student's profile, oldest first.
pub async fn student_teams<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<student_team::Model>, DbErr> {
    student_team::Entity::find()
        .filter(student_team::Column::UserId.eq(user_id))
        .order_by_asc(student_team::Column::RecordedAt)
        .order_by_asc(student_team::Column::TeamId)
        .all(db)
        .await
}
