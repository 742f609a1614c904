use sea_orm::sea_query::LockType;
use sea_orm::*;
use talenthunt_common::lifecycle::Team;

use crate::entity::{team, team_member};
use crate::error::AppError;
use crate::models::team::skills_from_json;

/// Look up a team by ID, returning 404 if not found.
pub async fn find_team<C: ConnectionTrait>(db: &C, id: i32) -> Result<team::Model, AppError> {
    team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))
}

/// Like [`find_team`], but takes a row lock held until `txn` ends.
pub async fn find_team_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<team::Model, AppError> {
    team::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))
}

/// Member ids in join order.
pub async fn team_members<C: ConnectionTrait>(db: &C, team_id: i32) -> Result<Vec<i32>, DbErr> {
    team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::UserId)
        .select_only()
        .column(team_member::Column::UserId)
        .into_tuple()
        .all(db)
        .await
}

pub async fn is_team_member<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
    user_id: i32,
) -> Result<bool, DbErr> {
    Ok(team_member::Entity::find_by_id((team_id, user_id))
        .one(db)
        .await?
        .is_some())
}

/// Engine view of a stored team.
pub fn team_snapshot(model: &team::Model, members: Vec<i32>) -> Team {
    Team {
        id: Some(model.id),
        name: model.name.clone(),
        description: model.description.clone(),
        leader: model.leader_id,
        members,
        max_size: u32::try_from(model.max_size).unwrap_or(0),
        required_skills: skills_from_json(&model.required_skills),
        status: model.status,
        competition: model.competition_id,
    }
}

/// Load a team together with its members.
pub async fn load_team<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<(team::Model, Team), AppError> {
    let model = find_team(db, id).await?;
    let members = team_members(db, id).await?;
    let snapshot = team_snapshot(&model, members);
    Ok((model, snapshot))
}

/// [`load_team`] under a row lock on the team.
pub async fn load_team_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<(team::Model, Team), AppError> {
    let model = find_team_for_update(txn, id).await?;
    let members = team_members(txn, id).await?;
    let snapshot = team_snapshot(&model, members);
    Ok((model, snapshot))
}
