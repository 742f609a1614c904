use sea_orm::sea_query::LockType;
use sea_orm::*;
use talenthunt_common::lifecycle::Competition;

use crate::entity::{competition, competition_participant};
use crate::error::AppError;

/// Look up a competition by ID, returning 404 if not found.
pub async fn find_competition<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<competition::Model, AppError> {
    competition::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Competition not found".into()))
}

async fn find_competition_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<competition::Model, AppError> {
    competition::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Competition not found".into()))
}

/// Participant ids in registration order.
pub async fn participants<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
) -> Result<Vec<i32>, DbErr> {
    competition_participant::Entity::find()
        .filter(competition_participant::Column::CompetitionId.eq(competition_id))
        .order_by_asc(competition_participant::Column::RegisteredAt)
        .order_by_asc(competition_participant::Column::UserId)
        .select_only()
        .column(competition_participant::Column::UserId)
        .into_tuple()
        .all(db)
        .await
}

/// Participant counts for a page of competitions. Missing ids have no participants.
pub async fn participant_counts<C: ConnectionTrait>(
    db: &C,
    competition_ids: Vec<i32>,
) -> Result<Vec<(i32, i64)>, DbErr> {
    if competition_ids.is_empty() {
        return Ok(Vec::new());
    }
    competition_participant::Entity::find()
        .filter(competition_participant::Column::CompetitionId.is_in(competition_ids))
        .select_only()
        .column(competition_participant::Column::CompetitionId)
        .column_as(competition_participant::Column::UserId.count(), "count")
        .group_by(competition_participant::Column::CompetitionId)
        .into_tuple()
        .all(db)
        .await
}

/// Engine view of a stored competition.
pub fn competition_snapshot(model: &competition::Model, participants: Vec<i32>) -> Competition {
    Competition {
        id: Some(model.id),
        title: model.title.clone(),
        description: model.description.clone(),
        start_date: model.start_date,
        end_date: model.end_date,
        registration_deadline: model.registration_deadline,
        max_participants: u32::try_from(model.max_participants).unwrap_or(0),
        organizer: model.organizer_id,
        participants,
        status: model.status,
    }
}

pub async fn load_competition<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<(competition::Model, Competition), AppError> {
    let model = find_competition(db, id).await?;
    let participants = participants(db, id).await?;
    let snapshot = competition_snapshot(&model, participants);
    Ok((model, snapshot))
}

/// [`load_competition`] under a row lock on the competition.
pub async fn load_competition_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<(competition::Model, Competition), AppError> {
    let model = find_competition_for_update(txn, id).await?;
    let participants = participants(txn, id).await?;
    let snapshot = competition_snapshot(&model, participants);
    Ok((model, snapshot))
}
