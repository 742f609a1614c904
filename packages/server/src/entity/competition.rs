use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use talenthunt_common::CompetitionStatus;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String, // in Markdown

    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub registration_deadline: DateTimeUtc,

    /// The participant count is derived from `competition_participant` rows.
    pub max_participants: i32,

    #[sea_orm(indexed)]
    pub organizer_id: i32,

    #[sea_orm(indexed)]
    pub status: CompetitionStatus,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
