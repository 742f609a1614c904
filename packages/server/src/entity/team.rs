use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use talenthunt_common::TeamStatus;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Never changes after creation.
    #[sea_orm(indexed)]
    pub leader_id: i32,
    pub max_size: i32,

    /// JSON array of skill names.
    #[sea_orm(column_type = "JsonBinary")]
    pub required_skills: Json,

    #[sea_orm(indexed)]
    pub status: TeamStatus,

    /// NULL for teams not tied to a competition.
    pub competition_id: Option<i32>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
