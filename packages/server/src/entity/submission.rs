use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use talenthunt_common::SubmissionStatus;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub team_id: i32,
    #[sea_orm(indexed)]
    pub competition_id: i32,

    /// Submission files stored as JSON array of {filename, url} objects.
    #[sea_orm(column_type = "JsonBinary")]
    pub files: Json,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub submitted_by: i32,

    pub status: SubmissionStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    /// 0-100, set by reviewers.
    pub score: Option<i32>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
