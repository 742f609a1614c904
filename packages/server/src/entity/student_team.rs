use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use talenthunt_common::TeamRole;

/// Team membership recorded on a student's profile once the team is approved.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_team")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub team_id: i32,

    pub role: TeamRole,

    pub recorded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
