use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use talenthunt_common::{Role, UserStatus};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub name: String,

    /// Fixed at registration.
    #[sea_orm(indexed)]
    pub role: Role,
    pub status: UserStatus,

    /// Role-specific profile, stored as the JSON of `talenthunt_common::Profile`.
    #[sea_orm(column_type = "JsonBinary")]
    pub profile: Json,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
