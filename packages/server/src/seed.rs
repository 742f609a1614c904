use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::*;
use talenthunt_common::{Profile, UserStatus};
use tracing::info;

use crate::config::BootstrapAdminConfig;
use crate::entity::{submission, team, user};
use crate::models::auth::normalize_email;
use crate::utils::hash;

/// Create the configured admin account unless a user with its email exists.
pub async fn seed_admin(db: &DatabaseConnection, admin: &BootstrapAdminConfig) -> Result<(), DbErr> {
    let password = hash::hash_password(&admin.password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;
    let profile = serde_json::to_value(Profile::Admin)
        .map_err(|e| DbErr::Custom(format!("Profile encode error: {e}")))?;

    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        email: Set(normalize_email(&admin.email)),
        password: Set(password),
        name: Set(admin.name.clone()),
        role: Set(talenthunt_common::Role::Admin),
        status: Set(UserStatus::Approved),
        profile: Set(profile),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {}
        Ok(_) => info!("Seeded admin account {}", admin.email),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Ensure composite indexes exist.
///
/// Schema sync only creates single-column indexes, so list queries that
/// filter on two columns get theirs here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes: [(&str, IndexCreateStatement); 2] = [
        (
            "idx_submission_team_competition",
            Index::create()
                .if_not_exists()
                .name("idx_submission_team_competition")
                .table(submission::Entity)
                .col(submission::Column::TeamId)
                .col(submission::Column::CompetitionId)
                .to_owned(),
        ),
        (
            "idx_team_competition_status",
            Index::create()
                .if_not_exists()
                .name("idx_team_competition_status")
                .table(team::Entity)
                .col(team::Column::CompetitionId)
                .col(team::Column::Status)
                .to_owned(),
        ),
    ];

    let backend = db.get_database_backend();
    for (name, stmt) in indexes {
        match db.execute_raw(backend.build(&stmt)).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
