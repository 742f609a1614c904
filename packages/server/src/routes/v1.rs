use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, competition, submission, team, user};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(team_routes())
        .merge(competition_routes())
        .merge(submission_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::list_users))
        .routes(routes!(user::get_user, user::delete_user))
        .routes(routes!(user::update_my_profile))
        .routes(routes!(user::update_user_status))
}

fn team_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(team::list_teams, team::create_team))
        .routes(routes!(team::get_team, team::update_team, team::delete_team))
        .routes(routes!(team::join_team))
        .routes(routes!(team::leave_team))
        .routes(routes!(team::update_team_status))
}

fn competition_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            competition::list_competitions,
            competition::create_competition
        ))
        .routes(routes!(
            competition::get_competition,
            competition::update_competition,
            competition::delete_competition
        ))
        .routes(routes!(competition::register, competition::withdraw))
        .routes(routes!(competition::list_participants))
        .routes(routes!(competition::update_competition_status))
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            submission::list_submissions,
            submission::create_submission
        ))
        .routes(routes!(
            submission::get_submission,
            submission::update_submission,
            submission::delete_submission
        ))
        .routes(routes!(submission::review))
}
