use serde_json::{Value, json};

use crate::common::{TestApp, TestUser, routes};

struct Setup {
    leader: TestUser,
    organizer: TestUser,
    team: i32,
    competition: i32,
}

async fn setup(app: &TestApp) -> Setup {
    let leader = app.create_student("lead@example.com").await;
    let organizer = app.create_organizer("org@example.com").await;
    let team = app.create_approved_team(&leader.token, "Alpha", 3).await;
    let competition = app
        .create_approved_competition(&organizer.token, "Hack", 10)
        .await;
    Setup {
        leader,
        organizer,
        team,
        competition,
    }
}

fn submission_body(team: i32, competition: i32) -> Value {
    json!({
        "team_id": team,
        "competition_id": competition,
        "description": "Our project",
        "files": [{"filename": "slides.pdf", "url": "https://files.example.com/slides.pdf"}],
    })
}

async fn submit(app: &TestApp, s: &Setup) -> i32 {
    let res = app
        .post_with_token(
            routes::SUBMISSIONS,
            &submission_body(s.team, s.competition),
            &s.leader.token,
        )
        .await;
    assert_eq!(res.status, 201, "submit failed: {}", res.text);
    res.id()
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn member_submission_starts_pending() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;

        let res = app
            .post_with_token(
                routes::SUBMISSIONS,
                &submission_body(s.team, s.competition),
                &s.leader.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["submitted_by"], s.leader.id);
        assert_eq!(res.body["files"][0]["filename"], "slides.pdf");
        assert!(res.body["score"].is_null());
    }

    #[tokio::test]
    async fn non_member_cannot_submit() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let outsider = app.create_student("out@example.com").await;

        let res = app
            .post_with_token(
                routes::SUBMISSIONS,
                &submission_body(s.team, s.competition),
                &outsider.token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "NOT_TEAM_MEMBER");
    }

    #[tokio::test]
    async fn unknown_team_or_competition_is_not_found() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;

        for body in [
            submission_body(9999, s.competition),
            submission_body(s.team, 9999),
        ] {
            let res = app
                .post_with_token(routes::SUBMISSIONS, &body, &s.leader.token)
                .await;
            assert_eq!(res.status, 404);
            assert_eq!(res.code(), "NOT_FOUND");
        }
    }
}

mod review {
    use super::*;

    #[tokio::test]
    async fn organizer_reviews_with_feedback_and_score() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let id = submit(&app, &s).await;

        let res = app
            .patch_with_token(
                &routes::submission_status(id),
                &json!({"status": "reviewed", "feedback": "Great demo", "score": 87}),
                &s.organizer.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "reviewed");
        assert_eq!(res.body["feedback"], "Great demo");
        assert_eq!(res.body["score"], 87);

        // Fields left out keep their values.
        let res = app
            .patch_with_token(
                &routes::submission_status(id),
                &json!({"status": "approved"}),
                &s.organizer.token,
            )
            .await;
        assert_eq!(res.body["status"], "approved");
        assert_eq!(res.body["score"], 87);
    }

    #[tokio::test]
    async fn score_above_one_hundred_is_rejected() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let id = submit(&app, &s).await;

        for score in [101, 1000] {
            let res = app
                .patch_with_token(
                    &routes::submission_status(id),
                    &json!({"status": "reviewed", "score": score}),
                    &s.organizer.token,
                )
                .await;
            assert_eq!(res.status, 400, "{}", res.text);
            assert_eq!(res.code(), "VALIDATION_ERROR");
        }

        let sub = app.get_with_token(&routes::submission(id), &s.leader.token).await;
        assert_eq!(sub.body["status"], "pending");
    }

    #[tokio::test]
    async fn unknown_submission_status_is_rejected() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let id = submit(&app, &s).await;

        let res = app
            .patch_with_token(
                &routes::submission_status(id),
                &json!({"status": "graded"}),
                &s.organizer.token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_STATUS");
    }

    #[tokio::test]
    async fn students_and_admins_cannot_use_the_review_route() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let id = submit(&app, &s).await;
        let admin = app.admin_token().await;

        for token in [&s.leader.token, &admin] {
            let res = app
                .patch_with_token(
                    &routes::submission_status(id),
                    &json!({"status": "approved"}),
                    token,
                )
                .await;
            assert_eq!(res.status, 403);
            assert_eq!(res.code(), "PERMISSION_DENIED");
        }
    }

    #[tokio::test]
    async fn admin_replaces_a_submission() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let id = submit(&app, &s).await;
        let admin = app.admin_token().await;

        let body = json!({
            "status": "rejected",
            "description": "Replaced",
            "files": [],
            "feedback": "Missing demo",
        });

        let denied = app
            .put_with_token(&routes::submission(id), &body, &s.organizer.token)
            .await;
        assert_eq!(denied.status, 403);

        let res = app.put_with_token(&routes::submission(id), &body, &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "rejected");
        assert_eq!(res.body["description"], "Replaced");
        assert_eq!(res.body["files"], json!([]));
        assert_eq!(res.body["feedback"], "Missing demo");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn members_and_reviewers_see_submissions() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let id = submit(&app, &s).await;
        let outsider = app.create_student("out@example.com").await;

        let own = app.get_with_token(&routes::submission(id), &s.leader.token).await;
        assert_eq!(own.status, 200);

        let reviewer = app
            .get_with_token(&routes::submission(id), &s.organizer.token)
            .await;
        assert_eq!(reviewer.status, 200);

        let denied = app.get_with_token(&routes::submission(id), &outsider.token).await;
        assert_eq!(denied.status, 403);

        let list = app.get_with_token(routes::SUBMISSIONS, &outsider.token).await;
        assert_eq!(list.body["pagination"]["total"], 0);

        let list = app.get_with_token(routes::SUBMISSIONS, &s.organizer.token).await;
        assert_eq!(list.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn admin_deletes_submissions() {
        let app = TestApp::spawn().await;
        let s = setup(&app).await;
        let id = submit(&app, &s).await;
        let admin = app.admin_token().await;

        let denied = app.delete_with_token(&routes::submission(id), &s.leader.token).await;
        assert_eq!(denied.status, 403);

        let res = app.delete_with_token(&routes::submission(id), &admin).await;
        assert_eq!(res.status, 204);

        let again = app.delete_with_token(&routes::submission(id), &admin).await;
        assert_eq!(again.status, 404);
    }
}
