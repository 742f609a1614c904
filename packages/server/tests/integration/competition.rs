use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{TestApp, routes};

fn past_competition() -> serde_json::Value {
    let now = Utc::now();
    json!({
        "title": "Last Year",
        "description": "",
        "registration_deadline": now - Duration::days(3),
        "start_date": now - Duration::days(2),
        "end_date": now - Duration::days(1),
        "max_participants": 10,
    })
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn organizer_creates_a_pending_competition() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;

        let id = app.create_competition(&org.token, "Spring Hackathon", 50).await;
        let res = app.get_with_token(&routes::competition(id), &org.token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Spring Hackathon");
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["organizer_id"], org.id);
        assert_eq!(res.body["current_participants"], 0);
    }

    #[tokio::test]
    async fn students_cannot_create_competitions() {
        let app = TestApp::spawn().await;
        let student = app.create_student("s@example.com").await;

        let res = app
            .post_with_token(routes::COMPETITIONS, &past_competition(), &student.token)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn schedule_must_be_ordered() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let now = Utc::now();

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Backwards",
                    "description": "",
                    "registration_deadline": now + Duration::days(1),
                    "start_date": now + Duration::days(3),
                    "end_date": now + Duration::days(2),
                    "max_participants": 10,
                }),
                &org.token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let res = app
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": "Late deadline",
                    "description": "",
                    "registration_deadline": now + Duration::days(3),
                    "start_date": now + Duration::days(2),
                    "end_date": now + Duration::days(4),
                    "max_participants": 10,
                }),
                &org.token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn pending_competition_is_closed() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let student = app.create_student("s@example.com").await;
        let id = app.create_competition(&org.token, "Hack", 10).await;

        let res = app
            .post_with_token(&routes::competition_register(id), &json!({}), &student.token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "NOT_APPROVED");
    }

    #[tokio::test]
    async fn single_seat_goes_to_the_first_registrant() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let first = app.create_student("first@example.com").await;
        let second = app.create_student("second@example.com").await;
        let id = app.create_approved_competition(&org.token, "Solo", 1).await;

        let res = app
            .post_with_token(&routes::competition_register(id), &json!({}), &first.token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["current_participants"], 1);

        let res = app
            .post_with_token(&routes::competition_register(id), &json!({}), &second.token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CAPACITY_EXCEEDED");

        let participants = app
            .get_with_token(&routes::competition_participants(id), &org.token)
            .await;
        assert_eq!(participants.status, 200);
        assert_eq!(participants.body.as_array().map(Vec::len), Some(1));
        assert_eq!(participants.body[0]["user_id"], first.id);
        assert_eq!(participants.body[0]["email"], "first@example.com");
    }

    #[tokio::test]
    async fn cannot_register_twice() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let student = app.create_student("s@example.com").await;
        let id = app.create_approved_competition(&org.token, "Hack", 5).await;

        let first = app
            .post_with_token(&routes::competition_register(id), &json!({}), &student.token)
            .await;
        assert_eq!(first.status, 201);

        let again = app
            .post_with_token(&routes::competition_register(id), &json!({}), &student.token)
            .await;
        assert_eq!(again.status, 409);
        assert_eq!(again.code(), "ALREADY_REGISTERED");
    }

    #[tokio::test]
    async fn registration_closes_at_the_deadline() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let student = app.create_student("s@example.com").await;

        let created = app
            .post_with_token(routes::COMPETITIONS, &past_competition(), &org.token)
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();
        app.set_status(&routes::competition_status(id), "approved").await;

        let res = app
            .post_with_token(&routes::competition_register(id), &json!({}), &student.token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "DEADLINE_PASSED");
    }

    #[tokio::test]
    async fn active_competition_no_longer_takes_registrations() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let student = app.create_student("s@example.com").await;
        let id = app.create_approved_competition(&org.token, "Hack", 5).await;
        app.set_status(&routes::competition_status(id), "active").await;

        let res = app
            .post_with_token(&routes::competition_register(id), &json!({}), &student.token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "NOT_APPROVED");
    }

    #[tokio::test]
    async fn withdraw_frees_the_seat() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let first = app.create_student("first@example.com").await;
        let second = app.create_student("second@example.com").await;
        let id = app.create_approved_competition(&org.token, "Solo", 1).await;

        app.post_with_token(&routes::competition_register(id), &json!({}), &first.token)
            .await;
        let res = app
            .delete_with_token(&routes::competition_register(id), &first.token)
            .await;
        assert_eq!(res.status, 204);

        let again = app
            .delete_with_token(&routes::competition_register(id), &first.token)
            .await;
        assert_eq!(again.status, 404);
        assert_eq!(again.code(), "NOT_REGISTERED");

        let res = app
            .post_with_token(&routes::competition_register(id), &json!({}), &second.token)
            .await;
        assert_eq!(res.status, 201);
    }
}

mod management {
    use super::*;

    #[tokio::test]
    async fn only_admins_change_competition_status() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let id = app.create_competition(&org.token, "Hack", 5).await;

        let res = app
            .patch_with_token(
                &routes::competition_status(id),
                &json!({"status": "approved"}),
                &org.token,
            )
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");

        let admin = app.admin_token().await;
        let res = app
            .patch_with_token(
                &routes::competition_status(id),
                &json!({"status": "finished"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "INVALID_STATUS");
    }

    #[tokio::test]
    async fn capacity_cannot_drop_below_registrations() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let id = app.create_approved_competition(&org.token, "Hack", 5).await;
        for email in ["a@example.com", "b@example.com"] {
            let student = app.create_student(email).await;
            app.post_with_token(&routes::competition_register(id), &json!({}), &student.token)
                .await;
        }

        let res = app
            .patch_with_token(
                &routes::competition(id),
                &json!({"max_participants": 1}),
                &org.token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let res = app
            .patch_with_token(
                &routes::competition(id),
                &json!({"max_participants": 2, "title": "Hack 2"}),
                &org.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Hack 2");
        assert_eq!(res.body["current_participants"], 2);
    }

    #[tokio::test]
    async fn other_organizers_cannot_edit_or_delete() {
        let app = TestApp::spawn().await;
        let owner = app.create_organizer("owner@example.com").await;
        let other = app.create_organizer("other@example.com").await;
        let id = app.create_competition(&owner.token, "Hack", 5).await;

        let edit = app
            .patch_with_token(&routes::competition(id), &json!({"title": "Mine"}), &other.token)
            .await;
        assert_eq!(edit.status, 403);

        let delete = app.delete_with_token(&routes::competition(id), &other.token).await;
        assert_eq!(delete.status, 403);

        let delete = app.delete_with_token(&routes::competition(id), &owner.token).await;
        assert_eq!(delete.status, 204);
        let gone = app.get_with_token(&routes::competition(id), &owner.token).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn list_counts_participants_and_filters() {
        let app = TestApp::spawn().await;
        let org = app.create_organizer("org@example.com").await;
        let open = app.create_approved_competition(&org.token, "Open Cup", 5).await;
        app.create_competition(&org.token, "Draft Cup", 5).await;
        let student = app.create_student("s@example.com").await;
        app.post_with_token(&routes::competition_register(open), &json!({}), &student.token)
            .await;

        let res = app
            .get_with_token(
                &format!("{}?status=approved", routes::COMPETITIONS),
                &student.token,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["data"][0]["current_participants"], 1);

        let res = app
            .get_with_token(&format!("{}?search=draft", routes::COMPETITIONS), &student.token)
            .await;
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["data"][0]["title"], "Draft Cup");
    }
}
