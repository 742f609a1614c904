use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes, student_profile};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_student_starts_pending_with_no_teams() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "email": "Alice@Example.com",
                    "password": PASSWORD,
                    "name": "Alice",
                    "profile": student_profile(),
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["email"], "alice@example.com");
        assert_eq!(res.body["role"], "student");
        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["profile"]["institution"], "Tsinghua University");
        assert_eq!(res.body["teams"], json!([]));
    }

    #[tokio::test]
    async fn role_is_taken_from_the_profile() {
        let app = TestApp::spawn().await;
        app.create_organizer("org@example.com").await;

        let token = app.login("org@example.com").await;
        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["role"], "organizer");
        assert!(res.body.get("teams").is_none());
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_email() {
        let app = TestApp::spawn().await;
        app.create_student("alice@example.com").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "email": "ALICE@example.com",
                    "password": PASSWORD,
                    "name": "Alice again",
                    "profile": student_profile(),
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn cannot_self_register_as_admin() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "email": "root@example.com",
                    "password": PASSWORD,
                    "name": "Root",
                    "profile": { "role": "admin" },
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let app = TestApp::spawn().await;

        let cases = [
            json!({"email": "not-an-email", "password": PASSWORD, "name": "A", "profile": student_profile()}),
            json!({"email": "a@example.com", "password": "short", "name": "A", "profile": student_profile()}),
            json!({"email": "a@example.com", "password": PASSWORD, "name": "  ", "profile": student_profile()}),
            json!({"email": "a@example.com", "password": PASSWORD, "name": "A", "profile": {"role": "student"}}),
            json!({"email": "a@example.com", "password": PASSWORD, "name": "A"}),
        ];

        for body in cases {
            let res = app.post_without_token(routes::REGISTER, &body).await;
            assert_eq!(res.status, 400, "expected 400 for {body}: {}", res.text);
            assert_eq!(res.code(), "VALIDATION_ERROR");
        }
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn returns_token_and_user() {
        let app = TestApp::spawn().await;
        app.create_student("bob@example.com").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "bob@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["user"]["email"], "bob@example.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let app = TestApp::spawn().await;
        app.create_student("bob@example.com").await;

        let wrong = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "bob@example.com", "password": "wrongpassword"}),
            )
            .await;
        let unknown = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(wrong.status, 401);
        assert_eq!(wrong.code(), "INVALID_CREDENTIALS");
        assert_eq!(unknown.status, 401);
        assert_eq!(unknown.code(), "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn seeded_admin_can_log_in() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token(routes::ME, &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["role"], "admin");
        assert_eq!(res.body["status"], "approved");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn every_resource_list_requires_a_token() {
        let app = TestApp::spawn().await;

        for path in [routes::USERS, routes::TEAMS, routes::COMPETITIONS, routes::SUBMISSIONS] {
            let res = app.get_without_token(path).await;
            assert_eq!(res.status, 401, "{path} answered {}", res.text);
            assert_eq!(res.code(), "TOKEN_MISSING");
        }
    }
}
