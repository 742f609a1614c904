use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};

use talenthunt_server::config::{
    AppConfig, AuthConfig, BootstrapAdminConfig, CorsConfig, DatabaseConfig, ServerConfig,
};
use talenthunt_server::state::AppState;

pub const PASSWORD: &str = "password123";
pub const ADMIN_EMAIL: &str = "admin@talenthunt.test";

pub mod routes {
    pub const REGISTER: &str = "/api/v1/auth/register";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const ME: &str = "/api/v1/auth/me";

    pub const USERS: &str = "/api/v1/users";
    pub const MY_PROFILE: &str = "/api/v1/users/me/profile";

    pub fn user(id: i32) -> String {
        format!("/api/v1/users/{id}")
    }

    pub fn user_status(id: i32) -> String {
        format!("/api/v1/users/{id}/status")
    }

    pub const TEAMS: &str = "/api/v1/teams";

    pub fn team(id: i32) -> String {
        format!("/api/v1/teams/{id}")
    }

    pub fn team_join(id: i32) -> String {
        format!("/api/v1/teams/{id}/join")
    }

    pub fn team_leave(id: i32) -> String {
        format!("/api/v1/teams/{id}/leave")
    }

    pub fn team_status(id: i32) -> String {
        format!("/api/v1/teams/{id}/status")
    }

    pub const COMPETITIONS: &str = "/api/v1/competitions";

    pub fn competition(id: i32) -> String {
        format!("/api/v1/competitions/{id}")
    }

    pub fn competition_register(id: i32) -> String {
        format!("/api/v1/competitions/{id}/register")
    }

    pub fn competition_participants(id: i32) -> String {
        format!("/api/v1/competitions/{id}/participants")
    }

    pub fn competition_status(id: i32) -> String {
        format!("/api/v1/competitions/{id}/status")
    }

    pub const SUBMISSIONS: &str = "/api/v1/submissions";

    pub fn submission(id: i32) -> String {
        format!("/api/v1/submissions/{id}")
    }

    pub fn submission_status(id: i32) -> String {
        format!("/api/v1/submissions/{id}/status")
    }
}

/// A running test server backed by its own in-memory SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// A registered, logged-in user.
pub struct TestUser {
    pub id: i32,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        // One connection keeps the in-memory database alive and shared;
        // concurrent requests queue on the pool.
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts)
            .await
            .expect("Failed to open in-memory database");
        talenthunt_server::database::sync_schema(&db)
            .await
            .expect("Failed to sync schema");
        talenthunt_server::seed::ensure_indexes(&db)
            .await
            .expect("Failed to create indexes");

        let admin = BootstrapAdminConfig {
            email: ADMIN_EMAIL.to_string(),
            password: PASSWORD.to_string(),
            name: "Admin".to_string(),
        };
        talenthunt_server::seed::seed_admin(&db, &admin)
            .await
            .expect("Failed to seed admin");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                log_level: "warn".to_string(),
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
                connect_timeout_secs: 8,
                acquire_timeout_secs: 30,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
                token_ttl_hours: 1,
                bootstrap_admin: Some(admin),
            },
        };

        let state = AppState {
            db,
            config: Arc::new(app_config),
        };

        let app = talenthunt_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn patch_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Log in with email and the shared test password, returning the token.
    pub async fn login(&self, email: &str) -> String {
        let res = self
            .post_without_token(
                routes::LOGIN,
                &json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Token for the seeded admin account.
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL).await
    }

    /// Register with the given profile and log in.
    pub async fn create_user(&self, email: &str, profile: Value) -> TestUser {
        let body = json!({
            "email": email,
            "password": PASSWORD,
            "name": email.split('@').next().unwrap_or(email),
            "profile": profile,
        });

        let reg = self.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        TestUser {
            id: reg.id(),
            token: self.login(email).await,
        }
    }

    pub async fn create_student(&self, email: &str) -> TestUser {
        self.create_user(email, student_profile()).await
    }

    pub async fn create_mentor(&self, email: &str) -> TestUser {
        self.create_user(email, mentor_profile()).await
    }

    pub async fn create_organizer(&self, email: &str) -> TestUser {
        self.create_user(email, organizer_profile()).await
    }

    /// Create a team as `leader` and return its `id`.
    pub async fn create_team(&self, leader_token: &str, name: &str, max_size: u32) -> i32 {
        let res = self
            .post_with_token(
                routes::TEAMS,
                &json!({
                    "name": name,
                    "description": "Team description",
                    "max_size": max_size,
                    "required_skills": ["rust"],
                }),
                leader_token,
            )
            .await;
        assert_eq!(res.status, 201, "create_team failed: {}", res.text);
        res.id()
    }

    /// Create a team and have the admin approve it.
    pub async fn create_approved_team(&self, leader_token: &str, name: &str, max_size: u32) -> i32 {
        let id = self.create_team(leader_token, name, max_size).await;
        self.set_status(&routes::team_status(id), "approved").await;
        id
    }

    /// Create a competition whose deadline is a day away.
    pub async fn create_competition(&self, token: &str, title: &str, max_participants: u32) -> i32 {
        let now = chrono::Utc::now();
        let res = self
            .post_with_token(
                routes::COMPETITIONS,
                &json!({
                    "title": title,
                    "description": "Competition description",
                    "registration_deadline": now + chrono::Duration::days(1),
                    "start_date": now + chrono::Duration::days(2),
                    "end_date": now + chrono::Duration::days(3),
                    "max_participants": max_participants,
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_competition failed: {}", res.text);
        res.id()
    }

    pub async fn create_approved_competition(
        &self,
        token: &str,
        title: &str,
        max_participants: u32,
    ) -> i32 {
        let id = self.create_competition(token, title, max_participants).await;
        self.set_status(&routes::competition_status(id), "approved")
            .await;
        id
    }

    /// Set a status as the admin, asserting success.
    pub async fn set_status(&self, path: &str, status: &str) {
        let admin = self.admin_token().await;
        let res = self
            .patch_with_token(path, &json!({ "status": status }), &admin)
            .await;
        assert_eq!(res.status, 200, "set_status failed: {}", res.text);
    }
}

pub fn student_profile() -> Value {
    json!({
        "role": "student",
        "institution": "Tsinghua University",
        "course": "Computer Science",
        "year": 2,
        "student_id": "2023011234",
        "skills": ["rust", "sql"],
    })
}

pub fn mentor_profile() -> Value {
    json!({
        "role": "mentor",
        "organization": "Acme",
        "designation": "Staff Engineer",
        "availability": "weekends",
        "expertise": ["distributed systems"],
        "max_teams": 3,
    })
}

pub fn organizer_profile() -> Value {
    json!({
        "role": "organizer",
        "organization": "ACM Club",
        "designation": "Chair",
        "contact_number": "+86 10 1234 5678",
        "previous_events": ["Winter Hackathon"],
    })
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    /// Machine-readable error code of an error response.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}
