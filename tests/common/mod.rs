#![allow(dead_code)]

use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use resume_rs::AppState;
use resume_rs::api::routes::create_app;
use resume_rs::config::{JwtConfig, PaginationConfig};
use resume_rs::models::User;
use resume_rs::services::Registration;

pub const ADMIN: &str = "admin";
pub const MEMBER: &str = "member";
pub const PASSWORD: &str = "correct horse battery staple";

/// A running server over in-memory storage with an admin and a regular
/// user already signed in.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
    pub admin_token: String,
    pub member_token: String,
}

/// Status and JSON body of a response; empty bodies become `Value::Null`.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-bytes".to_string(),
        access_token_expiration: 1,
        refresh_token_expiration: 24,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_pagination(PaginationConfig::default()).await
    }

    pub async fn spawn_with_pagination(pagination: PaginationConfig) -> Self {
        let state = AppState::in_memory(test_jwt_config(), pagination);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_app(state.clone(), Duration::from_secs(30));
        tokio::spawn(async move {
            axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
                .await
                .unwrap();
        });

        let mut app = TestApp {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            state,
            admin_token: String::new(),
            member_token: String::new(),
        };
        app.create_user(ADMIN, true).await;
        app.create_user(MEMBER, false).await;
        app.admin_token = app.login(ADMIN, PASSWORD).await;
        app.member_token = app.login(MEMBER, PASSWORD).await;
        app
    }

    pub async fn create_user(&self, username: &str, is_admin: bool) -> User {
        self.state
            .services
            .users
            .create_user(Registration {
                username: username.to_string(),
                first_name: "Test".to_string(),
                last_name: username.to_string(),
                email: format!("{}@example.com", username),
                password: PASSWORD.to_string(),
                is_admin,
            })
            .await
            .unwrap()
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
        reply.body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.unwrap();
        let status = response.status();
        let bytes = response.bytes().await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Reply { status, body }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Reply {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn admin(&self, method: Method, path: &str, body: Option<Value>) -> Reply {
        self.send(method, path, Some(&self.admin_token), body).await
    }

    /// Creates an experience as the admin and returns its uuid.
    pub async fn create_experience(&self, body: Value) -> String {
        let reply = self
            .admin(Method::POST, "/api/v1/experiences", Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["uuid"].as_str().unwrap().to_string()
    }
}

/// A closed Sep 2019 - Dec 2019 role.
pub fn closed_experience() -> Value {
    json!({
        "job_title": "Backend Engineer",
        "description": "APIs",
        "company_name": "Acme",
        "started_month": 9,
        "started_year": 2019,
        "ended_month": 12,
        "ended_year": 2019,
        "is_still_in_role": false
    })
}
