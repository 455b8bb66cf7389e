//! Shared test helpers for integration tests.
//!
//! Every `TestApp` runs on in-memory stores, so tests need no external
//! services and never share state.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use bazaar_api::{AppState, build_app, build_state};
use bazaar_auth::IdentityProviders;
use bazaar_cache::CacheManager;
use bazaar_core::config::{
    AppConfig, AuthConfig, CacheConfig, LoggingConfig, RevocationConfig, ServerConfig,
};
use bazaar_entity::user::UserRole;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for seeding accounts the HTTP surface cannot create
    pub state: AppState,
}

/// Tokens and id of a signed-in test account
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Configuration used by every test app.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: None,
        cache: CacheConfig::default(),
        auth: AuthConfig::with_secret("integration-test-secret-0123456789abcdef"),
        revocation: RevocationConfig::default(),
        logging: LoggingConfig::default(),
    }
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let state = build_state(
            test_config(),
            Arc::new(CacheManager::in_memory()),
            None,
            IdentityProviders::new(),
        )
        .expect("Failed to build state");

        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Register through the API and return the signed-in account
    pub async fn register(&self, email: &str, password: &str) -> TestUser {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        TestUser::from_body(&response.body)
    }

    /// Seed an account with an elevated role directly through the service
    pub async fn create_user_with_role(&self, email: &str, role: UserRole) -> TestUser {
        let signed = self
            .state
            .auth_service
            .register(email, "password123", role)
            .await
            .expect("Failed to seed account");

        TestUser {
            id: signed.credential.id,
            access_token: signed.tokens.access_token,
            refresh_token: signed.tokens.refresh_token,
        }
    }

    /// Login and return the signed-in account
    pub async fn login(&self, email: &str, password: &str) -> TestUser {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        TestUser::from_body(&response.body)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

impl TestUser {
    fn from_body(body: &Value) -> Self {
        let data = &body["data"];
        Self {
            id: data["user"]["id"]
                .as_str()
                .expect("No user id in response")
                .to_string(),
            access_token: data["access_token"]
                .as_str()
                .expect("No access_token in response")
                .to_string(),
            refresh_token: data["refresh_token"]
                .as_str()
                .expect("No refresh_token in response")
                .to_string(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `message` field of a failure body.
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}
