//! Integration tests for the authentication flow.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;

#[tokio::test]
async fn test_register_and_me() {
    let app = helpers::TestApp::new();
    let user = app.register("alice@example.com", "password123").await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&user.access_token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["id"], user.id.as_str());
    assert_eq!(response.body["data"]["email"], "alice@example.com");
    assert_eq!(response.body["data"]["role"], "user");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = helpers::TestApp::new();
    app.register("dup@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({ "email": "DUP@example.com", "password": "other" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = helpers::TestApp::new();
    app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "bob@example.com", "password": "wrong" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Incorrect email or password");
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "nobody@example.com", "password": "x" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Incorrect email or password");
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.message(),
        "You are not logged in! Please log in to get access."
    );
}

#[tokio::test]
async fn test_garbled_token_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request("GET", "/api/auth/me", None, Some("not.a.jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid token. Please log in again.");
}

#[tokio::test]
async fn test_refresh_token_cannot_authorize_requests() {
    let app = helpers::TestApp::new();
    let user = app.register("carol@example.com", "password123").await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&user.refresh_token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid token. Please log in again.");
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = helpers::TestApp::new();
    let user = app.register("dave@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": user.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let access = response.body["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();
    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_with_access_token_rejected() {
    let app = helpers::TestApp::new();
    let user = app.register("erin@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": user.access_token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.message(),
        "Invalid refresh token. Please log in again."
    );
}

#[tokio::test]
async fn test_logout_revokes_access_and_refresh() {
    let app = helpers::TestApp::new();
    let user = app.register("frank@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(serde_json::json!({ "refresh_token": user.refresh_token })),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let me = app
        .request("GET", "/api/auth/me", None, Some(&user.access_token))
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        me.message(),
        "Token has been invalidated. Please log in again."
    );

    let refresh = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": user.refresh_token })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_body() {
    let app = helpers::TestApp::new();
    let user = app.register("grace@example.com", "password123").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&user.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let me = app
        .request("GET", "/api/auth/me", None, Some(&user.access_token))
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_invalidates_older_tokens() {
    let app = helpers::TestApp::new();
    let user = app.register("heidi@example.com", "password123").await;

    // The watermark sits one second in the past; step clear of it.
    tokio::time::sleep(Duration::from_millis(2100)).await;

    let response = app
        .request(
            "PATCH",
            "/api/auth/password",
            Some(serde_json::json!({
                "current_password": "password123",
                "new_password": "newpassword456",
            })),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let fresh = response.body["data"]["access_token"]
        .as_str()
        .expect("fresh access token")
        .to_string();

    let old = app
        .request("GET", "/api/auth/me", None, Some(&user.access_token))
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        old.message(),
        "User recently changed password! Please log in again."
    );

    let new = app.request("GET", "/api/auth/me", None, Some(&fresh)).await;
    assert_eq!(new.status, StatusCode::OK);

    app.login("heidi@example.com", "newpassword456").await;
}

#[tokio::test]
async fn test_change_password_wrong_current() {
    let app = helpers::TestApp::new();
    let user = app.register("ivan@example.com", "password123").await;

    let response = app
        .request(
            "PATCH",
            "/api/auth/password",
            Some(serde_json::json!({
                "current_password": "nope",
                "new_password": "newpassword456",
            })),
            Some(&user.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Your current password is wrong.");
}

#[tokio::test]
async fn test_oauth_unknown_provider() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/oauth/myspace",
            Some(serde_json::json!({ "code": "abc" })),
            None,
        )
        .await;

    assert!(response.status.is_client_error());
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["cache"], true);
    assert!(response.body["data"]["database"].is_null());
}
