//! Integration tests for session control: single revocation, revoke-others
//! and the admin bulk operations.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;

use bazaar_entity::user::UserRole;

#[tokio::test]
async fn test_revoke_specific_token_twice() {
    let app = helpers::TestApp::new();
    let user = app.register("alice@example.com", "password123").await;
    let other = app.login("alice@example.com", "password123").await;

    let first = app
        .request(
            "POST",
            "/api/sessions/revoke",
            Some(serde_json::json!({ "token": other.access_token })),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["revoked"], true);
    assert!(first.body["data"].get("message").is_none());

    let second = app
        .request(
            "POST",
            "/api/sessions/revoke",
            Some(serde_json::json!({ "token": other.access_token })),
            Some(&user.access_token),
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["data"]["revoked"], true);
    assert_eq!(second.body["data"]["message"], "already revoked");

    let rejected = app
        .request("GET", "/api/auth/me", None, Some(&other.access_token))
        .await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        rejected.message(),
        "Token has been invalidated. Please log in again."
    );

    let still_valid = app
        .request("GET", "/api/auth/me", None, Some(&user.access_token))
        .await;
    assert_eq!(still_valid.status, StatusCode::OK);
}

#[tokio::test]
async fn test_cannot_revoke_foreign_token() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice@example.com", "password123").await;
    let bob = app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/sessions/revoke",
            Some(serde_json::json!({ "token": bob.access_token })),
            Some(&alice.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "You can only revoke your own tokens");

    let bob_me = app
        .request("GET", "/api/auth/me", None, Some(&bob.access_token))
        .await;
    assert_eq!(bob_me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_moderator_can_revoke_foreign_token() {
    let app = helpers::TestApp::new();
    let moderator = app
        .create_user_with_role("mod@example.com", UserRole::Moderator)
        .await;
    let bob = app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/sessions/revoke",
            Some(serde_json::json!({ "token": bob.access_token })),
            Some(&moderator.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let bob_me = app
        .request("GET", "/api/auth/me", None, Some(&bob.access_token))
        .await;
    assert_eq!(bob_me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoke_others_keeps_caller_signed_in() {
    let app = helpers::TestApp::new();
    let laptop = app.register("alice@example.com", "password123").await;
    let phone = app.login("alice@example.com", "password123").await;

    // Sessions minted in the same second as the bump are indistinguishable.
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = app
        .request(
            "POST",
            "/api/sessions/revoke-others",
            None,
            Some(&laptop.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let fresh = response.body["data"]["access_token"]
        .as_str()
        .expect("fresh access token")
        .to_string();

    let phone_me = app
        .request("GET", "/api/auth/me", None, Some(&phone.access_token))
        .await;
    assert_eq!(phone_me.status, StatusCode::UNAUTHORIZED);

    let old_laptop = app
        .request("GET", "/api/auth/me", None, Some(&laptop.access_token))
        .await;
    assert_eq!(old_laptop.status, StatusCode::UNAUTHORIZED);

    let fresh_me = app.request("GET", "/api/auth/me", None, Some(&fresh)).await;
    assert_eq!(fresh_me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_active_sessions_counts_revocations() {
    let app = helpers::TestApp::new();
    let user = app.register("alice@example.com", "password123").await;
    let other = app.login("alice@example.com", "password123").await;

    app.request(
        "POST",
        "/api/sessions/revoke",
        Some(serde_json::json!({ "token": other.access_token })),
        Some(&user.access_token),
    )
    .await;

    let response = app
        .request("GET", "/api/sessions/active", None, Some(&user.access_token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked_tokens"], 1);
    assert_eq!(response.body["data"]["approximate"], true);
}

#[tokio::test]
async fn test_admin_revokes_all_sessions() {
    let app = helpers::TestApp::new();
    let admin = app
        .create_user_with_role("admin@example.com", UserRole::Admin)
        .await;
    let target = app.register("target@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/revoke-sessions", target.id),
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["user_id"], target.id.as_str());

    let target_me = app
        .request("GET", "/api/auth/me", None, Some(&target.access_token))
        .await;
    assert_eq!(target_me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        target_me.message(),
        "User recently changed password! Please log in again."
    );

    let refresh = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": target.refresh_token })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    let admin_me = app
        .request("GET", "/api/auth/me", None, Some(&admin.access_token))
        .await;
    assert_eq!(admin_me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_admin_cannot_revoke_all_sessions() {
    let app = helpers::TestApp::new();
    let user = app.register("alice@example.com", "password123").await;
    let target = app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/revoke-sessions", target.id),
            None,
            Some(&user.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Administrative access required");
}

#[tokio::test]
async fn test_force_password_change() {
    let app = helpers::TestApp::new();
    let admin = app
        .create_user_with_role("admin@example.com", UserRole::Admin)
        .await;
    let target = app.register("target@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/force-password-change", target.id),
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let target_me = app
        .request("GET", "/api/auth/me", None, Some(&target.access_token))
        .await;
    assert_eq!(target_me.status, StatusCode::UNAUTHORIZED);

    // A login inside the watermark's own second would still predate it.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let relogin = app.login("target@example.com", "password123").await;
    let me = app
        .request("GET", "/api/auth/me", None, Some(&relogin.access_token))
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["must_change_password"], true);
}

#[tokio::test]
async fn test_force_password_change_unknown_user() {
    let app = helpers::TestApp::new();
    let admin = app
        .create_user_with_role("admin@example.com", UserRole::Admin)
        .await;

    let response = app
        .request(
            "POST",
            "/api/admin/users/does-not-exist/force-password-change",
            None,
            Some(&admin.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
