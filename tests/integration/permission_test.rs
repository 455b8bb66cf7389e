//! Integration tests for ownership-gated access to another account's
//! session view.

mod helpers;

use axum::http::StatusCode;

use bazaar_entity::user::UserRole;

#[tokio::test]
async fn test_owner_reads_own_sessions() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice@example.com", "password123").await;

    let response = app
        .request(
            "GET",
            &format!("/api/users/{}/sessions", alice.id),
            None,
            Some(&alice.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked_tokens"], 0);
}

#[tokio::test]
async fn test_user_cannot_read_foreign_sessions() {
    let app = helpers::TestApp::new();
    let alice = app.register("alice@example.com", "password123").await;
    let bob = app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "GET",
            &format!("/api/users/{}/sessions", bob.id),
            None,
            Some(&alice.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.message(),
        "Insufficient permissions to perform this action"
    );
}

#[tokio::test]
async fn test_moderator_reads_foreign_sessions() {
    let app = helpers::TestApp::new();
    let moderator = app
        .create_user_with_role("mod@example.com", UserRole::Moderator)
        .await;
    let bob = app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "GET",
            &format!("/api/users/{}/sessions", bob.id),
            None,
            Some(&moderator.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_reads_foreign_sessions() {
    let app = helpers::TestApp::new();
    let admin = app
        .create_user_with_role("admin@example.com", UserRole::Admin)
        .await;
    let bob = app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "GET",
            &format!("/api/users/{}/sessions", bob.id),
            None,
            Some(&admin.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_moderator_is_not_admin() {
    let app = helpers::TestApp::new();
    let moderator = app
        .create_user_with_role("mod@example.com", UserRole::Moderator)
        .await;
    let bob = app.register("bob@example.com", "password123").await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/force-password-change", bob.id),
            None,
            Some(&moderator.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Administrative access required");
}
